use super::*;

#[test]
fn test_replacements_apply_in_order() {
    let replacements = vec![
        Replacement::new("vox desk", "voxdesk"),
        Replacement::new("voxdesk", "VoxDesk"),
        Replacement::new("", "ignored"),
    ];
    assert_eq!(
        apply_replacements("I use vox desk daily", &replacements),
        "I use VoxDesk daily"
    );
}

#[test]
fn test_preview_truncates_long_text() {
    let long = "a".repeat(80);
    assert_eq!(preview(&long), format!("{}...", "a".repeat(50)));
    assert_eq!(preview("short"), "short");
}

#[test]
fn test_replacement_with_empty_target_is_skipped() {
    let replacements = vec![
        Replacement::new("um", ""),
        Replacement::new("colour", "color"),
    ];
    assert_eq!(
        apply_replacements("um the colour is umber", &replacements),
        "um the color is umber"
    );
}

#[test]
fn test_english_number_words() {
    assert_eq!(convert_numbers("I owe you twenty-two dollars", "en"), "I owe you 22 dollars");
    assert_eq!(convert_numbers("one hundred and five people", "en"), "105 people");
    assert_eq!(
        convert_numbers("two thousand three hundred forty-five steps", "en"),
        "2345 steps"
    );
    assert_eq!(convert_numbers("Twenty-Two", "en-US"), "22");
}

#[test]
fn test_small_isolated_numbers_stay_words() {
    assert_eq!(convert_numbers("one of them has three cats", "en"), "one of them has three cats");
    assert_eq!(convert_numbers("four cats", "en"), "4 cats");
    assert_eq!(convert_numbers("un chat et deux chiens", "fr"), "un chat et deux chiens");
}

#[test]
fn test_numbers_end_at_punctuation_and_connectors() {
    assert_eq!(convert_numbers("twenty, thirty", "en"), "20, 30");
    assert_eq!(convert_numbers("one hundred and counting", "en"), "100 and counting");
    assert_eq!(convert_numbers("five and ten", "en"), "5 and 10");
}

#[test]
fn test_french_number_words() {
    assert_eq!(convert_numbers("vingt-deux euros", "fr"), "22 euros");
    assert_eq!(convert_numbers("quatre-vingt-dix-sept ans", "fr"), "97 ans");
    assert_eq!(convert_numbers("soixante et onze", "fr"), "71");
    assert_eq!(convert_numbers("en deux mille vingt-six", "fr"), "en 2026");
}

#[test]
fn test_unsupported_language_is_unchanged() {
    assert!(!supports_number_conversion("de"));
    assert!(supports_number_conversion("fr_FR"));
    assert_eq!(convert_numbers("zweiundzwanzig twenty", "de"), "zweiundzwanzig twenty");
}
