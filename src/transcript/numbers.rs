//! Spoken numbers to digits: "twenty-two euros" becomes "22 euros"
//!
//! English and French number words are recognised. A number is a run of
//! number words separated by single spaces or hyphens. A lone word worth
//! three or less ("one", "un", "deux") is left alone, since it is far more
//! often an article or a figure of speech than a quantity.

/// Lone number words up to this value stay words
const ISOLATED_MAX: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lang {
    English,
    French,
}

impl Lang {
    fn from_code(language: &str) -> Option<Self> {
        let code = language.trim().to_lowercase();
        match code.split(['-', '_']).next() {
            Some("en") => Some(Lang::English),
            Some("fr") => Some(Lang::French),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Word {
    Unit(u64),
    Tens(u64),
    Hundred,
    Scale(u64),
    And,
}

fn lookup(lang: Lang, word: &str) -> Option<Word> {
    use Word::*;
    let word = match (lang, word) {
        (Lang::English, "zero") => Unit(0),
        (Lang::English, "one") => Unit(1),
        (Lang::English, "two") => Unit(2),
        (Lang::English, "three") => Unit(3),
        (Lang::English, "four") => Unit(4),
        (Lang::English, "five") => Unit(5),
        (Lang::English, "six") => Unit(6),
        (Lang::English, "seven") => Unit(7),
        (Lang::English, "eight") => Unit(8),
        (Lang::English, "nine") => Unit(9),
        (Lang::English, "ten") => Unit(10),
        (Lang::English, "eleven") => Unit(11),
        (Lang::English, "twelve") => Unit(12),
        (Lang::English, "thirteen") => Unit(13),
        (Lang::English, "fourteen") => Unit(14),
        (Lang::English, "fifteen") => Unit(15),
        (Lang::English, "sixteen") => Unit(16),
        (Lang::English, "seventeen") => Unit(17),
        (Lang::English, "eighteen") => Unit(18),
        (Lang::English, "nineteen") => Unit(19),
        (Lang::English, "twenty") => Tens(20),
        (Lang::English, "thirty") => Tens(30),
        (Lang::English, "forty") => Tens(40),
        (Lang::English, "fifty") => Tens(50),
        (Lang::English, "sixty") => Tens(60),
        (Lang::English, "seventy") => Tens(70),
        (Lang::English, "eighty") => Tens(80),
        (Lang::English, "ninety") => Tens(90),
        (Lang::English, "hundred") => Hundred,
        (Lang::English, "thousand") => Scale(1_000),
        (Lang::English, "million") => Scale(1_000_000),
        (Lang::English, "billion") => Scale(1_000_000_000),
        (Lang::English, "and") => And,

        (Lang::French, "zéro") => Unit(0),
        (Lang::French, "un" | "une") => Unit(1),
        (Lang::French, "deux") => Unit(2),
        (Lang::French, "trois") => Unit(3),
        (Lang::French, "quatre") => Unit(4),
        (Lang::French, "cinq") => Unit(5),
        (Lang::French, "six") => Unit(6),
        (Lang::French, "sept") => Unit(7),
        (Lang::French, "huit") => Unit(8),
        (Lang::French, "neuf") => Unit(9),
        (Lang::French, "dix") => Unit(10),
        (Lang::French, "onze") => Unit(11),
        (Lang::French, "douze") => Unit(12),
        (Lang::French, "treize") => Unit(13),
        (Lang::French, "quatorze") => Unit(14),
        (Lang::French, "quinze") => Unit(15),
        (Lang::French, "seize") => Unit(16),
        (Lang::French, "vingt" | "vingts") => Tens(20),
        (Lang::French, "trente") => Tens(30),
        (Lang::French, "quarante") => Tens(40),
        (Lang::French, "cinquante") => Tens(50),
        (Lang::French, "soixante") => Tens(60),
        (Lang::French, "cent" | "cents") => Hundred,
        (Lang::French, "mille" | "milles") => Scale(1_000),
        (Lang::French, "million" | "millions") => Scale(1_000_000),
        (Lang::French, "milliard" | "milliards") => Scale(1_000_000_000),
        (Lang::French, "et") => And,
        _ => return None,
    };
    Some(word)
}

/// Value of a number being read word by word
struct Number {
    lang: Lang,
    total: u64,
    /// Part below the last scale word
    group: u64,
    last: Option<Word>,
    last_scale: Option<u64>,
}

impl Number {
    fn new(lang: Lang) -> Self {
        Self {
            lang,
            total: 0,
            group: 0,
            last: None,
            last_scale: None,
        }
    }

    fn value(&self) -> u64 {
        self.total + self.group
    }

    /// Extend the number with `word`; false if it cannot continue it
    fn accept(&mut self, word: Word) -> bool {
        let accepted = match word {
            Word::Unit(n) => self.accept_unit(n),
            Word::Tens(t) => self.accept_tens(t),
            Word::Hundred => self.accept_hundred(),
            Word::Scale(s) => self.accept_scale(s),
            Word::And => match self.lang {
                Lang::English => matches!(self.last, Some(Word::Hundred | Word::Scale(_))),
                Lang::French => matches!(self.last, Some(Word::Tens(_))),
            },
        };
        if accepted {
            self.last = Some(word);
        }
        accepted
    }

    fn accept_unit(&mut self, n: u64) -> bool {
        let below_hundred = self.group % 100;
        let fits = match self.last {
            None => true,
            Some(_) if n == 0 => false,
            Some(Word::Hundred | Word::Scale(_)) => below_hundred == 0,
            Some(Word::And) => match self.lang {
                Lang::English => below_hundred == 0,
                // vingt et un, soixante et onze
                Lang::French => (n == 1 || n == 11) && below_hundred >= 20 && below_hundred % 10 == 0,
            },
            Some(Word::Tens(_)) => match self.lang {
                Lang::English => (1..=9).contains(&n),
                // soixante-dix, quatre-vingt-douze
                Lang::French => {
                    (1..=9).contains(&n)
                        || ((10..=16).contains(&n) && matches!(below_hundred, 60 | 80))
                }
            },
            // dix-sept, soixante-dix-neuf
            Some(Word::Unit(10)) => {
                self.lang == Lang::French
                    && (7..=9).contains(&n)
                    && matches!(below_hundred, 10 | 70 | 90)
            }
            Some(Word::Unit(_)) => false,
        };
        if fits {
            self.group += n;
        }
        fits
    }

    fn accept_tens(&mut self, t: u64) -> bool {
        match self.last {
            None | Some(Word::Hundred | Word::Scale(_)) if self.group % 100 == 0 => {
                self.group += t;
                true
            }
            Some(Word::And) if self.lang == Lang::English && self.group % 100 == 0 => {
                self.group += t;
                true
            }
            // quatre-vingt
            Some(Word::Unit(4)) if self.lang == Lang::French && t == 20 && self.group % 100 == 4 => {
                self.group += 76;
                true
            }
            _ => false,
        }
    }

    fn accept_hundred(&mut self) -> bool {
        match self.last {
            None => {
                self.group = 100;
                true
            }
            Some(Word::Unit(_) | Word::Tens(_)) if (1..100).contains(&self.group) => {
                self.group *= 100;
                true
            }
            // mille cent
            Some(Word::Scale(_)) if self.lang == Lang::French && self.group == 0 => {
                self.group = 100;
                true
            }
            _ => false,
        }
    }

    fn accept_scale(&mut self, scale: u64) -> bool {
        if matches!(self.last, Some(Word::And)) {
            return false;
        }
        if self.last_scale.is_some_and(|last| scale >= last) {
            return false;
        }
        let multiplier = if self.group == 0 { 1 } else { self.group };
        self.total += multiplier * scale;
        self.group = 0;
        self.last_scale = Some(scale);
        true
    }
}

pub fn supports_number_conversion(language: &str) -> bool {
    Lang::from_code(language).is_some()
}

/// Replace spoken numbers in `text` with digits.
///
/// Text in a language without number support is returned unchanged.
pub fn convert_numbers(text: &str, language: &str) -> String {
    let Some(lang) = Lang::from_code(language) else {
        return text.to_string();
    };
    let words = word_spans(text);

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;
    while i < words.len() {
        match read_number(text, &words, i, lang) {
            Some((last, value)) if last > i || value > ISOLATED_MAX => {
                out.push_str(&text[copied..words[i].0]);
                out.push_str(&value.to_string());
                copied = words[last].1;
                i = last + 1;
            }
            _ => i += 1,
        }
    }
    out.push_str(&text[copied..]);
    out
}

/// Longest number starting at word `first`: index of its last word and value
fn read_number(
    text: &str,
    words: &[(usize, usize)],
    first: usize,
    lang: Lang,
) -> Option<(usize, u64)> {
    let mut number = Number::new(lang);
    let mut longest = None;
    for j in first..words.len() {
        let (start, end) = words[j];
        if j > first {
            let gap = &text[words[j - 1].1..start];
            if gap != " " && gap != "-" {
                break;
            }
        }
        let Some(word) = lookup(lang, &text[start..end].to_lowercase()) else {
            break;
        };
        if !number.accept(word) {
            break;
        }
        // A trailing connector is not part of the number
        if word != Word::And {
            longest = Some((j, number.value()));
        }
    }
    longest
}

/// Byte ranges of alphabetic runs
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (idx, c) in text.char_indices() {
        match (c.is_alphabetic(), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                spans.push((s, idx));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}
