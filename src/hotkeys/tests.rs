use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use global_hotkey::hotkey::Code;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use super::*;
use crate::config::{HotkeyAction, HotkeyBindings};

fn code(c: Code) -> Key {
    Key::Code(c)
}

fn ctrl() -> Key {
    Key::Modifier(Modifier::Ctrl)
}

fn alt() -> Key {
    Key::Modifier(Modifier::Alt)
}

// --- parsing ---

#[test]
fn test_parse_modifiers_and_keys() {
    let keys = parse_combination("ctrl+alt+down").unwrap();
    assert_eq!(keys, KeySet::from([ctrl(), alt(), code(Code::ArrowDown)]));

    let keys = parse_combination("CMD+Shift+k").unwrap();
    assert_eq!(
        keys,
        KeySet::from([
            Key::Modifier(Modifier::Super),
            Key::Modifier(Modifier::Shift),
            code(Code::KeyK)
        ])
    );
}

#[test]
fn test_parse_aliases_collapse() {
    assert_eq!(
        parse_combination("control+x").unwrap(),
        parse_combination("ctrl+x").unwrap()
    );
    assert_eq!(
        parse_combination("win+1").unwrap(),
        parse_combination("meta+1").unwrap()
    );
}

#[test]
fn test_parse_special_and_function_keys() {
    assert!(parse_combination("f24").unwrap().contains(&code(Code::F24)));
    assert!(parse_combination("alt+f").unwrap().contains(&code(Code::KeyF)));
    assert!(parse_combination("numpad7").unwrap().contains(&code(Code::Numpad7)));
    assert!(
        parse_combination("ctrl+print_screen")
            .unwrap()
            .contains(&code(Code::PrintScreen))
    );
    assert!(
        parse_combination("altgr+space")
            .unwrap()
            .contains(&Key::Modifier(Modifier::AltGr))
    );
}

#[test]
fn test_parse_rejects_bad_input() {
    assert!(matches!(
        parse_combination("ctrl+#"),
        Err(HotkeyError::InvalidCharacters(_))
    ));
    assert!(matches!(
        parse_combination("ctrl + x"),
        Err(HotkeyError::InvalidCharacters(_))
    ));
    assert_eq!(
        parse_combination("f25"),
        Err(HotkeyError::InvalidFunctionKey("f25".to_string()))
    );
    assert_eq!(
        parse_combination("ctrl+hyper"),
        Err(HotkeyError::UnknownKey("hyper".to_string()))
    );
    assert_eq!(parse_combination(""), Err(HotkeyError::Empty));
    assert_eq!(parse_combination("++"), Err(HotkeyError::Empty));
}

#[test]
fn test_canonical_collapses_sides() {
    assert_eq!(Key::from(Code::ControlRight), ctrl());
    assert_eq!(Key::from(Code::ControlLeft), ctrl());
    assert_eq!(Key::from(Code::AltRight), alt());
    assert_eq!(Key::from(Code::MetaLeft), Key::Modifier(Modifier::Super));
    assert_eq!(Key::from(Code::KeyA), code(Code::KeyA));
}

// --- state machines ---

#[test]
fn test_hold_fires_once_per_transition_any_order() {
    let mut binding = KeyBinding::new(
        parse_combination("ctrl+alt+x").unwrap(),
        TriggerMode::Hold,
    );

    assert_eq!(binding.press(code(Code::KeyX)), None);
    assert_eq!(binding.press(ctrl()), None);
    assert_eq!(binding.press(alt()), Some(Transition::Activate));
    // Auto-repeat while held
    assert_eq!(binding.press(code(Code::KeyX)), None);
    assert!(binding.is_active());

    assert_eq!(binding.release(alt()), Some(Transition::Deactivate));
    assert_eq!(binding.release(ctrl()), None);
    assert_eq!(binding.release(code(Code::KeyX)), None);

    assert_eq!(binding.press(alt()), None);
    assert_eq!(binding.press(code(Code::KeyX)), None);
    assert_eq!(binding.press(ctrl()), Some(Transition::Activate));
}

#[test]
fn test_hold_reactivates_after_partial_release() {
    let mut binding = KeyBinding::new(parse_combination("ctrl+x").unwrap(), TriggerMode::Hold);

    binding.press(ctrl());
    assert_eq!(binding.press(code(Code::KeyX)), Some(Transition::Activate));
    assert_eq!(binding.release(code(Code::KeyX)), Some(Transition::Deactivate));
    assert_eq!(binding.press(code(Code::KeyX)), Some(Transition::Activate));
}

#[test]
fn test_unrelated_keys_are_ignored() {
    let mut binding = KeyBinding::new(parse_combination("ctrl+x").unwrap(), TriggerMode::Hold);

    binding.press(Key::Modifier(Modifier::Shift));
    binding.press(ctrl());
    assert_eq!(binding.press(code(Code::KeyX)), Some(Transition::Activate));
    assert_eq!(binding.release(Key::Modifier(Modifier::Shift)), None);
    assert!(binding.is_active());
}

#[test]
fn test_press_trigger_is_edge_triggered() {
    let mut binding = KeyBinding::new(parse_combination("ctrl+alt").unwrap(), TriggerMode::Press);

    binding.press(ctrl());
    assert_eq!(binding.press(alt()), Some(Transition::Activate));
    assert_eq!(binding.press(alt()), None);
    assert_eq!(binding.release(alt()), None);
    assert_eq!(binding.press(alt()), Some(Transition::Activate));
}

#[test]
fn test_reset_forgets_held_keys() {
    let mut binding = KeyBinding::new(parse_combination("ctrl+x").unwrap(), TriggerMode::Hold);
    binding.press(ctrl());
    binding.press(code(Code::KeyX));
    binding.reset();

    assert!(!binding.is_active());
    assert_eq!(binding.press(code(Code::KeyX)), None);
}

// --- listener ---

fn recording_handlers(
    tx: tokio::sync::mpsc::UnboundedSender<String>,
    name: &'static str,
) -> ActionHandlers {
    let on = tx.clone();
    ActionHandlers::new()
        .on_activate(move || {
            let _ = on.send(format!("{}:on", name));
            async {}
        })
        .on_deactivate(move || {
            let _ = tx.send(format!("{}:off", name));
            async {}
        })
}

async fn next(rx: &mut UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("hotkey callback timed out")
        .expect("channel closed")
}

fn bindings(entries: &[(HotkeyAction, &str)]) -> HotkeyBindings {
    let mut bindings = HotkeyBindings::empty();
    for (action, combo) in entries {
        bindings.set(*action, *combo);
    }
    bindings
}

#[tokio::test]
async fn test_listener_dispatches_hold_actions() {
    let (tx, mut rx) = unbounded_channel();
    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    let handlers = HashMap::from([(
        HotkeyAction::RecordToggle,
        recording_handlers(tx, "record"),
    )]);

    let count = listener
        .register(&bindings(&[(HotkeyAction::RecordToggle, "ctrl+x")]), &handlers)
        .unwrap();
    assert_eq!(count, 1);
    assert!(listener.is_running());

    let feed = listener.feed();
    assert!(feed.press(Code::ControlRight));
    assert!(feed.press(Code::KeyX));
    assert_eq!(next(&mut rx).await, "record:on");
    assert!(feed.release(Code::KeyX));
    assert_eq!(next(&mut rx).await, "record:off");

    listener.stop();
}

#[tokio::test]
async fn test_listener_guard_skips_action() {
    let (tx, mut rx) = unbounded_channel();
    let allowed = Arc::new(AtomicBool::new(false));
    let gate = Arc::clone(&allowed);
    let handlers = HashMap::from([(
        HotkeyAction::AiToggle,
        recording_handlers(tx, "ai").activate_when(move || gate.load(Ordering::SeqCst)),
    )]);

    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    listener
        .register(&bindings(&[(HotkeyAction::AiToggle, "ctrl+q")]), &handlers)
        .unwrap();
    let feed = listener.feed();

    feed.press(Code::ControlLeft);
    feed.press(Code::KeyQ);
    feed.release(Code::KeyQ);
    // Activation was rejected, the deactivation still runs
    assert_eq!(next(&mut rx).await, "ai:off");

    allowed.store(true, Ordering::SeqCst);
    feed.press(Code::KeyQ);
    assert_eq!(next(&mut rx).await, "ai:on");

    listener.stop();
}

#[tokio::test]
async fn test_actions_of_one_binding_run_in_order() {
    let (tx, mut rx) = unbounded_channel();
    let slow = tx.clone();
    let handlers = HashMap::from([(
        HotkeyAction::RecordToggle,
        ActionHandlers::new()
            .on_activate(move || {
                let slow = slow.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let _ = slow.send("started".to_string());
                }
            })
            .on_deactivate(move || {
                let _ = tx.send("stopped".to_string());
                async {}
            }),
    )]);
    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    listener
        .register(&bindings(&[(HotkeyAction::RecordToggle, "ctrl+x")]), &handlers)
        .unwrap();
    let feed = listener.feed();

    feed.press(Code::ControlLeft);
    feed.press(Code::KeyX);
    feed.release(Code::KeyX);

    assert_eq!(next(&mut rx).await, "started");
    assert_eq!(next(&mut rx).await, "stopped");
    listener.stop();
}

#[tokio::test]
async fn test_press_trigger_binding_in_listener() {
    let (tx, mut rx) = unbounded_channel();
    let handlers = HashMap::from([(
        HotkeyAction::ToggleVisibility,
        recording_handlers(tx, "toggle"),
    )]);
    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    listener
        .register(
            &bindings(&[(HotkeyAction::ToggleVisibility, "ctrl+alt")]),
            &handlers,
        )
        .unwrap();
    let feed = listener.feed();

    feed.press(Code::AltLeft);
    feed.press(Code::ControlLeft);
    feed.release(Code::ControlLeft);
    feed.press(Code::ControlLeft);

    assert_eq!(next(&mut rx).await, "toggle:on");
    assert_eq!(next(&mut rx).await, "toggle:on");
    listener.stop();
}

#[tokio::test]
async fn test_invalid_rebind_keeps_previous_bindings() {
    let (tx, mut rx) = unbounded_channel();
    let handlers = HashMap::from([
        (HotkeyAction::RecordToggle, recording_handlers(tx.clone(), "record")),
        (HotkeyAction::AiToggle, recording_handlers(tx, "ai")),
    ]);
    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    listener
        .register(&bindings(&[(HotkeyAction::RecordToggle, "ctrl+x")]), &handlers)
        .unwrap();

    let err = listener
        .register(
            &bindings(&[
                (HotkeyAction::RecordToggle, "ctrl+y"),
                (HotkeyAction::AiToggle, "ctrl+#"),
            ]),
            &handlers,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        HotkeyError::InvalidBinding {
            action: HotkeyAction::AiToggle,
            ..
        }
    ));

    assert_eq!(
        listener.registered(),
        vec![(HotkeyAction::RecordToggle, "ctrl+x".to_string())]
    );
    let feed = listener.feed();
    feed.press(Code::ControlLeft);
    feed.press(Code::KeyX);
    assert_eq!(next(&mut rx).await, "record:on");
    listener.stop();
}

#[tokio::test]
async fn test_empty_rebind_is_rejected() {
    let (tx, _rx) = unbounded_channel();
    let handlers = HashMap::from([(HotkeyAction::RecordToggle, recording_handlers(tx, "record"))]);
    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    listener
        .register(&bindings(&[(HotkeyAction::RecordToggle, "ctrl+x")]), &handlers)
        .unwrap();

    let err = listener
        .register(&bindings(&[(HotkeyAction::RecordToggle, "")]), &handlers)
        .unwrap_err();
    assert_eq!(err, HotkeyError::NoBindings);
    assert!(listener.is_running());
    assert_eq!(listener.registered().len(), 1);
    listener.stop();
}

#[tokio::test]
async fn test_stop_is_terminal() {
    let (tx, _rx) = unbounded_channel();
    let handlers = HashMap::from([(HotkeyAction::RecordToggle, recording_handlers(tx, "record"))]);
    let mut listener = HotkeyListener::new(tokio::runtime::Handle::current());
    listener
        .register(&HotkeyBindings::default(), &handlers)
        .unwrap();
    let feed = listener.feed();

    listener.stop();

    assert!(!listener.is_running());
    assert!(listener.registered().is_empty());
    assert!(!feed.press(Code::ControlLeft));
}

#[test]
fn test_hotkey_error_becomes_configuration_error() {
    let err: crate::error::VoxError = HotkeyError::NoBindings.into();
    assert!(matches!(err, crate::error::VoxError::Configuration(_)));
}
