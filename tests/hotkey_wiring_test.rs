//! Hotkeys driving the orchestrator through the key feed

mod common;

use std::time::Duration;

use global_hotkey::hotkey::Code;

use common::harness;
use voxdesk::config::{Config, HotkeyAction};
use voxdesk::hotkeys::{HotkeyError, Key, Modifier};
use voxdesk::state::RuntimeState;
use voxdesk::ui::UiEvent;

const CTRL: Key = Key::Modifier(Modifier::Ctrl);
const ALT: Key = Key::Modifier(Modifier::Alt);

fn config() -> Config {
    let mut config = Config::default();
    config.hotkeys.set(HotkeyAction::RecordToggle, "ctrl+1");
    config
}

async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

fn is_idle(state: &RuntimeState) -> bool {
    !state.is_recording() && !state.is_busy()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hold_to_dictate() {
    let config = config();
    let mut h = harness("held and released").config(config.clone()).build();
    let state = h.orchestrator.state();

    assert_eq!(h.orchestrator.register_hotkeys(&config.hotkeys), Ok(5));
    let feed = h.orchestrator.key_feed().unwrap();

    assert!(feed.press(CTRL));
    assert!(feed.press(Code::Digit1));
    assert!(wait_until(|| state.is_recording()).await);
    assert!(!state.is_ai_recording());

    assert!(feed.release(Code::Digit1));
    let delivered = h
        .wait_for_ui(Duration::from_secs(5), |e| {
            matches!(e, UiEvent::ResultDelivered { .. })
        })
        .await;
    assert_eq!(delivered, Some(UiEvent::ResultDelivered { pasted: true }));
    assert!(h.clipboard.writes().contains(&"held and released".to_string()));
    assert!(wait_until(|| is_idle(&state)).await);

    feed.release(CTRL);
    h.orchestrator.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hidden_window_blocks_recording() {
    let config = config();
    let mut h = harness("never recorded").config(config.clone()).build();
    let state = h.orchestrator.state();
    h.orchestrator.register_hotkeys(&config.hotkeys).unwrap();
    let feed = h.orchestrator.key_feed().unwrap();

    // ctrl+alt hides the window
    feed.press(CTRL);
    feed.press(ALT);
    let toggled = h
        .wait_for_ui(Duration::from_secs(5), |e| {
            matches!(e, UiEvent::WindowVisibility(_))
        })
        .await;
    assert_eq!(toggled, Some(UiEvent::WindowVisibility(false)));
    assert!(!state.is_window_visible());
    feed.release(ALT);

    feed.press(Code::Digit1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!state.is_recording());
    feed.release(Code::Digit1);
    feed.release(CTRL);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.transcriber.calls(), 0);
    h.orchestrator.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_assistant_hotkey_generates() {
    let mut config = Config::default();
    config.hotkeys.set(HotkeyAction::AiToggle, "alt+shift+a");
    let mut h = harness("how late is it").config(config.clone()).build();
    let state = h.orchestrator.state();
    h.orchestrator.register_hotkeys(&config.hotkeys).unwrap();
    let feed = h.orchestrator.key_feed().unwrap();

    // Right-hand modifiers match the canonical ones
    feed.press(Code::AltRight);
    feed.press(Code::ShiftRight);
    feed.press(Code::KeyA);
    assert!(wait_until(|| state.is_ai_recording()).await);

    feed.release(Code::ShiftRight);
    let finished = h
        .wait_for_ui(Duration::from_secs(5), |e| {
            matches!(e, UiEvent::GenerationFinished { .. })
        })
        .await;
    assert_eq!(
        finished,
        Some(UiEvent::GenerationFinished {
            text: "OK".to_string()
        })
    );
    assert!(wait_until(|| is_idle(&state)).await);
    assert_eq!(state.conversation().len(), 2);

    feed.release(Code::KeyA);
    feed.release(Code::AltRight);
    h.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_invalid_rebind_keeps_previous_bindings() {
    let config = config();
    let h = harness("unused").config(config.clone()).build();
    h.orchestrator.register_hotkeys(&config.hotkeys).unwrap();

    let mut broken = config.hotkeys.clone();
    broken.set(HotkeyAction::AiToggle, "ctrl+f99");
    match h.orchestrator.register_hotkeys(&broken) {
        Err(HotkeyError::InvalidBinding { action, .. }) => {
            assert_eq!(action, HotkeyAction::AiToggle)
        }
        other => panic!("unexpected result {:?}", other),
    }

    let feed = h.orchestrator.key_feed().unwrap();
    assert!(feed.press(CTRL));
    assert!(feed.release(CTRL));
    h.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_key_feed() {
    let config = config();
    let h = harness("unused").config(config.clone()).build();
    h.orchestrator.register_hotkeys(&config.hotkeys).unwrap();
    let feed = h.orchestrator.key_feed().unwrap();

    h.orchestrator.shutdown().await;

    assert!(!feed.press(CTRL));
    assert!(h.orchestrator.key_feed().is_none());
    assert!(h.orchestrator.state().is_exiting());
}
