//! Default actions and guards for every hotkey

use std::collections::HashMap;
use std::sync::Arc;

use super::Inner;
use crate::config::HotkeyAction;
use crate::hotkeys::ActionHandlers;
use crate::pipeline::GenerationMode;
use crate::recording::RecordingKind;
use crate::ui::UiEvent;

pub(crate) fn default_handlers(inner: &Arc<Inner>) -> HashMap<HotkeyAction, ActionHandlers> {
    HotkeyAction::ALL
        .into_iter()
        .map(|action| (action, handlers_for(inner, action)))
        .collect()
}

fn handlers_for(inner: &Arc<Inner>, action: HotkeyAction) -> ActionHandlers {
    match action {
        HotkeyAction::ToggleVisibility => {
            let inner = Arc::clone(inner);
            ActionHandlers::new().on_activate(move || {
                let visible = inner.state.toggle_window_visible();
                tracing::debug!(visible, "Window visibility toggled");
                inner.ui.notify(UiEvent::WindowVisibility(visible));
                async {}
            })
        }
        HotkeyAction::RecordToggle => {
            let start = Arc::clone(inner);
            let stop = Arc::clone(inner);
            let can_start = Arc::clone(inner);
            let can_stop = Arc::clone(inner);
            ActionHandlers::new()
                .on_activate(move || {
                    // The recording must be up before the release is evaluated
                    let started = start.start_recording(RecordingKind::Dictation);
                    async move {
                        let _ = started.await;
                    }
                })
                .on_deactivate(move || {
                    let _ = stop.finish_recording();
                    async {}
                })
                .activate_when(move || {
                    let state = &can_start.state;
                    state.is_window_visible() && !state.is_recording() && !state.is_busy()
                })
                .deactivate_when(move || can_stop.state.is_recording())
        }
        HotkeyAction::AiToggle => assistant_handlers(inner, GenerationMode::Text),
        HotkeyAction::WebSearchToggle => assistant_handlers(inner, GenerationMode::Web),
        HotkeyAction::ScreenVisionToggle => assistant_handlers(inner, GenerationMode::Vision),
    }
}

/// Hold to record, release to generate
fn assistant_handlers(inner: &Arc<Inner>, mode: GenerationMode) -> ActionHandlers {
    let start = Arc::clone(inner);
    let stop = Arc::clone(inner);
    let can_start = Arc::clone(inner);
    let can_stop = Arc::clone(inner);
    ActionHandlers::new()
        .on_activate(move || {
            // The recording must be up before the release is evaluated
            let started = start.start_recording(RecordingKind::Assistant(mode));
            async move {
                let _ = started.await;
            }
        })
        .on_deactivate(move || {
            let _ = stop.finish_recording();
            async {}
        })
        .activate_when(move || {
            let state = &can_start.state;
            state.is_window_visible() && !state.is_ai_recording() && !state.is_busy()
        })
        .deactivate_when(move || can_stop.state.is_ai_recording())
}
