//! Rendering seam between the chat engine and whatever displays it.

use std::sync::Mutex;

use lorekeeper_core::types::{ChatTurn, Sender};

use crate::loading::LoadingHandle;

/// Displays chat turns and loading indicators.
///
/// Calls arrive from the orchestrator in the order events happen. A presenter
/// must tolerate `hide_loading` for a handle it has already hidden.
pub trait Presenter: Send + Sync {
    /// Show one turn. Called after the turn has been persisted.
    fn render_turn(&self, turn: &ChatTurn);

    fn show_loading(&self, handle: LoadingHandle);

    fn hide_loading(&self, handle: LoadingHandle);

    /// Remove every rendered turn from the display.
    fn clear(&self);
}

// =============================================================================
// RecordingPresenter
// =============================================================================

/// Something a [`RecordingPresenter`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Turn { sender: Sender, text: String },
    ShowLoading(LoadingHandle),
    HideLoading(LoadingHandle),
    Clear,
}

/// Presenter that keeps every call in memory. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Text of every rendered bot turn, in order.
    pub fn bot_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Turn {
                    sender: Sender::Bot,
                    text,
                } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn take(&self) -> Vec<PresenterEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    fn push(&self, event: PresenterEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Presenter for RecordingPresenter {
    fn render_turn(&self, turn: &ChatTurn) {
        self.push(PresenterEvent::Turn {
            sender: turn.sender,
            text: turn.text.clone(),
        });
    }

    fn show_loading(&self, handle: LoadingHandle) {
        self.push(PresenterEvent::ShowLoading(handle));
    }

    fn hide_loading(&self, handle: LoadingHandle) {
        self.push(PresenterEvent::HideLoading(handle));
    }

    fn clear(&self) {
        self.push(PresenterEvent::Clear);
    }
}
