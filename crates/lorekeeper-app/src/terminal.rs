//! Terminal presenter: styled transcript on stdout, spinners on stderr.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use lorekeeper_chat::{LoadingHandle, Presenter};
use lorekeeper_core::types::{ChatTurn, Sender};

/// Renders chat turns to the terminal.
///
/// While collapsed, turns are still persisted by the orchestrator but not
/// printed; expanding replays the stored history.
pub struct TerminalPresenter {
    term: Term,
    spinners: Mutex<HashMap<LoadingHandle, ProgressBar>>,
    collapsed: AtomicBool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            spinners: Mutex::new(HashMap::new()),
            collapsed: AtomicBool::new(false),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.load(Ordering::SeqCst)
    }

    /// Flip the collapsed state. Returns the new state.
    pub fn toggle(&self) -> bool {
        !self.collapsed.fetch_xor(true, Ordering::SeqCst)
    }

    /// Expand the transcript. Returns whether it was collapsed.
    pub fn expand(&self) -> bool {
        self.collapsed.swap(false, Ordering::SeqCst)
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn render_turn(&self, turn: &ChatTurn) {
        if self.is_collapsed() {
            return;
        }
        let line = match turn.sender {
            Sender::User => format!("{} {}", style("You ›").cyan().bold(), turn.text),
            Sender::Bot => format!("{} {}", style("Lorekeeper ›").green().bold(), turn.text),
        };
        let _ = self.term.write_line(&line);
    }

    fn show_loading(&self, handle: LoadingHandle) {
        if self.is_collapsed() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("consulting the archives...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut spinners) = self.spinners.lock() {
            spinners.insert(handle, spinner);
        }
    }

    fn hide_loading(&self, handle: LoadingHandle) {
        let spinner = self
            .spinners
            .lock()
            .ok()
            .and_then(|mut spinners| spinners.remove(&handle));
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }

    fn clear(&self) {
        let _ = self.term.clear_screen();
    }
}
