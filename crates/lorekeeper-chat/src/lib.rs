//! Conversational interface for Lorekeeper.
//!
//! Turns free-text questions into reference API lookups: keyword dispatch,
//! HTTP fetching, message formatting, and the orchestrator that persists and
//! renders every turn.

pub mod client;
pub mod error;
pub mod loading;
pub mod orchestrator;
pub mod parser;
pub mod presenter;
pub mod response;

pub use client::{HttpReferenceClient, ReferenceApi};
pub use error::ChatError;
pub use loading::{LoadingGuard, LoadingHandle, LoadingTracker};
pub use orchestrator::ChatOrchestrator;
pub use parser::{ability_query, QueryDispatcher};
pub use presenter::{Presenter, PresenterEvent, RecordingPresenter};
pub use response::ResponseFormatter;
