//! Chat orchestrator: central coordinator wiring dispatcher, API, history, and presenter.
//!
//! Every turn is persisted before it is rendered. API failures never escape
//! as errors; they become one apologetic bot turn and a `warn!` line.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use lorekeeper_core::config::{ApiSourceConfig, ChatConfig};
use lorekeeper_core::registry::ApiSource;
use lorekeeper_core::types::{ChatTurn, DetailLayout, Intent, Sender};
use lorekeeper_storage::HistoryStore;

use crate::client::{fetch_collection, ReferenceApi};
use crate::error::ChatError;
use crate::loading::LoadingTracker;
use crate::parser::QueryDispatcher;
use crate::presenter::Presenter;
use crate::response::{self, ResponseFormatter, STILL_LOADING};

/// Label used in messages when no source is registered.
const FALLBACK_LABEL: &str = "reference";

/// Where one category's data lives, resolved before any request is made.
#[derive(Debug, Clone)]
struct Target {
    label: String,
    collection_url: String,
    layout: DetailLayout,
    source: ApiSource,
}

/// Central chat orchestrator.
///
/// `Send + Sync`; overlapping calls are allowed and each gets its own
/// loading indicator.
pub struct ChatOrchestrator<A: ReferenceApi> {
    dispatcher: RwLock<QueryDispatcher>,
    api: A,
    history: HistoryStore,
    presenter: Arc<dyn Presenter>,
    loading: LoadingTracker,
    formatter: ResponseFormatter,
    max_message_length: usize,
    /// Sources present at construction. Only these are checked by `connect`.
    startup_sources: usize,
    ready: AtomicBool,
}

impl<A: ReferenceApi> ChatOrchestrator<A> {
    pub fn new(
        config: &ChatConfig,
        dispatcher: QueryDispatcher,
        api: A,
        history: HistoryStore,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let startup_sources = dispatcher.registry().sources().len();
        Self {
            dispatcher: RwLock::new(dispatcher),
            api,
            history,
            presenter,
            loading: LoadingTracker::new(),
            formatter: ResponseFormatter::new(config.list_limit),
            max_message_length: config.max_message_length,
            startup_sources,
            ready: AtomicBool::new(false),
        }
    }

    /// Whether the startup connection has succeeded.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Render the stored history, then connect.
    pub async fn start(&self) -> Result<bool, ChatError> {
        self.replay_history()?;
        self.connect().await
    }

    /// Load the root document of every source configured at startup.
    ///
    /// Sources added later through [`Self::register_source`] are not checked.
    /// Succeeds only if all roots load. On success the greeting is shown when
    /// the history is empty. On failure one apology is shown and queries keep
    /// answering [`STILL_LOADING`] until a later `connect` succeeds. Never
    /// retried automatically.
    pub async fn connect(&self) -> Result<bool, ChatError> {
        let mut sources = self.sources()?;
        sources.truncate(self.startup_sources);
        let loading = self.loading.begin(self.presenter.clone());

        for source in &sources {
            if let Err(e) = self.api.get_json(source.base_url()).await {
                warn!(source = source.name(), error = %e, "Failed to load API root");
                drop(loading);
                self.ready.store(false, Ordering::SeqCst);
                self.say(Sender::Bot, &response::connect_failed(source.label()))?;
                return Ok(false);
            }
            debug!(source = source.name(), "API root loaded");
        }
        drop(loading);

        self.ready.store(true, Ordering::SeqCst);
        info!(sources = sources.len(), "Connected to reference APIs");

        if self.history.load()?.is_empty() {
            let categories = self.categories()?;
            let greeting = response::greeting(&self.primary_label()?, &categories);
            self.say(Sender::Bot, &greeting)?;
        }
        Ok(true)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Handle one line of user input.
    ///
    /// Returns the bot messages produced, in order. Each has already been
    /// persisted and rendered.
    pub async fn handle_message(&self, message: &str) -> Result<Vec<String>, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        self.say(Sender::User, message)?;

        let replies = if !self.is_ready() {
            vec![STILL_LOADING.to_string()]
        } else {
            let intent = self.interpret(message)?;
            match intent {
                Intent::Fallback { categories } => vec![response::fallback(&categories)],
                Intent::ListSearch {
                    source,
                    category,
                    search_term,
                } => {
                    self.execute_list_search(&source, &category, &search_term)
                        .await?
                }
                Intent::DetailFetch {
                    source,
                    category,
                    search_term,
                } => {
                    self.execute_detail_fetch(&source, &category, &search_term)
                        .await?
                }
            }
        };

        for reply in &replies {
            self.say(Sender::Bot, reply)?;
        }
        Ok(replies)
    }

    /// Interpret `message` with the current dispatcher.
    pub fn interpret(&self, message: &str) -> Result<Intent, ChatError> {
        let dispatcher = self
            .dispatcher
            .read()
            .map_err(|e| ChatError::Registry(format!("dispatcher lock poisoned: {}", e)))?;
        Ok(dispatcher.interpret(message))
    }

    /// Fetch a category's collection and list the names matching `search_term`.
    ///
    /// Fetch failures become a single apology message.
    pub async fn execute_list_search(
        &self,
        source: &str,
        category: &str,
        search_term: &str,
    ) -> Result<Vec<String>, ChatError> {
        let target = self.target(source, category)?;

        let fetched = {
            let _loading = self.loading.begin(self.presenter.clone());
            fetch_collection(&self.api, &target.collection_url).await
        };

        Ok(match fetched {
            Ok(items) => {
                debug!(category, count = items.len(), "Collection fetched");
                self.formatter.list_results(category, search_term, &items)
            }
            Err(e) => {
                warn!(category, search_term, error = %e, "List search failed");
                vec![response::search_failed(&target.label)]
            }
        })
    }

    /// Resolve `search_term` to one item by exact name or index and show its details.
    ///
    /// Any failure becomes a single "couldn't find" message.
    pub async fn execute_detail_fetch(
        &self,
        source: &str,
        category: &str,
        search_term: &str,
    ) -> Result<Vec<String>, ChatError> {
        let target = self.target(source, category)?;

        let fetched = {
            let _loading = self.loading.begin(self.presenter.clone());
            self.fetch_detail(&target, category, search_term).await
        };

        Ok(match fetched {
            Ok(details) => self.formatter.detail(target.layout, search_term, &details),
            Err(e) => {
                warn!(category, search_term, error = %e, "Detail fetch failed");
                vec![response::detail_failed(search_term, category)]
            }
        })
    }

    async fn fetch_detail(
        &self,
        target: &Target,
        category: &str,
        search_term: &str,
    ) -> Result<Value, ChatError> {
        let items = fetch_collection(&self.api, &target.collection_url).await?;

        let wanted = search_term.to_lowercase();
        let item = items
            .iter()
            .find(|i| {
                i.name.to_lowercase() == wanted
                    || i.index.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str())
            })
            .ok_or_else(|| ChatError::NotFound {
                term: search_term.to_string(),
                category: category.to_string(),
            })?;

        let index = item.index.as_deref().ok_or_else(|| {
            ChatError::MalformedResponse(format!("item '{}' has no index", item.name))
        })?;
        let url = target
            .source
            .item_url(category, index)
            .ok_or_else(|| ChatError::UnknownCategory(category.to_string()))?;

        debug!(%url, "Fetching item details");
        self.api.get_json(&url).await
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Every stored turn, oldest first.
    pub fn history(&self) -> Result<Vec<ChatTurn>, ChatError> {
        Ok(self.history.load()?)
    }

    /// Render every stored turn without changing the history.
    pub fn replay_history(&self) -> Result<usize, ChatError> {
        let turns = self.history.load()?;
        for turn in &turns {
            self.presenter.render_turn(turn);
        }
        Ok(turns.len())
    }

    /// Delete the history, clear the display, and post the confirmation turn.
    pub fn clear_history(&self) -> Result<(), ChatError> {
        self.history.clear()?;
        self.presenter.clear();
        info!("Chat history cleared");
        let label = self.primary_label()?;
        self.say(Sender::Bot, &response::history_cleared(&label))
    }

    // =========================================================================
    // Sources
    // =========================================================================

    /// Register another API source. Its keywords rank after all existing ones.
    ///
    /// The new source's root is not fetched; readiness is unchanged.
    pub fn register_source(&self, config: ApiSourceConfig) -> Result<(), ChatError> {
        let mut dispatcher = self
            .dispatcher
            .write()
            .map_err(|e| ChatError::Registry(format!("dispatcher lock poisoned: {}", e)))?;
        dispatcher.register_source(config)
    }

    /// Registered sources in registration order.
    pub fn sources(&self) -> Result<Vec<ApiSource>, ChatError> {
        let dispatcher = self
            .dispatcher
            .read()
            .map_err(|e| ChatError::Registry(format!("dispatcher lock poisoned: {}", e)))?;
        Ok(dispatcher.registry().sources().to_vec())
    }

    /// Every category of every source, in registration order.
    pub fn categories(&self) -> Result<Vec<String>, ChatError> {
        let dispatcher = self
            .dispatcher
            .read()
            .map_err(|e| ChatError::Registry(format!("dispatcher lock poisoned: {}", e)))?;
        Ok(dispatcher.registry().categories())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Persist a turn, then render it.
    fn say(&self, sender: Sender, text: &str) -> Result<(), ChatError> {
        let turn = ChatTurn::new(sender, text);
        self.history.append(&turn)?;
        self.presenter.render_turn(&turn);
        Ok(())
    }

    fn primary_label(&self) -> Result<String, ChatError> {
        Ok(self
            .sources()?
            .first()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| FALLBACK_LABEL.to_string()))
    }

    fn target(&self, source: &str, category: &str) -> Result<Target, ChatError> {
        let dispatcher = self
            .dispatcher
            .read()
            .map_err(|e| ChatError::Registry(format!("dispatcher lock poisoned: {}", e)))?;
        let api_source = dispatcher
            .registry()
            .get(source)
            .ok_or_else(|| ChatError::UnknownCategory(format!("{}/{}", source, category)))?;
        let collection_url = api_source
            .collection_url(category)
            .ok_or_else(|| ChatError::UnknownCategory(category.to_string()))?;
        Ok(Target {
            label: api_source.label().to_string(),
            collection_url,
            layout: api_source.layout(category),
            source: api_source.clone(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
