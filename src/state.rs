//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the chat store and its dispatcher, the in-memory user store,
//! and the theme selection. Everything is Arc-wrapped so the state clones
//! cheaply per request.

use std::sync::Arc;

use crate::chat::dispatcher::{DispatchConfig, Dispatcher};
use crate::chat::responder::{KeywordResponder, ReplyEngine};
use crate::chat::store::ChatStore;
use crate::services::users::UserStore;
use crate::theme::ThemeStore;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub users: Arc<UserStore>,
    pub themes: Arc<ThemeStore>,
}

impl AppState {
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_engine(config, Arc::new(KeywordResponder))
    }

    #[must_use]
    pub fn with_engine(config: DispatchConfig, engine: Arc<dyn ReplyEngine>) -> Self {
        let chat = Arc::new(ChatStore::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&chat), engine, config));
        Self {
            chat,
            dispatcher,
            users: Arc::new(UserStore::new()),
            themes: Arc::new(ThemeStore::new()),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
