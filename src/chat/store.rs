//! Chat state container — immutable snapshots, pure reducer, watch channel.
//!
//! DESIGN
//! ======
//! All conversation state lives in a single `ChatState` value. Mutations
//! are expressed as `Action`s and applied by the pure `reduce` function;
//! `ChatStore` serializes dispatches and publishes each new snapshot over
//! a `tokio::sync::watch` channel. Consumers only ever see snapshots —
//! there is no shared mutable session data outside the store.
//!
//! ORDERING
//! ========
//! `UserSubmitted` appends the user message (creating the session record
//! on first use) before `SessionOpened` makes the session visible in the
//! history order. A user message is therefore always observable in a
//! snapshot before the matching bot reply or history entry.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use time::OffsetDateTime;
use tokio::sync::watch;

use crate::chat::types::{HistoryEntry, Message, Session, SessionId};

// =============================================================================
// STATE
// =============================================================================

/// Immutable snapshot of all conversation state.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Sessions keyed by id. Message lists are append-only.
    pub sessions: HashMap<SessionId, Session>,
    /// Session ids in sidebar order, newest first.
    pub order: Vec<SessionId>,
    /// At most one session is current.
    pub current: Option<SessionId>,
    /// True while a synthetic reply is queued. Gates new submissions.
    pub reply_pending: bool,
}

impl ChatState {
    /// Messages of the current session, in insertion order.
    /// Empty when no session is current.
    #[must_use]
    pub fn visible_messages(&self) -> &[Message] {
        self.current
            .and_then(|id| self.sessions.get(&id))
            .map_or(&[], |session| session.messages.as_slice())
    }

    /// Sidebar projections, newest first.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .map(Session::history_entry)
            .collect()
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// State transitions. Dispatched only by the conversation dispatcher;
/// the reducer is total and treats unknown session ids as no-ops, since
/// a pending reply can outlive a pruned session.
#[derive(Debug, Clone)]
pub enum Action {
    /// Append a user message. Creates the session record (untitled, not
    /// yet in the sidebar order) on first use and marks it current.
    UserSubmitted { session_id: SessionId, message: Message },
    /// Title the session and insert it at the front of the sidebar order.
    SessionOpened { session_id: SessionId, title: String },
    /// Append the synthetic bot reply and clear the pending flag.
    ReplyArrived { session_id: SessionId, message: Message },
    /// A pending reply was cancelled; clear the pending flag only.
    ReplyAbandoned,
    /// Switch the current pointer to an existing session.
    SessionSelected { session_id: SessionId },
    /// Clear the current pointer; the next submission mints a new session.
    SessionClosed,
    /// Overwrite a session's title. Messages and timestamps unchanged.
    SessionRenamed { session_id: SessionId, title: String },
    /// Drop sessions with last activity before `cutoff`, then cap the
    /// sidebar at `max_entries` (oldest dropped). The current pointer is
    /// cleared if its session is dropped.
    HistoryPruned { cutoff: OffsetDateTime, max_entries: usize },
}

// =============================================================================
// REDUCER
// =============================================================================

/// Pure state transition. Consumes the previous snapshot, returns the next.
#[must_use]
pub fn reduce(mut state: ChatState, action: Action) -> ChatState {
    match action {
        Action::UserSubmitted { session_id, message } => {
            let timestamp = message.timestamp;
            let session = state.sessions.entry(session_id).or_insert_with(|| Session {
                id: session_id,
                title: String::new(),
                created_at: timestamp,
                last_activity: timestamp,
                messages: Vec::new(),
            });
            session.messages.push(message);
            session.last_activity = timestamp;
            state.current = Some(session_id);
            state.reply_pending = true;
        }
        Action::SessionOpened { session_id, title } => {
            if let Some(session) = state.sessions.get_mut(&session_id) {
                session.title = title;
                if !state.order.contains(&session_id) {
                    state.order.insert(0, session_id);
                }
            }
        }
        Action::ReplyArrived { session_id, message } => {
            state.reply_pending = false;
            if let Some(session) = state.sessions.get_mut(&session_id) {
                session.last_activity = message.timestamp;
                session.messages.push(message);
            }
        }
        Action::ReplyAbandoned => {
            state.reply_pending = false;
        }
        Action::SessionSelected { session_id } => {
            if state.sessions.contains_key(&session_id) {
                state.current = Some(session_id);
            }
        }
        Action::SessionClosed => {
            state.current = None;
        }
        Action::SessionRenamed { session_id, title } => {
            if let Some(session) = state.sessions.get_mut(&session_id) {
                session.title = title;
            }
        }
        Action::HistoryPruned { cutoff, max_entries } => {
            state.order.retain(|id| {
                state.sessions.get(id).is_some_and(|s| s.last_activity > cutoff)
            });
            state.order.truncate(max_entries);
            let keep: std::collections::HashSet<SessionId> = state.order.iter().copied().collect();
            // An untitled session is a thread mid-creation: current but not
            // yet in the sidebar order. Keep it.
            state
                .sessions
                .retain(|id, s| keep.contains(id) || (state.current == Some(*id) && s.title.is_empty()));
            if let Some(current) = state.current {
                if !state.sessions.contains_key(&current) {
                    state.current = None;
                }
            }
        }
    }
    state
}

// =============================================================================
// STORE
// =============================================================================

/// Serialized dispatch over the reducer, snapshots published via watch.
pub struct ChatStore {
    tx: watch::Sender<ChatState>,
    /// Guards the read-reduce-publish cycle so concurrent dispatches
    /// never interleave.
    write: Mutex<()>,
}

impl ChatStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ChatState::default());
        Self { tx, write: Mutex::new(()) }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ChatState {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.tx.subscribe()
    }

    /// Apply an action and publish the resulting snapshot.
    pub fn dispatch(&self, action: Action) {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let next = reduce(self.tx.borrow().clone(), action);
        // send_replace stores the snapshot even with no live receivers;
        // plain send would discard it once the last receiver is gone.
        self.tx.send_replace(next);
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
