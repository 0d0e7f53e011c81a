//! Conversation dispatcher — submissions, selection, rename, pruning.
//!
//! DESIGN
//! ======
//! The dispatcher is the only writer to the chat store. A submission
//! appends the user message synchronously, schedules the synthetic reply
//! as a spawned task, and only then performs new-session bookkeeping, so
//! the user message is always observable before the reply or the
//! sidebar entry.
//!
//! Exactly one reply may be in flight. The pending slot holds its
//! `CancellationToken`; selecting or starting a session cancels the token
//! while holding the slot lock, and the reply task re-checks cancellation
//! under the same lock before dispatching, so a cancelled reply can never
//! land after a session switch.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::responder::ReplyEngine;
use crate::chat::store::{Action, ChatStore};
use crate::chat::types::{AttachmentMeta, Message, Payload, Role, SessionId, derive_title};

const DEFAULT_REPLY_DELAY_MS: u64 = 1500;
const DEFAULT_REPLY_JITTER_MS: u64 = 0;
const DEFAULT_HISTORY_RETENTION_DAYS: i64 = 7;
const DEFAULT_HISTORY_MAX_ENTRIES: usize = 50;
const DEFAULT_HISTORY_PRUNE_INTERVAL_SECS: u64 = 3600;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("empty submission: provide text or an attachment")]
    EmptySubmission,
    #[error("a reply is already pending")]
    ReplyPending,
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("session title must not be empty")]
    EmptyTitle,
}

/// Tuning knobs for the dispatcher, loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Base delay before the synthetic reply fires.
    pub reply_delay: Duration,
    /// Extra uniform random delay added on top of the base.
    pub reply_jitter: Duration,
    /// Sessions idle longer than this are pruned.
    pub history_retention: time::Duration,
    /// Sidebar cap; oldest entries beyond it are dropped.
    pub history_max_entries: usize,
}

impl DispatchConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            reply_delay: Duration::from_millis(env_parse("REPLY_DELAY_MS", DEFAULT_REPLY_DELAY_MS)),
            reply_jitter: Duration::from_millis(env_parse("REPLY_JITTER_MS", DEFAULT_REPLY_JITTER_MS)),
            history_retention: time::Duration::days(env_parse(
                "HISTORY_RETENTION_DAYS",
                DEFAULT_HISTORY_RETENTION_DAYS,
            )),
            history_max_entries: env_parse("HISTORY_MAX_ENTRIES", DEFAULT_HISTORY_MAX_ENTRIES),
        }
    }
}

/// Returned from a successful submission.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SubmitReceipt {
    pub session_id: SessionId,
    pub message_id: Uuid,
    /// True when this submission minted the session.
    pub session_created: bool,
}

// =============================================================================
// DISPATCHER
// =============================================================================

pub struct Dispatcher {
    store: Arc<ChatStore>,
    engine: Arc<dyn ReplyEngine>,
    config: DispatchConfig,
    /// Cancellation token of the in-flight reply, if any.
    pending: Arc<Mutex<Option<CancellationToken>>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(store: Arc<ChatStore>, engine: Arc<dyn ReplyEngine>, config: DispatchConfig) -> Self {
        Self { store, engine, config, pending: Arc::new(Mutex::new(None)) }
    }

    /// Accept a user submission and schedule the synthetic reply.
    ///
    /// # Errors
    ///
    /// `EmptySubmission` for whitespace-only text with no attachment;
    /// `ReplyPending` while a prior reply is still in flight.
    pub fn submit(
        &self,
        text: &str,
        attachment: Option<AttachmentMeta>,
    ) -> Result<SubmitReceipt, ChatError> {
        let text = text.trim();
        if text.is_empty() && attachment.is_none() {
            return Err(ChatError::EmptySubmission);
        }

        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(ChatError::ReplyPending);
        }

        let snapshot = self.store.snapshot();
        let session_created = snapshot.current.is_none();
        let session_id = snapshot.current.unwrap_or_else(Uuid::new_v4);

        let message = Message::new(
            Role::User,
            text,
            attachment.clone().map(Payload::Attachment),
        );
        let message_id = message.id;
        self.store.dispatch(Action::UserSubmitted { session_id, message });

        let token = CancellationToken::new();
        self.spawn_reply(session_id, text.to_string(), attachment.clone(), token.clone());
        *slot = Some(token);
        drop(slot);

        if session_created {
            let title = match (text.is_empty(), &attachment) {
                (true, Some(meta)) => derive_title(&meta.filename),
                _ => derive_title(text),
            };
            self.store.dispatch(Action::SessionOpened { session_id, title });
            // Cap is enforced on insert, retention on the background sweep.
            self.store.dispatch(Action::HistoryPruned {
                cutoff: time::OffsetDateTime::now_utc() - self.config.history_retention,
                max_entries: self.config.history_max_entries,
            });
            info!(%session_id, "session opened");
        }

        debug!(%session_id, %message_id, "submission accepted");
        Ok(SubmitReceipt { session_id, message_id, session_created })
    }

    /// Switch the current session. Cancels any pending reply.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if the id is unknown.
    pub fn select_session(&self, session_id: SessionId) -> Result<(), ChatError> {
        if !self.store.snapshot().sessions.contains_key(&session_id) {
            return Err(ChatError::SessionNotFound(session_id));
        }
        self.cancel_pending();
        self.store.dispatch(Action::SessionSelected { session_id });
        debug!(%session_id, "session selected");
        Ok(())
    }

    /// Clear the current pointer; the next submission mints a new session.
    /// Cancels any pending reply.
    pub fn start_session(&self) {
        self.cancel_pending();
        self.store.dispatch(Action::SessionClosed);
    }

    /// Overwrite a session title. Messages and timestamps are untouched.
    ///
    /// # Errors
    ///
    /// `EmptyTitle` for whitespace-only titles; `SessionNotFound` for
    /// unknown ids.
    pub fn rename_session(&self, session_id: SessionId, title: &str) -> Result<(), ChatError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle);
        }
        if !self.store.snapshot().sessions.contains_key(&session_id) {
            return Err(ChatError::SessionNotFound(session_id));
        }
        self.store.dispatch(Action::SessionRenamed { session_id, title: title.to_string() });
        Ok(())
    }

    /// Drop sessions idle beyond the retention window and enforce the cap.
    pub fn prune_history(&self) {
        self.store.dispatch(Action::HistoryPruned {
            cutoff: time::OffsetDateTime::now_utc() - self.config.history_retention,
            max_entries: self.config.history_max_entries,
        });
    }

    fn cancel_pending(&self) {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = slot.take() {
            token.cancel();
            self.store.dispatch(Action::ReplyAbandoned);
            debug!("pending reply cancelled");
        }
    }

    fn spawn_reply(
        &self,
        session_id: SessionId,
        text: String,
        attachment: Option<AttachmentMeta>,
        token: CancellationToken,
    ) {
        let store = Arc::clone(&self.store);
        let engine = Arc::clone(&self.engine);
        let pending = Arc::clone(&self.pending);
        let delay = delay_with_jitter(self.config.reply_delay, self.config.reply_jitter);

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            let reply = engine.compose(&text, attachment.as_ref()).await;

            // Re-check under the slot lock: cancellation happens while the
            // lock is held, so a cancelled reply can never be dispatched.
            let mut slot = pending.lock().unwrap_or_else(PoisonError::into_inner);
            if token.is_cancelled() {
                return;
            }
            let message = Message::new(Role::Bot, reply.content, reply.payload);
            store.dispatch(Action::ReplyArrived { session_id, message });
            *slot = None;
        });
    }
}

fn delay_with_jitter(base: Duration, jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return base;
    }
    let jitter_ms = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
    let extra = rand::rng().random_range(0..=jitter_ms);
    base + Duration::from_millis(extra)
}

// =============================================================================
// BACKGROUND PRUNING
// =============================================================================

/// Spawn the periodic history sweep. Returns a handle for shutdown.
pub fn spawn_prune_task(dispatcher: Arc<Dispatcher>) -> JoinHandle<()> {
    let interval_secs = env_parse("HISTORY_PRUNE_INTERVAL_SECS", DEFAULT_HISTORY_PRUNE_INTERVAL_SECS);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            dispatcher.prune_history();
        }
    })
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
