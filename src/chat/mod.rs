//! Conversation core: data model, state container, dispatcher, responder.
//!
//! ARCHITECTURE
//! ============
//! `store` owns the single source of truth (immutable snapshots + pure
//! reducer). `dispatcher` is the only writer and the seam the HTTP routes
//! talk to. `responder` synthesizes the bot side from fixtures.

pub mod dispatcher;
pub mod responder;
pub mod store;
pub mod types;
