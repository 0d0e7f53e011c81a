//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic so route handlers can stay focused
//! on extraction and status mapping.

pub mod export;
pub mod reports;
pub mod users;
