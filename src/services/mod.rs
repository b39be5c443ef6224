//! Domain services behind the view and the agent adapters.
//!
//! ARCHITECTURE
//! ============
//! Service modules own state mutation and persistence so the view and the
//! adapters stay focused on translating events into store calls.

pub mod canvas;
pub mod pending;
pub mod persistence;
pub mod project;
