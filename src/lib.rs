//! Multi-canvas component board.
//!
//! ARCHITECTURE
//! ============
//! - `state`: canvases, components, id generation.
//! - `services`: the canvas and project stores, duplicate suppression,
//!   persistence.
//! - `view`: tab bar and drag-and-drop controller plus the render model.
//! - `adapters`: agent-facing interactables synced with the store.
//! - `tools`: agent tool definitions and executors over the project model.
//! - `config`: environment-driven settings.

pub mod adapters;
pub mod config;
pub mod services;
pub mod state;
pub mod tools;
pub mod view;
