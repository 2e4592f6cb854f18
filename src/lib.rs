//! autohook - vehicle event webhooks fanned out to voice, SMS and lights
//!
//! This library provides the alert registry and channels that turn one
//! incoming telemetry event into concurrent notifications, plus the thin
//! HTTP, SMS, speech and Hue collaborators they talk to.

pub mod alerts;
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod event;
pub mod event_log;
pub mod lights;
pub mod phrase;
pub mod server;
pub mod worker_group;

// Re-export core types for convenience
pub use crate::core::*;
