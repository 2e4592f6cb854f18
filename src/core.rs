//! Core domain types and service traits for autohook
//!
//! This module defines the capability contracts that every alert channel and
//! every external collaborator implements, together with the error types that
//! flow between them.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Raised when a channel is rejected at registration time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("invalid alert channel '{channel}': {reason}")]
    InvalidChannel { channel: String, reason: String },
}

/// Raised by a single channel's `trigger()`.
///
/// These never cross the registry boundary; they are logged and counted.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert channel '{channel}' failed: {source}")]
    External {
        channel: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("alert channel '{channel}' did not finish within {after:?}")]
    TimedOut { channel: String, after: Duration },
}

impl AlertError {
    /// Wraps a collaborator failure for the named channel.
    pub fn external(channel: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::External {
            channel: channel.into(),
            source: source.into(),
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// A notification channel that can be triggered for one event.
#[async_trait]
pub trait Alert: Send + Sync {
    /// A short, descriptive name used for logging and metrics
    /// (e.g., "voice", "sms:+15550100", "lights").
    fn name(&self) -> &str;

    /// Checks the channel's own configuration before it is registered.
    ///
    /// # Returns
    /// * `Ok(())` if the channel can be dispatched
    /// * `Err(RegistrationError::InvalidChannel)` if wiring is wrong
    fn validate(&self) -> Result<(), RegistrationError> {
        Ok(())
    }

    /// Fires the channel's side effect and waits for it to finish.
    async fn trigger(&self) -> Result<(), AlertError>;
}

/// Outcome counts of one `AlertRegistry::trigger_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}
