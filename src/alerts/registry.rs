//! The per-event set of alert channels and its parallel dispatch.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::core::{Alert, AlertError, DispatchSummary, RegistrationError};
use crate::worker_group::WorkerGroup;

/// Holds the alert channels registered for one event.
#[derive(Default)]
pub struct AlertRegistry {
    channels: Vec<Arc<dyn Alert>>,
    timeout: Option<Duration>,
}

impl AlertRegistry {
    /// Creates an empty registry with no per-channel deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds each channel's `trigger()` by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates and appends a channel.
    ///
    /// A rejected channel is not added.
    pub fn register(&mut self, channel: Arc<dyn Alert>) -> Result<(), RegistrationError> {
        channel.validate()?;
        debug!(channel = channel.name(), "Registered alert channel");
        self.channels.push(channel);
        Ok(())
    }

    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// The registered channels, in registration order.
    pub fn channels(&self) -> &[Arc<dyn Alert>] {
        &self.channels
    }

    /// Triggers every channel concurrently and waits for all of them.
    ///
    /// Channel failures are logged and counted but never cancel siblings
    /// and never escape this call.
    #[instrument(skip(self), fields(channels = self.channels.len()))]
    pub async fn trigger_all(&self) -> DispatchSummary {
        let mut workers = WorkerGroup::with_capacity(self.channels.len());

        for channel in &self.channels {
            let channel = channel.clone();
            let timeout = self.timeout;
            workers.spawn(channel.name().to_string(), async move {
                match timeout {
                    Some(after) => tokio::time::timeout(after, channel.trigger())
                        .await
                        .unwrap_or_else(|_| {
                            Err(AlertError::TimedOut {
                                channel: channel.name().to_string(),
                                after,
                            })
                        }),
                    None => channel.trigger().await,
                }
            });
        }

        let mut summary = DispatchSummary::default();
        for (name, result) in workers.join().await {
            match result {
                Ok(Ok(())) => {
                    metrics::counter!("alerts_triggered_total", "channel" => name.clone())
                        .increment(1);
                    debug!(channel = %name, "Alert channel completed");
                    summary.succeeded += 1;
                }
                Ok(Err(e)) => {
                    metrics::counter!("alerts_failed_total", "channel" => name.clone())
                        .increment(1);
                    error!(channel = %name, error = %e, "Alert channel failed");
                    summary.failed += 1;
                }
                // The panic itself was already logged by the worker group.
                Err(_) => {
                    metrics::counter!("alerts_failed_total", "channel" => name.clone())
                        .increment(1);
                    summary.failed += 1;
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Alert dispatch finished"
        );
        summary
    }
}
