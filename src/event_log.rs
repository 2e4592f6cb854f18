//! Append-only JSON-lines log of every received event.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::event::EventEnvelope;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to append to event log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write-through log: one line per event, file created on first write.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the event's attribute mapping as one JSON line.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn append(&self, event: &EventEnvelope) -> Result<(), EventLogError> {
        let line = event.to_log_line()?;
        let io_err = |source| EventLogError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        debug!(bytes = line.len(), "Appended event to log");
        Ok(())
    }
}
