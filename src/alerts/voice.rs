//! Speaks the event phrase aloud.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::core::{Alert, AlertError};
use crate::event::EventEnvelope;

#[derive(Debug, Error)]
pub enum SpeakError {
    #[error("failed to start speech program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("speech program '{program}' exited with {status}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Something that can read text aloud.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), SpeakError>;
}

/// Runs a text-to-speech program with the text as its only argument.
#[derive(Debug, Clone)]
pub struct SayCommand {
    program: String,
}

impl SayCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SayCommand {
    fn default() -> Self {
        Self::new("say")
    }
}

#[async_trait]
impl Speaker for SayCommand {
    async fn speak(&self, text: &str) -> Result<(), SpeakError> {
        let status = Command::new(&self.program)
            .arg(text)
            .status()
            .await
            .map_err(|source| SpeakError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeakError::Exit {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// An alert channel that announces the event phrase.
pub struct VoiceAlert {
    event: Arc<EventEnvelope>,
    speaker: Arc<dyn Speaker>,
}

impl VoiceAlert {
    pub fn new(event: Arc<EventEnvelope>, speaker: Arc<dyn Speaker>) -> Self {
        Self { event, speaker }
    }
}

#[async_trait]
impl Alert for VoiceAlert {
    fn name(&self) -> &str {
        "voice"
    }

    #[instrument(skip(self))]
    async fn trigger(&self) -> Result<(), AlertError> {
        let phrase = self.event.phrase();
        debug!(phrase, "Announcing event");
        self.speaker
            .speak(phrase)
            .await
            .map_err(|e| AlertError::external(self.name(), e))
    }
}
