//! The typed view of one incoming webhook event.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::phrase;

/// Raised when a payload cannot be turned into an envelope.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// An immutable incoming event.
///
/// The attribute mapping is kept verbatim, in the order it arrived, so that
/// it can be written to the event log unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    attributes: Map<String, Value>,
    received_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            received_at: Utc::now(),
        }
    }

    /// Builds an envelope from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        match value {
            Value::Object(attributes) => Ok(Self::new(attributes)),
            Value::Null => Err(EventError::NotAnObject("null")),
            Value::Bool(_) => Err(EventError::NotAnObject("a boolean")),
            Value::Number(_) => Err(EventError::NotAnObject("a number")),
            Value::String(_) => Err(EventError::NotAnObject("a string")),
            Value::Array(_) => Err(EventError::NotAnObject("an array")),
        }
    }

    /// Parses a raw JSON body (or one event-log line).
    pub fn from_json(body: &str) -> Result<Self, EventError> {
        Self::from_value(serde_json::from_str(body)?)
    }

    /// The `type` attribute, if present and a string.
    pub fn event_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }

    pub fn phrase(&self) -> &'static str {
        phrase::resolve(self.event_type())
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Serializes the attribute mapping as a single log line, newline included.
    pub fn to_log_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(&self.attributes)?;
        line.push('\n');
        Ok(line)
    }
}
