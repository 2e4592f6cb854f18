//! Texts the event phrase to a phone number.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::core::{Alert, AlertError, RegistrationError};
use crate::event::EventEnvelope;

static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("E.164 pattern is valid"));

/// Checks a phone number is in E.164 form (e.g. `+15550100`).
pub fn is_e164(number: &str) -> bool {
    E164.is_match(number)
}

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("HTTP request to SMS provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("SMS provider rejected message: status {status}, body: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// One outgoing text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// A transport that can deliver text messages.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> Result<(), SmsError>;
}

/// Credentials for the Twilio REST API.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

/// A client for sending messages through Twilio.
pub struct TwilioClient {
    client: reqwest::Client,
    base_url: String,
    credentials: TwilioCredentials,
}

impl TwilioClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.twilio.com";

    /// Creates a new `TwilioClient`.
    ///
    /// # Arguments
    /// * `base_url` - The API root, normally [`TwilioClient::DEFAULT_BASE_URL`].
    /// * `credentials` - Account SID and auth token.
    pub fn new(base_url: impl Into<String>, credentials: TwilioCredentials) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.credentials.account_sid
        )
    }
}

#[async_trait]
impl SmsTransport for TwilioClient {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &SmsMessage) -> Result<(), SmsError> {
        let form = [
            ("From", message.from.as_str()),
            ("To", message.to.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("SMS accepted by Twilio.");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Twilio rejected SMS");
            Err(SmsError::Rejected { status, body })
        }
    }
}

/// An alert channel that texts the event phrase to one recipient.
pub struct SmsAlert {
    event: Arc<EventEnvelope>,
    from: String,
    to: String,
    transport: Arc<dyn SmsTransport>,
    name: String,
}

impl SmsAlert {
    pub fn new(
        event: Arc<EventEnvelope>,
        from: impl Into<String>,
        to: impl Into<String>,
        transport: Arc<dyn SmsTransport>,
    ) -> Self {
        let to = to.into();
        Self {
            event,
            from: from.into(),
            name: format!("sms:{to}"),
            to,
            transport,
        }
    }
}

#[async_trait]
impl Alert for SmsAlert {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), RegistrationError> {
        for (role, number) in [("sender", &self.from), ("destination", &self.to)] {
            if !is_e164(number) {
                return Err(RegistrationError::InvalidChannel {
                    channel: self.name.clone(),
                    reason: format!("{role} '{number}' is not an E.164 phone number"),
                });
            }
        }
        Ok(())
    }

    async fn trigger(&self) -> Result<(), AlertError> {
        let message = SmsMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            body: self.event.phrase().to_string(),
        };
        self.transport
            .send(&message)
            .await
            .map_err(|e| AlertError::external(self.name(), e))
    }
}
