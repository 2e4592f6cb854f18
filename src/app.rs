//! The main application logic, decoupled from the entry point.
//!
//! `App` owns the long-lived collaborators (speech, SMS transport, light
//! bridge, event log) and turns each incoming event into a fresh
//! [`AlertRegistry`] bound to that event.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::{
    alerts::{
        AlertRegistry, LightingAlert, SayCommand, SmsAlert, SmsTransport, Speaker, TwilioClient,
        TwilioCredentials, VoiceAlert,
    },
    config::Config,
    core::{Alert, DispatchSummary},
    event::EventEnvelope,
    event_log::EventLog,
    lights::{hue::HueBridge, LightGroups},
};

/// A handle to the configured alert pipeline.
pub struct App {
    config: Config,
    event_log: Option<EventLog>,
    speaker: Option<Arc<dyn Speaker>>,
    sms_transport: Option<Arc<dyn SmsTransport>>,
    light_groups: Option<Arc<dyn LightGroups>>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the alert channels for one event.
    ///
    /// Light groups that cannot be resolved and channels that fail
    /// validation are logged and left out; the remaining channels still fire.
    #[instrument(skip_all, fields(event_type = ?event.event_type()))]
    pub async fn registry_for(&self, event: &Arc<EventEnvelope>) -> AlertRegistry {
        let mut registry = AlertRegistry::new();
        if let Some(timeout) = self.config.dispatch.timeout() {
            registry = registry.with_timeout(timeout);
        }

        let mut channels: Vec<Arc<dyn Alert>> = Vec::new();

        if let Some(groups) = &self.light_groups {
            for group in &self.config.lights.groups {
                match groups.lights_in(group).await {
                    Ok(lights) => channels.push(Arc::new(LightingAlert::new(event.clone(), lights))),
                    Err(e) => warn!(group = %group, error = %e, "Skipping light group"),
                }
            }
        }

        if let Some(speaker) = &self.speaker {
            channels.push(Arc::new(VoiceAlert::new(event.clone(), speaker.clone())));
        }

        if let Some(transport) = &self.sms_transport {
            for recipient in &self.config.sms.recipients {
                channels.push(Arc::new(SmsAlert::new(
                    event.clone(),
                    self.config.sms.from_number.clone(),
                    recipient.clone(),
                    transport.clone(),
                )));
            }
        }

        for channel in channels {
            if let Err(e) = registry.register(channel) {
                error!(error = %e, "Alert channel rejected");
            }
        }
        registry
    }

    /// Logs the event, then fans it out to every channel and waits for all.
    #[instrument(skip_all, fields(event_type = ?event.event_type(), received_at = %event.received_at()))]
    pub async fn handle_event(&self, event: EventEnvelope) -> DispatchSummary {
        let event = Arc::new(event);
        info!(phrase = event.phrase(), "Event received");

        let registry = self.registry_for(&event).await;

        if let Some(log) = &self.event_log {
            if let Err(e) = log.append(&event).await {
                error!(error = %e, "Failed to write event to log");
            }
        }

        if !registry.has_channels() {
            info!("No alert channels configured for event");
            return DispatchSummary::default();
        }
        registry.trigger_all().await
    }
}

/// Builder for the main application.
///
/// This pattern allows for a clean separation of concerns between constructing
/// the application's components and running the application. It also provides
/// a convenient way to override components for testing purposes.
pub struct AppBuilder {
    config: Config,
    speaker_override: Option<Arc<dyn Speaker>>,
    sms_transport_override: Option<Arc<dyn SmsTransport>>,
    light_groups_override: Option<Arc<dyn LightGroups>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            speaker_override: None,
            sms_transport_override: None,
            light_groups_override: None,
        }
    }

    /// Overrides the speech collaborator for testing.
    pub fn speaker_override(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker_override = Some(speaker);
        self
    }

    /// Overrides the SMS transport for testing.
    pub fn sms_transport_override(mut self, transport: Arc<dyn SmsTransport>) -> Self {
        self.sms_transport_override = Some(transport);
        self
    }

    /// Overrides the light-group lookup for testing.
    pub fn light_groups_override(mut self, groups: Arc<dyn LightGroups>) -> Self {
        self.light_groups_override = Some(groups);
        self
    }

    /// Builds the `App`, constructing any collaborator not overridden.
    ///
    /// Disabled channels get no collaborator, even when overridden.
    pub fn build(self) -> Result<App> {
        let config = self.config;

        let event_log = config
            .event_log
            .enabled
            .then(|| EventLog::new(config.event_log.path.clone()));

        let speaker = if config.voice.enabled {
            Some(self.speaker_override.unwrap_or_else(|| {
                Arc::new(SayCommand::new(config.voice.command.clone())) as Arc<dyn Speaker>
            }))
        } else {
            None
        };

        let sms_transport = match (config.sms.enabled, self.sms_transport_override) {
            (false, _) => None,
            (true, Some(transport)) => Some(transport),
            (true, None) => Some(Arc::new(TwilioClient::new(
                config.sms.api_base_url.clone(),
                TwilioCredentials {
                    account_sid: config.sms.account_sid.clone(),
                    auth_token: config.sms.auth_token.clone(),
                },
            )?) as Arc<dyn SmsTransport>),
        };

        let light_groups = match (config.lights.enabled, self.light_groups_override) {
            (false, _) => None,
            (true, Some(groups)) => Some(groups),
            (true, None) => Some(Arc::new(HueBridge::new(
                config.lights.bridge_url.clone(),
                config.lights.username.clone(),
            )?) as Arc<dyn LightGroups>),
        };

        Ok(App {
            config,
            event_log,
            speaker,
            sms_transport,
            light_groups,
        })
    }
}
