//! Configuration management for autohook
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from an `autohook.toml` file and merge it
//! with environment variables and command-line arguments.

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::alerts::sms::is_e164;
use crate::alerts::TwilioClient;
use crate::cli::Cli;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "autohook.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the webhook HTTP server.
    pub server: ServerConfig,
    /// Configuration for the write-through event log.
    pub event_log: EventLogConfig,
    /// Configuration for the spoken announcement.
    pub voice: VoiceConfig,
    /// Configuration for SMS alerts.
    pub sms: SmsConfig,
    /// Configuration for Hue light alerts.
    pub lights: LightsConfig,
    /// Configuration for alert dispatch.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Configuration for the webhook HTTP server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// The socket address to bind.
    pub listen_addr: String,
    /// The route that receives event webhooks.
    pub webhook_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EventLogConfig {
    pub enabled: bool,
    /// The JSON-lines file events are appended to.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VoiceConfig {
    pub enabled: bool,
    /// The text-to-speech program, run as `<command> <phrase>`.
    pub command: String,
}

/// Configuration for SMS alerts sent through Twilio.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SmsConfig {
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: String,
    /// The Twilio number messages are sent from.
    pub from_number: String,
    /// Verified numbers that receive every alert.
    pub recipients: Vec<String>,
    pub api_base_url: String,
}

/// Configuration for Hue light alerts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LightsConfig {
    pub enabled: bool,
    /// The Hue bridge address, e.g. `http://192.168.1.20`.
    pub bridge_url: String,
    /// The whitelisted bridge API username.
    pub username: String,
    /// Names of the light groups to animate; one alert per group.
    pub groups: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct DispatchConfig {
    /// Per-channel deadline. Unset means channels may block indefinitely.
    pub timeout_seconds: Option<u64>,
}

impl DispatchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Config {
    /// Loads the application configuration.
    ///
    /// Sources are layered in order: built-in defaults, the TOML file,
    /// `AUTOHOOK_`-prefixed environment variables (nested keys separated by
    /// `__`), then command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // e.g. AUTOHOOK_SMS__AUTH_TOKEN=... sets sms.auth_token
            .merge(Env::prefixed("AUTOHOOK_").split("__"))
            .merge(cli.clone())
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations that cannot be wired into alert channels.
    pub fn validate(&self) -> Result<()> {
        if self.sms.enabled {
            if self.sms.account_sid.is_empty() || self.sms.auth_token.is_empty() {
                bail!("SMS alerts are enabled but Twilio credentials are missing");
            }
            if !is_e164(&self.sms.from_number) {
                bail!(
                    "SMS sender '{}' is not an E.164 phone number",
                    self.sms.from_number
                );
            }
            if let Some(bad) = self.sms.recipients.iter().find(|n| !is_e164(n)) {
                bail!("SMS recipient '{}' is not an E.164 phone number", bad);
            }
        }
        if self.lights.enabled && (self.lights.bridge_url.is_empty() || self.lights.username.is_empty()) {
            bail!("Light alerts are enabled but the Hue bridge URL or username is missing");
        }
        Ok(())
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig {
                listen_addr: "0.0.0.0:4567".to_string(),
                webhook_path: "/hooks/automatic".to_string(),
            },
            event_log: EventLogConfig {
                enabled: true,
                path: PathBuf::from("webhook-events.json"),
            },
            voice: VoiceConfig {
                enabled: true,
                command: "say".to_string(),
            },
            sms: SmsConfig {
                enabled: false,
                account_sid: String::new(),
                auth_token: String::new(),
                from_number: String::new(),
                recipients: vec![],
                api_base_url: TwilioClient::DEFAULT_BASE_URL.to_string(),
            },
            lights: LightsConfig {
                enabled: false,
                bridge_url: String::new(),
                username: String::new(),
                groups: vec!["Basement".to_string()],
            },
            dispatch: DispatchConfig::default(),
        }
    }
}
