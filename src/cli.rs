//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the `autohook.toml` file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Receives vehicle event webhooks and fans them out to voice, SMS and lights.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:4567.
    #[arg(short, long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// File that every received event is appended to.
    #[arg(long, value_name = "FILE")]
    pub event_log: Option<PathBuf>,

    /// Disable the spoken announcement.
    #[arg(long)]
    pub no_voice: bool,

    /// Log level filter (e.g. "debug", "autohook=trace").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(listen) = &self.listen {
            dict.insert("server".into(), nested("listen_addr", Value::from(listen.clone())));
        }

        if let Some(path) = &self.event_log {
            dict.insert(
                "event_log".into(),
                nested("path", Value::from(path.display().to_string())),
            );
        }

        // Only an explicit flag overrides the file; absence leaves it alone.
        if self.no_voice {
            dict.insert("voice".into(), nested("enabled", Value::from(false)));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}

fn nested(key: &str, value: Value) -> Value {
    let mut dict = Dict::new();
    dict.insert(key.into(), value);
    Value::Dict(Tag::Default, dict)
}
