//! Alert channels and their registry.
//!
//! Every channel implements [`crate::core::Alert`] and is bound to a shared
//! [`crate::event::EventEnvelope`]. The [`registry::AlertRegistry`] fans one
//! event out to all of them in parallel.
pub mod lighting;
pub mod registry;
pub mod sms;
pub mod voice;

pub use lighting::{LightPattern, LightingAlert};
pub use registry::AlertRegistry;
pub use sms::{SmsAlert, SmsMessage, SmsTransport, TwilioClient, TwilioCredentials};
pub use voice::{SayCommand, Speaker, VoiceAlert};
