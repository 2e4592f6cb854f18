//! Controllable light fixtures.
//!
//! The lighting alert only talks to the [`Light`] trait; the Hue bridge
//! client in [`hue`] is the production implementation.

pub mod hue;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LightError {
    #[error("HTTP request to light bridge failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bridge rejected update for light {light}: {description}")]
    Bridge { light: String, description: String },
    #[error("light group '{0}' not found on bridge")]
    GroupNotFound(String),
}

/// A 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb::new(0x32, 0xB1, 0x41);
    pub const RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);
    pub const BLUE: Rgb = Rgb::new(0x2E, 0x37, 0xFE);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts to CIE 1931 xy chromaticity using the wide-gamut D65 matrix.
    pub fn to_xy(self) -> [f64; 2] {
        fn linear(channel: u8) -> f64 {
            let v = f64::from(channel) / 255.0;
            if v > 0.04045 {
                ((v + 0.055) / 1.055).powf(2.4)
            } else {
                v / 12.92
            }
        }

        let (r, g, b) = (linear(self.r), linear(self.g), linear(self.b));
        let x = r * 0.664_511 + g * 0.154_324 + b * 0.162_028;
        let y = r * 0.283_881 + g * 0.668_433 + b * 0.047_685;
        let z = r * 0.000_088 + g * 0.072_310 + b * 0.986_039;

        let sum = x + y + z;
        if sum == 0.0 {
            return [0.0, 0.0];
        }
        let round = |v: f64| (v * 10_000.0).round() / 10_000.0;
        [round(x / sum), round(y / sum)]
    }
}

/// The alert effect a fixture should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertEffect {
    #[default]
    None,
    /// Flash repeatedly to draw attention.
    Select,
}

/// One requested state change for a fixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub on: bool,
    pub color: Option<Rgb>,
    pub brightness: Option<u8>,
    pub alert: AlertEffect,
    /// Transition duration in bridge ticks of 100ms.
    pub transition_ticks: u16,
}

/// A single controllable light fixture.
#[async_trait]
pub trait Light: Send + Sync {
    /// The fixture's identifier, used for logging.
    fn id(&self) -> &str;

    async fn set_state(&self, state: &LightState) -> Result<(), LightError>;
}

/// Resolves a named group of fixtures to its lights.
#[async_trait]
pub trait LightGroups: Send + Sync {
    async fn lights_in(&self, group: &str) -> Result<Vec<Arc<dyn Light>>, LightError>;
}
