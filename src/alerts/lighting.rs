//! Event-specific light animations.
//!
//! Every light runs its own sequence in its own task; `trigger()` returns
//! only after all of them have finished.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::core::{Alert, AlertError};
use crate::event::EventEnvelope;
use crate::lights::{AlertEffect, Light, LightError, LightState, Rgb};
use crate::worker_group::WorkerGroup;

/// Transition used for steady colour changes, in bridge ticks.
pub const TRANSITION_TICKS: u16 = 10;

/// Select-effect updates each light issues during a speeding alarm.
pub const SPEEDING_FLASHES: usize = 20;

const CALM_BRIGHTNESS: u8 = 20;
const IMPACT_BRIGHTNESS: u8 = 255;

/// The animation a lighting alert renders for an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPattern {
    /// Every light settles to a dim green.
    SteadyCalm,
    /// The first half of the lights flash red, the rest blue, then all go green.
    Speeding,
    /// Every light jumps to full-brightness blue.
    Impact,
    /// No light is touched.
    Unknown,
}

impl LightPattern {
    pub fn for_event_type(event_type: Option<&str>) -> Self {
        match event_type.unwrap_or_default() {
            "default" | "ignition:on" | "ignition:off" | "parking:changed" | "trip:finished" => {
                Self::SteadyCalm
            }
            "notification:speeding" => Self::Speeding,
            "notification:hard_accel" | "notification:hard_brake" => Self::Impact,
            _ => Self::Unknown,
        }
    }
}

fn calm_state() -> LightState {
    LightState {
        on: true,
        color: Some(Rgb::GREEN),
        brightness: Some(CALM_BRIGHTNESS),
        alert: AlertEffect::None,
        transition_ticks: TRANSITION_TICKS,
    }
}

fn impact_state() -> LightState {
    LightState {
        on: true,
        color: Some(Rgb::BLUE),
        brightness: Some(IMPACT_BRIGHTNESS),
        alert: AlertEffect::None,
        transition_ticks: TRANSITION_TICKS,
    }
}

fn flash_state(color: Rgb) -> LightState {
    LightState {
        on: true,
        color: Some(color),
        brightness: None,
        alert: AlertEffect::Select,
        transition_ticks: 0,
    }
}

fn settle_state() -> LightState {
    LightState {
        on: true,
        color: Some(Rgb::GREEN),
        brightness: None,
        alert: AlertEffect::None,
        transition_ticks: 0,
    }
}

/// The ordered state updates one light receives, or `None` when the light
/// is left alone.
///
/// `index` is the light's position in a set of `total` lights; it only
/// matters for the speeding split, where lights before `total / 2` are red.
pub fn sequence_for(pattern: LightPattern, index: usize, total: usize) -> Option<Vec<LightState>> {
    match pattern {
        LightPattern::SteadyCalm => Some(vec![calm_state()]),
        LightPattern::Impact => Some(vec![impact_state()]),
        LightPattern::Speeding => {
            let color = if index < total / 2 { Rgb::RED } else { Rgb::BLUE };
            let mut steps = vec![flash_state(color); SPEEDING_FLASHES];
            steps.push(settle_state());
            Some(steps)
        }
        LightPattern::Unknown => None,
    }
}

/// Plays the steps on one light, stopping at the first failure.
async fn play(light: Arc<dyn Light>, steps: Vec<LightState>) -> Result<(), LightError> {
    for step in &steps {
        light.set_state(step).await?;
    }
    Ok(())
}

/// An alert channel that animates a set of lights.
pub struct LightingAlert {
    event: Arc<EventEnvelope>,
    lights: Vec<Arc<dyn Light>>,
}

impl LightingAlert {
    pub fn new(event: Arc<EventEnvelope>, lights: Vec<Arc<dyn Light>>) -> Self {
        Self { event, lights }
    }

    pub fn pattern(&self) -> LightPattern {
        LightPattern::for_event_type(self.event.event_type())
    }
}

#[async_trait]
impl Alert for LightingAlert {
    fn name(&self) -> &str {
        "lights"
    }

    #[instrument(skip(self), fields(lights = self.lights.len(), event_type = ?self.event.event_type()))]
    async fn trigger(&self) -> Result<(), AlertError> {
        let pattern = self.pattern();
        if pattern == LightPattern::Unknown {
            debug!("No light pattern for event type; leaving lights unchanged");
            return Ok(());
        }

        let total = self.lights.len();
        let mut workers = WorkerGroup::with_capacity(total);
        for (index, light) in self.lights.iter().enumerate() {
            if let Some(steps) = sequence_for(pattern, index, total) {
                workers.spawn(format!("light:{}", light.id()), play(light.clone(), steps));
            }
        }

        let mut failed = 0;
        for (name, result) in workers.join().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(light = %name, error = %e, "Light animation failed");
                    failed += 1;
                }
                Err(_) => failed += 1,
            }
        }

        if failed > 0 {
            return Err(AlertError::external(
                self.name(),
                anyhow::anyhow!("{failed} of {total} lights failed during {pattern:?} animation"),
            ));
        }
        debug!(?pattern, "Light animation finished");
        Ok(())
    }
}
