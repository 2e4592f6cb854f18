//! A client for the Philips Hue bridge REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{AlertEffect, Light, LightError, LightGroups, LightState};

#[derive(Debug)]
struct BridgeInner {
    client: reqwest::Client,
    base_url: String,
    username: String,
}

impl BridgeInner {
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.username,
            path
        )
    }
}

/// A connection to one Hue bridge.
#[derive(Debug, Clone)]
pub struct HueBridge {
    inner: Arc<BridgeInner>,
}

impl HueBridge {
    /// Creates a new `HueBridge`.
    ///
    /// # Arguments
    /// * `base_url` - The bridge address, e.g. `http://192.168.1.20`.
    /// * `username` - The whitelisted API username.
    pub fn new(base_url: impl Into<String>, username: impl Into<String>) -> Result<Self, LightError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            inner: Arc::new(BridgeInner {
                client,
                base_url: base_url.into(),
                username: username.into(),
            }),
        })
    }

    /// Returns a handle to a single light by its bridge id.
    pub fn light(&self, id: impl Into<String>) -> HueLight {
        HueLight {
            bridge: self.inner.clone(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HueGroup {
    name: String,
    #[serde(default)]
    lights: Vec<String>,
}

#[async_trait]
impl LightGroups for HueBridge {
    /// Looks up the group by name and returns its lights in bridge order.
    #[instrument(skip(self))]
    async fn lights_in(&self, group: &str) -> Result<Vec<Arc<dyn Light>>, LightError> {
        let groups: BTreeMap<String, HueGroup> = self
            .inner
            .client
            .get(self.inner.api_url("groups"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let found = groups
            .into_values()
            .find(|g| g.name == group)
            .ok_or_else(|| LightError::GroupNotFound(group.to_string()))?;

        debug!(count = found.lights.len(), "Resolved light group");
        Ok(found
            .lights
            .into_iter()
            .map(|id| Arc::new(self.light(id)) as Arc<dyn Light>)
            .collect())
    }
}

/// One bulb behind a Hue bridge.
#[derive(Debug, Clone)]
pub struct HueLight {
    bridge: Arc<BridgeInner>,
    id: String,
}

/// The body of `PUT /lights/{id}/state`.
#[derive(Debug, Serialize, PartialEq)]
struct StateBody {
    on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xy: Option<[f64; 2]>,
    alert: &'static str,
    transitiontime: u16,
}

impl From<&LightState> for StateBody {
    fn from(state: &LightState) -> Self {
        Self {
            on: state.on,
            bri: state.brightness,
            xy: state.color.map(|c| c.to_xy()),
            alert: match state.alert {
                AlertEffect::None => "none",
                AlertEffect::Select => "lselect",
            },
            transitiontime: state.transition_ticks,
        }
    }
}

#[async_trait]
impl Light for HueLight {
    fn id(&self) -> &str {
        &self.id
    }

    async fn set_state(&self, state: &LightState) -> Result<(), LightError> {
        let url = self.bridge.api_url(&format!("lights/{}/state", self.id));
        let replies: Vec<Value> = self
            .bridge
            .client
            .put(url)
            .json(&StateBody::from(state))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // The bridge answers 200 with per-attribute error objects.
        let errors: Vec<String> = replies
            .iter()
            .filter_map(|reply| reply.get("error"))
            .map(|error| {
                error
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown bridge error")
                    .to_string()
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            warn!(light = %self.id, ?errors, "Hue bridge rejected state update");
            Err(LightError::Bridge {
                light: self.id.clone(),
                description: errors.join("; "),
            })
        }
    }
}
