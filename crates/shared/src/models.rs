//! Push payloads, relay updates and outbound plugin commands.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Verb sent for every relay command; the server infers the new state.
pub const UPDATE_VERB: &str = "update";

/// Opaque relay identifier, used as UI lookup key and as the wire `pin`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayKey(String);

impl RelayKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RelayKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for RelayKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Raw `active` value as pushed by the server.
///
/// The server reports `1` for a relay that is on. Anything else, including
/// `0`, `true` and `null`, reads as off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveFlag(Value);

impl ActiveFlag {
    pub const ON_SENTINEL: i64 = 1;

    pub fn on() -> Self {
        Self(Value::from(Self::ON_SENTINEL))
    }

    pub fn off() -> Self {
        Self(Value::from(0))
    }

    pub fn is_on(&self) -> bool {
        match &self.0 {
            Value::Number(n) => n.as_f64() == Some(Self::ON_SENTINEL as f64),
            _ => false,
        }
    }
}

impl From<bool> for ActiveFlag {
    fn from(on: bool) -> Self {
        if on {
            Self::on()
        } else {
            Self::off()
        }
    }
}

/// One relay's reported state. Every field is optional; `None` means
/// "leave the current display untouched".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayUpdate {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<ActiveFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_text: Option<String>,
    #[serde(
        default,
        deserialize_with = "truthy",
        skip_serializing_if = "Option::is_none"
    )]
    pub confirm_off: Option<bool>,
}

impl RelayUpdate {
    /// Whether turning this relay off must be confirmed first.
    pub fn requires_confirmation(&self) -> bool {
        self.confirm_off.unwrap_or(false)
    }
}

// A present `"active": null` is still a value (it hides the control),
// unlike an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<ActiveFlag>, D::Error>
where
    D: Deserializer<'de>,
{
    ActiveFlag::deserialize(deserializer).map(Some)
}

// `confirmOff` is loosely typed; any truthy JSON value gates the click.
fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    Ok(Some(flag))
}

/// Payload of one push message: relay key to that relay's update.
pub type UpdateBatch = BTreeMap<RelayKey, RelayUpdate>;

/// Push message types (the single key of each pushed frame).
pub mod push_types {
    pub const PLUGIN: &str = "plugin";
    pub const REAUTH_REQUIRED: &str = "reauthRequired";
    /// Outbound only: authenticates the socket after connect.
    pub const AUTH: &str = "auth";
}

/// A pushed frame: `{ "<type>": <payload> }`.
#[derive(Debug, Clone, PartialEq)]
pub struct PushEnvelope {
    pub r#type: String,
    pub payload: Value,
}

impl PushEnvelope {
    /// Parse a text frame. Returns `None` for anything that is not a
    /// non-empty JSON object.
    pub fn parse(text: &str) -> Option<Self> {
        let map: serde_json::Map<String, Value> = serde_json::from_str(text).ok()?;
        map.into_iter().next().map(|(r#type, payload)| Self { r#type, payload })
    }

    /// The plugin message carried by a `plugin` frame.
    pub fn plugin_message(&self) -> Option<PluginMessage> {
        if self.r#type != push_types::PLUGIN {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}

/// Message addressed to one plugin on the shared push bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMessage {
    pub plugin: String,
    #[serde(default)]
    pub data: Value,
}

impl PluginMessage {
    pub fn new(plugin: impl Into<String>, batch: &UpdateBatch) -> Result<Self, serde_json::Error> {
        Ok(Self {
            plugin: plugin.into(),
            data: serde_json::to_value(batch)?,
        })
    }

    /// Decode the payload entry by entry. Only a payload that is not an
    /// object fails as a whole; a bad entry is set aside in
    /// [`DecodedBatch::rejected`] and the others still decode.
    pub fn batch(&self) -> Result<DecodedBatch, serde_json::Error> {
        let entries = serde_json::Map::<String, Value>::deserialize(&self.data)?;
        let mut decoded = DecodedBatch::default();
        for (key, entry) in entries {
            let key = RelayKey::from(key);
            match RelayUpdate::deserialize(entry) {
                Ok(update) => {
                    decoded.updates.insert(key, update);
                }
                Err(e) => decoded.rejected.push((key, e)),
            }
        }
        Ok(decoded)
    }
}

#[derive(Debug, Default)]
pub struct DecodedBatch {
    pub updates: UpdateBatch,
    pub rejected: Vec<(RelayKey, serde_json::Error)>,
}

/// Outbound command. Serializes to the request body `{"command", "pin"}`;
/// `plugin` selects the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginCommand {
    #[serde(skip)]
    pub plugin: String,
    pub command: String,
    pub pin: RelayKey,
}

impl PluginCommand {
    pub fn update(plugin: impl Into<String>, pin: RelayKey) -> Self {
        Self {
            plugin: plugin.into(),
            command: UPDATE_VERB.to_string(),
            pin,
        }
    }
}
