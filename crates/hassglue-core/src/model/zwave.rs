// ── Z-Wave JS discovery types ──
//
// The subset of a Z-Wave JS node/value the migration looks at. These are
// produced by a discovery pass (or read from a JSON dump in the CLI) and
// never mutated afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value property or property key. Z-Wave JS uses both numeric and
/// named properties (`49-0-Air temperature` vs `112-0-1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Number(i64),
    Name(String),
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Self::Name(s.to_owned())
    }
}

impl From<i64> for Property {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// A node on the Z-Wave network, as seen from one controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZwaveNode {
    pub node_id: u32,
    /// Endpoint index of this node view (0 for the root device).
    #[serde(default)]
    pub index: u32,
    /// Home ID of the controller the node belongs to.
    pub home_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMetadata {
    /// State key to label, in the order the device reports them.
    #[serde(default)]
    pub states: IndexMap<String, String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// A single value on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZwaveValue {
    pub node_id: u32,
    pub command_class: u32,
    #[serde(default)]
    pub endpoint: Option<u32>,
    pub property: Property,
    #[serde(default)]
    pub property_key: Option<Property>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub property_key_name: Option<String>,
    #[serde(default)]
    pub metadata: ValueMetadata,
}

impl ZwaveValue {
    /// Current value ID: `{node}-{cc}-{endpoint}-{property}[-{property_key}]`,
    /// with a missing endpoint written as `0`.
    pub fn value_id(&self) -> String {
        let mut id = format!(
            "{}-{}-{}-{}",
            self.node_id,
            self.command_class,
            self.endpoint.unwrap_or(0),
            self.property
        );
        if let Some(key) = &self.property_key {
            id.push('-');
            id.push_str(&key.to_string());
        }
        id
    }
}

/// One discovered value plus the platform it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    pub node: ZwaveNode,
    pub primary_value: ZwaveValue,
    /// Entity domain the value is exposed through (`sensor`, `binary_sensor`, ...).
    pub platform: String,
    #[serde(default)]
    pub platform_hint: Option<String>,
}

impl DiscoveryInfo {
    /// Notification CC binary sensors expose one entity per state key.
    pub fn is_notification_binary_sensor(&self) -> bool {
        self.platform == "binary_sensor" && self.platform_hint.as_deref() == Some("notification")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn value(endpoint: Option<u32>, property_key: Option<Property>) -> ZwaveValue {
        ZwaveValue {
            node_id: 5,
            command_class: 49,
            endpoint,
            property: "Air temperature".into(),
            property_key,
            property_name: Some("Air temperature".into()),
            property_key_name: None,
            metadata: ValueMetadata::default(),
        }
    }

    #[test]
    fn value_id_defaults_endpoint_to_zero() {
        assert_eq!(value(None, None).value_id(), "5-49-0-Air temperature");
        assert_eq!(value(Some(2), None).value_id(), "5-49-2-Air temperature");
    }

    #[test]
    fn value_id_appends_property_key() {
        let v = value(Some(0), Some(Property::Number(65537)));
        assert_eq!(v.value_id(), "5-49-0-Air temperature-65537");
    }

    #[test]
    fn property_deserializes_untagged() {
        let n: Property = serde_json::from_str("112").unwrap();
        let s: Property = serde_json::from_str(r#""Alarm Level""#).unwrap();
        assert_eq!(n, Property::Number(112));
        assert_eq!(s, Property::Name("Alarm Level".into()));
    }

    #[test]
    fn metadata_states_keep_device_order() {
        let meta: ValueMetadata =
            serde_json::from_str(r#"{"states": {"0": "idle", "2": "Smoke", "1": "Test"}}"#)
                .unwrap();
        let keys: Vec<_> = meta.states.keys().map(String::as_str).collect();
        assert_eq!(keys, ["0", "2", "1"]);
    }
}
