// ── Value ID parsing ──
//
// A Z-Wave JS value ID string is `{node}-{cc}-{endpoint}-{property}[-{key}]`.
// Segments are positional; the node ID is not part of the parsed value.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Why a string is not a value-ID based identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueIdError {
    #[error("value ID '{0}' has fewer than four '-' separated segments")]
    TooFewParts(String),

    #[error("unique ID '{0}' has no '.' separated value ID segment")]
    MissingValueIdSegment(String),
}

/// The addressable part of a value ID.
///
/// All fields are kept as the raw string segments so comparisons match
/// the stored identifiers exactly (`"0"` and `"00"` are different
/// endpoints).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueId {
    pub command_class: String,
    pub endpoint: String,
    pub property: String,
    pub property_key: Option<String>,
}

impl ValueId {
    /// Parse a value ID string. Segments past the fifth are ignored.
    pub fn parse(value_id: &str) -> Result<Self, ValueIdError> {
        let parts: Vec<&str> = value_id.split('-').collect();
        let [_node, command_class, endpoint, property, rest @ ..] = parts.as_slice() else {
            return Err(ValueIdError::TooFewParts(value_id.to_owned()));
        };
        Ok(Self {
            command_class: (*command_class).to_owned(),
            endpoint: (*endpoint).to_owned(),
            property: (*property).to_owned(),
            property_key: rest.first().map(|key| (*key).to_owned()),
        })
    }

    /// Parse the value ID embedded in a unique ID (`{home_id}.{value_id}`).
    ///
    /// Only the second `.` segment is read, so Notification CC binary
    /// sensor IDs (`{home_id}.{value_id}.{state_key}`) parse the same way.
    pub fn from_unique_id(unique_id: &str) -> Result<Self, ValueIdError> {
        let value_id = unique_id
            .split('.')
            .nth(1)
            .ok_or_else(|| ValueIdError::MissingValueIdSegment(unique_id.to_owned()))?;
        Self::parse(value_id)
    }

    /// Same command class, property and property key on another endpoint.
    pub fn is_same_value_different_endpoint(&self, other: &Self) -> bool {
        self.command_class == other.command_class
            && self.property == other.property
            && self.property_key == other.property_key
            && self.endpoint != other.endpoint
    }

    /// Re-assemble the value ID string for `node_id`.
    pub fn to_value_id_string(&self, node_id: u32) -> String {
        format!("{node_id}-{self}")
    }
}

/// Formats the four addressable segments without the node prefix.
impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.command_class, self.endpoint, self.property)?;
        if let Some(key) = &self.property_key {
            write!(f, "-{key}")?;
        }
        Ok(())
    }
}

impl FromStr for ValueId {
    type Err = ValueIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vid(cc: &str, endpoint: &str, property: &str, key: Option<&str>) -> ValueId {
        ValueId {
            command_class: cc.into(),
            endpoint: endpoint.into(),
            property: property.into(),
            property_key: key.map(str::to_owned),
        }
    }

    #[test]
    fn parse_four_segments() {
        let parsed = ValueId::parse("5-49-0-Air temperature").unwrap();
        assert_eq!(parsed, vid("49", "0", "Air temperature", None));
    }

    #[test]
    fn parse_with_property_key() {
        let parsed = ValueId::parse("52-50-0-value-65537").unwrap();
        assert_eq!(parsed, vid("50", "0", "value", Some("65537")));
    }

    #[test]
    fn parse_rejects_short_strings() {
        assert_eq!(
            ValueId::parse("5-49-0"),
            Err(ValueIdError::TooFewParts("5-49-0".into()))
        );
        assert!("node_status".parse::<ValueId>().is_err());
    }

    #[test]
    fn round_trip_through_string_form() {
        for raw in ["5-49-0-Air temperature", "52-50-1-value-65537", "7-113-00-Alarm Level"] {
            let parsed = ValueId::parse(raw).unwrap();
            let node: u32 = raw.split('-').next().unwrap().parse().unwrap();
            let rebuilt = parsed.to_value_id_string(node);
            assert_eq!(rebuilt, raw);
            assert_eq!(ValueId::parse(&rebuilt).unwrap(), parsed);
        }
    }

    #[test]
    fn from_unique_id_reads_second_segment() {
        let parsed = ValueId::from_unique_id("3245146787.5-49-0-Air temperature").unwrap();
        assert_eq!(parsed, vid("49", "0", "Air temperature", None));
    }

    #[test]
    fn from_unique_id_ignores_state_key_suffix() {
        let parsed = ValueId::from_unique_id("3245146787.5-113-0-Smoke Alarm-Sensor status.2").unwrap();
        assert_eq!(parsed, vid("113", "0", "Smoke Alarm", Some("Sensor status")));
    }

    #[test]
    fn from_unique_id_without_dot_fails() {
        assert!(matches!(
            ValueId::from_unique_id("3245146787"),
            Err(ValueIdError::MissingValueIdSegment(_))
        ));
        assert!(matches!(
            ValueId::from_unique_id("3245146787.5-node_status"),
            Err(ValueIdError::TooFewParts(_))
        ));
    }

    #[test]
    fn endpoint_only_difference_matches() {
        let a = vid("49", "0", "Air temperature", None);
        let b = vid("49", "1", "Air temperature", None);
        assert!(a.is_same_value_different_endpoint(&b));
        assert!(b.is_same_value_different_endpoint(&a));
    }

    #[test]
    fn identical_values_do_not_match() {
        let a = vid("49", "0", "Air temperature", None);
        assert!(!a.is_same_value_different_endpoint(&a.clone()));
    }

    #[test]
    fn other_differences_never_match() {
        let base = vid("49", "0", "Air temperature", None);
        for other in [
            vid("50", "1", "Air temperature", None),
            vid("49", "1", "Humidity", None),
            vid("49", "1", "Air temperature", Some("1")),
        ] {
            assert!(!base.is_same_value_different_endpoint(&other));
        }
    }
}
