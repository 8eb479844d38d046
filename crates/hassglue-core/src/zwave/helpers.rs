// ── Identifier helpers ──

use crate::model::{DeviceIdentifier, ZwaveNode, ZwaveValue};

/// Integration domain for Z-Wave JS entities and devices.
pub const DOMAIN: &str = "zwave_js";

/// Entity unique ID for a value: `{home_id}.{value_id}`.
pub fn unique_id(home_id: u32, value_id: &str) -> String {
    format!("{home_id}.{value_id}")
}

/// Device identifier for a node: `("zwave_js", "{home_id}-{node_id}")`.
pub fn device_identifier(home_id: u32, node_id: u32) -> DeviceIdentifier {
    DeviceIdentifier::new(DOMAIN, format!("{home_id}-{node_id}"))
}

pub fn node_device_identifier(node: &ZwaveNode) -> DeviceIdentifier {
    device_identifier(node.home_id, node.node_id)
}

/// Value ID candidates used by earlier releases, oldest first.
///
/// 1. Pre 2021.3.0: `{node}.{node}-{cc}-{endpoint}-{property}-{property_key_name}`.
///    Endpoint 0 is written as `00`, same as a missing endpoint.
/// 2. 2021.3.0b0: `{node}.{node}-{cc}-{endpoint}-{property}-{property_key}-{property_key_name}`.
///    Only a missing endpoint becomes `00`.
/// 3. 2021.3.0: format 2 without the leading `{node}.`.
///
/// A missing or empty property key name is `00` everywhere.
pub fn old_value_ids(value: &ZwaveValue) -> Vec<String> {
    let node_id = value.node_id;
    let command_class = value.command_class;
    let property = &value.property;
    let property_key_name = value
        .property_key_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or("00");

    let pre_2021_3_endpoint = match value.endpoint {
        None | Some(0) => "00".to_owned(),
        Some(endpoint) => endpoint.to_string(),
    };
    let pre_2021_3 = format!(
        "{node_id}.{node_id}-{command_class}-{pre_2021_3_endpoint}-{property}-{property_key_name}"
    );

    let endpoint = value
        .endpoint
        .map_or_else(|| "00".to_owned(), |endpoint| endpoint.to_string());
    let property_key = value
        .property_key
        .as_ref()
        .map_or_else(|| "00".to_owned(), ToString::to_string);
    let value_id = format!(
        "{node_id}-{command_class}-{endpoint}-{property}-{property_key}-{property_key_name}"
    );

    vec![pre_2021_3, format!("{node_id}.{value_id}"), value_id]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Property, ValueMetadata};

    fn value(
        endpoint: Option<u32>,
        property_key: Option<Property>,
        property_key_name: Option<&str>,
    ) -> ZwaveValue {
        ZwaveValue {
            node_id: 5,
            command_class: 49,
            endpoint,
            property: "Air temperature".into(),
            property_key,
            property_name: Some("Air temperature".into()),
            property_key_name: property_key_name.map(str::to_owned),
            metadata: ValueMetadata::default(),
        }
    }

    #[test]
    fn unique_id_joins_home_id_and_value_id() {
        assert_eq!(
            unique_id(3_245_146_787, "5-49-0-Air temperature"),
            "3245146787.5-49-0-Air temperature"
        );
    }

    #[test]
    fn device_identifier_joins_home_and_node() {
        assert_eq!(
            device_identifier(3_245_146_787, 5),
            DeviceIdentifier::new("zwave_js", "3245146787-5")
        );
    }

    #[test]
    fn old_value_ids_all_defaults() {
        assert_eq!(
            old_value_ids(&value(None, None, None)),
            [
                "5.5-49-00-Air temperature-00",
                "5.5-49-00-Air temperature-00-00",
                "5-49-00-Air temperature-00-00",
            ]
        );
    }

    #[test]
    fn old_value_ids_endpoint_zero_differs_between_formats() {
        assert_eq!(
            old_value_ids(&value(Some(0), None, None)),
            [
                "5.5-49-00-Air temperature-00",
                "5.5-49-0-Air temperature-00-00",
                "5-49-0-Air temperature-00-00",
            ]
        );
    }

    #[test]
    fn old_value_ids_with_key_and_key_name() {
        assert_eq!(
            old_value_ids(&value(Some(2), Some(Property::Number(65537)), Some("Electric_kWh_Consumed"))),
            [
                "5.5-49-2-Air temperature-Electric_kWh_Consumed",
                "5.5-49-2-Air temperature-65537-Electric_kWh_Consumed",
                "5-49-2-Air temperature-65537-Electric_kWh_Consumed",
            ]
        );
    }

    #[test]
    fn empty_key_name_counts_as_missing() {
        let ids = old_value_ids(&value(None, Some(Property::Number(0)), Some("")));
        assert_eq!(ids[0], "5.5-49-00-Air temperature-00");
        assert_eq!(ids[2], "5-49-00-Air temperature-0-00");
    }
}
