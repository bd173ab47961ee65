//! Wire helpers shared by the OpenGIN models.
//!
//! The query service returns entity names wrapped in a protobuf `Any`
//! (`google.protobuf.StringValue`) whose bytes are hex encoded, e.g.
//! `{"typeUrl": "type.googleapis.com/google.protobuf.StringValue", "value": "0a0548656c6c6f"}`.
//! Sometimes that wrapper is itself serialized into a JSON string. Timestamps
//! are RFC 3339 strings, and the server sends `""` for open-ended bounds.

use crate::utils::error::{OpenGinError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field number 1, wire type 2 (length-delimited).
const STRING_VALUE_TAG: u8 = 0x0a;

/// Returns the plain entity name for any of the encodings the server uses.
pub fn decode_name(raw: &Value) -> Result<String> {
    match raw {
        Value::Null => Ok(String::new()),
        Value::String(s) => {
            let trimmed = s.trim_start();
            if trimmed.starts_with('{') {
                if let Ok(inner @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
                    return decode_name(&inner);
                }
            }
            Ok(s.clone())
        }
        Value::Object(map) => match map.get("value") {
            Some(Value::String(payload)) => decode_string_value(payload),
            Some(other) => decode_name(other),
            None => Err(OpenGinError::decode(format!(
                "name object has no value field: {}",
                raw
            ))),
        },
        other => Ok(other.to_string()),
    }
}

/// Decodes the hex payload of a `google.protobuf.StringValue`.
///
/// Payloads that are not a hex encoded `StringValue` holding UTF-8 text are
/// taken to be the name itself.
pub fn decode_string_value(payload: &str) -> Result<String> {
    let bytes = match hex::decode(payload) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(payload.to_string()),
    };

    if bytes.is_empty() {
        return Ok(String::new());
    }
    if bytes[0] != STRING_VALUE_TAG {
        return Ok(payload.to_string());
    }

    let (len, consumed) = read_varint(&bytes[1..])?;
    let start = 1 + consumed;
    let end = start
        .checked_add(len as usize)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| OpenGinError::decode("StringValue length exceeds payload"))?;

    match std::str::from_utf8(&bytes[start..end]) {
        Ok(name) => Ok(name.to_string()),
        Err(e) => {
            tracing::warn!("StringValue name is not UTF-8 ({}), keeping {}", e, payload);
            Ok(payload.to_string())
        }
    }
}

fn read_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(OpenGinError::decode("truncated varint in StringValue"))
}

pub(crate) fn deserialize_name<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    decode_name(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_name() {
        assert_eq!(
            decode_name(&json!("Ministry of Health")).unwrap(),
            "Ministry of Health"
        );
    }

    #[test]
    fn test_any_wrapped_name() {
        let encoded = hex::encode(b"\x0a\x05Hello");
        let raw = json!({
            "typeUrl": "type.googleapis.com/google.protobuf.StringValue",
            "value": encoded
        });
        assert_eq!(decode_name(&raw).unwrap(), "Hello");
    }

    #[test]
    fn test_any_wrapper_serialized_as_string() {
        let raw = json!(format!(
            r#"{{"typeUrl":"type.googleapis.com/google.protobuf.StringValue","value":"{}"}}"#,
            hex::encode(b"\x0a\x03Tax")
        ));
        assert_eq!(decode_name(&raw).unwrap(), "Tax");
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let raw = json!({ "value": hex::encode(b"\x0a\x09abc") });
        assert!(decode_name(&raw).is_err());
    }

    #[test]
    fn test_untagged_hex_is_the_name() {
        assert_eq!(decode_name(&json!({ "value": "cafe" })).unwrap(), "cafe");
        assert_eq!(decode_string_value("1234").unwrap(), "1234");
    }

    #[test]
    fn test_non_utf8_string_value_is_kept_raw() {
        let encoded = hex::encode(b"\x0a\x02\xff\xfe");
        assert_eq!(decode_name(&json!({ "value": encoded })).unwrap(), "0a02fffe");
    }

    #[test]
    fn test_entity_with_odd_name_still_deserializes() {
        let entity: crate::domain::model::Entity = serde_json::from_value(json!({
            "id": "min_x",
            "kind": { "major": "Organisation", "minor": "minister" },
            "name": { "value": "cafe" }
        }))
        .unwrap();
        assert_eq!(entity.name, "cafe");
    }

    #[test]
    fn test_null_name_is_empty() {
        assert_eq!(decode_name(&Value::Null).unwrap(), "");
    }
}
