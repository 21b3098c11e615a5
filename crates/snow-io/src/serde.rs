use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use snow_core::errors::{ErrorInfo, SnowError};

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into JSON bytes with object keys sorted at every depth.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SnowError> {
    let value = serde_json::to_value(value)
        .map_err(|err| SnowError::Io(ErrorInfo::new("json-serialize", err.to_string())))?;
    let mut bytes = Vec::new();
    serde_json::to_writer_pretty(&mut bytes, &canonicalize(value))
        .map_err(|err| SnowError::Io(ErrorInfo::new("json-write", err.to_string())))?;
    Ok(bytes)
}

/// Deserializes a JSON payload; malformed input is a shape error.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SnowError> {
    serde_json::from_slice(data)
        .map_err(|err| SnowError::DataShape(ErrorInfo::new("json-deserialize", err.to_string())))
}

/// Deserializes a YAML configuration payload.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SnowError> {
    serde_yaml::from_slice(data)
        .map_err(|err| SnowError::Config(ErrorInfo::new("yaml-deserialize", err.to_string())))
}
