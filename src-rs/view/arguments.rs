use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SerializationError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedArguments {
    pub present: bool,
    pub pretty: String,
}

/// Renders an argument payload as indented JSON.
///
/// `None`, `null`, `{}`, `[]` and `""` all mean "no arguments" and yield
/// `present = false` with empty text.
pub fn serialize<T>(value: Option<&T>) -> Result<SerializedArguments, SerializationError>
where
    T: Serialize + ?Sized,
{
    let value = match value {
        Some(value) => serde_json::to_value(value)?,
        None => return Ok(SerializedArguments::default()),
    };
    if is_empty(&value) {
        return Ok(SerializedArguments::default());
    }
    Ok(SerializedArguments {
        present: true,
        pretty: serde_json::to_string_pretty(&value)?,
    })
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
