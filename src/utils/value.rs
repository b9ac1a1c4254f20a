use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert a JSON scalar into a sanitized string. The CRM sends ids as numbers
/// while the rest of the app treats them as opaque strings.
pub fn value_to_string(value: Value) -> String {
    let raw = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    raw.chars().filter(|c| !c.is_control()).collect()
}

/// `#[serde(deserialize_with)]` helper accepting either a string or a number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_string)
}
