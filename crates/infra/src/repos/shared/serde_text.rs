use serde::{de::DeserializeOwned, Serialize};

/// Stores a unit enum as the same text it is serialized to in the api,
/// e.g. `PaymentMethod::BankTransfer` -> `Bank Transfer`
pub fn to_text<T: Serialize>(val: &T) -> anyhow::Result<String> {
    match serde_json::to_value(val)? {
        serde_json::Value::String(text) => Ok(text),
        other => Err(anyhow::anyhow!("Expected a text value, got: {}", other)),
    }
}

pub fn from_text<T: DeserializeOwned>(text: String) -> anyhow::Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(text))?)
}
