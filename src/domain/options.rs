use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the merchant API key.
pub const KEY_FIELD: &str = "key";

/// Message carried by the failure synthesized for options without a key.
pub const MISSING_KEY_MESSAGE: &str = "Key is required. Please check if key is present in options.";

/// Caller-supplied checkout options.
///
/// Everything except the API key is opaque to the bridge and is forwarded to
/// the host exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutOptions(Map<String, Value>);

/// Options rejected before reaching the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingKey;

impl CheckoutOptions {
    /// Builder-style insertion, only available while the caller owns the bag.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn key(&self) -> Option<&Value> {
        self.0.get(KEY_FIELD).filter(|v| !v.is_null())
    }

    /// Rejects a bag whose key is absent or `null`. Nothing else is checked
    /// locally.
    pub fn validate(&self) -> Result<(), MissingKey> {
        match self.key() {
            Some(_) => Ok(()),
            None => Err(MissingKey),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for CheckoutOptions {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for CheckoutOptions {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
