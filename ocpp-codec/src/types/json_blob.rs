//! Arbitrary JSON with value semantics.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::codec::{CodecHooks, JsonCodec};
use crate::error::ParseError;

/// Opaque JSON value compared and hashed through its canonical text.
///
/// `serde_json` objects keep their keys sorted, so two blobs holding the same
/// document always render identically.
#[derive(Debug, Clone)]
pub struct JsonBlob(Value);

impl JsonBlob {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn canonical(&self) -> String {
        self.0.to_string()
    }
}

impl From<Value> for JsonBlob {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl PartialEq for JsonBlob {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for JsonBlob {}

impl Hash for JsonBlob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialOrd for JsonBlob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsonBlob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl JsonCodec for JsonBlob {
    const LABEL: &'static str = "JSON value";

    fn from_json(json: &Value, hooks: &CodecHooks) -> Result<Self, ParseError> {
        Ok(Self(hooks.prepare(Self::LABEL, json).into_owned()))
    }

    fn to_json(&self, hooks: &CodecHooks) -> Value {
        hooks.finish(Self::LABEL, self.0.clone())
    }
}
