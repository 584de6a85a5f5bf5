//! Vendor extension bag.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::{bounded_str, expect_object, CodecHooks, JsonCodec, JsonObjectExt, JsonWriter};
use crate::error::ParseError;

use super::JsonBlob;

/// `customData`: a `vendorId` plus any vendor-defined properties.
///
/// Properties unknown to this implementation are kept verbatim so that a
/// message can be forwarded without losing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomData {
    pub vendor_id: String,
    pub properties: BTreeMap<String, JsonBlob>,
}

const VENDOR_ID_MAX_LEN: usize = 255;

impl CustomData {
    pub fn new(vendor_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), JsonBlob::new(value));
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).map(JsonBlob::value)
    }
}

impl JsonCodec for CustomData {
    const LABEL: &'static str = "custom data";

    fn from_json(json: &Value, hooks: &CodecHooks) -> Result<Self, ParseError> {
        let json = hooks.prepare(Self::LABEL, json);
        let obj = expect_object(&json)?;

        let vendor_id = obj.parse_mandatory("vendorId", "vendor id", |v| {
            bounded_str(v, VENDOR_ID_MAX_LEN).map(str::to_string)
        })?;

        let properties = obj
            .iter()
            .filter(|(key, _)| key.as_str() != "vendorId")
            .map(|(key, value)| (key.clone(), JsonBlob::new(value.clone())))
            .collect();

        Ok(Self {
            vendor_id,
            properties,
        })
    }

    fn to_json(&self, hooks: &CodecHooks) -> Value {
        let mut out = JsonWriter::new(hooks);
        out.mandatory("vendorId", &self.vendor_id);
        for (key, value) in &self.properties {
            out.raw(key, value.value().clone());
        }
        out.finish(Self::LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_properties_roundtrip() {
        let hooks = CodecHooks::none();
        let doc = json!({"vendorId": "org.example", "mode": {"eco": true}, "level": 3});

        let data = CustomData::from_json(&doc, &hooks).unwrap();
        assert_eq!(data.vendor_id, "org.example");
        assert_eq!(data.property("level"), Some(&json!(3)));
        assert_eq!(data.to_json(&hooks), doc);
    }

    #[test]
    fn test_vendor_id_required() {
        let err = CustomData::from_json(&json!({"mode": 1}), &CodecHooks::none()).unwrap_err();
        assert!(err.to_string().contains("vendorId"));
    }
}
