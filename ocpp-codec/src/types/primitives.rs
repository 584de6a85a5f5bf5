//! `JsonCodec` for the scalar property types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::codec::{CodecHooks, JsonCodec};
use crate::error::{json_type_name, ParseError};

fn wrong_type(expected: &'static str, found: &Value) -> ParseError {
    ParseError::WrongType {
        expected,
        found: json_type_name(found),
    }
}

impl JsonCodec for i32 {
    const LABEL: &'static str = "integer";

    fn from_json(json: &Value, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        let n = json.as_i64().ok_or_else(|| wrong_type("integer", json))?;
        i32::try_from(n).map_err(|_| ParseError::constraint(format!("{} is out of range", n)))
    }

    fn to_json(&self, _hooks: &CodecHooks) -> Value {
        Value::from(*self)
    }
}

impl JsonCodec for u32 {
    const LABEL: &'static str = "unsigned integer";

    fn from_json(json: &Value, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        let n = json.as_u64().ok_or_else(|| wrong_type("unsigned integer", json))?;
        u32::try_from(n).map_err(|_| ParseError::constraint(format!("{} is out of range", n)))
    }

    fn to_json(&self, _hooks: &CodecHooks) -> Value {
        Value::from(*self)
    }
}

impl JsonCodec for bool {
    const LABEL: &'static str = "boolean";

    fn from_json(json: &Value, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        json.as_bool().ok_or_else(|| wrong_type("boolean", json))
    }

    fn to_json(&self, _hooks: &CodecHooks) -> Value {
        Value::Bool(*self)
    }
}

impl JsonCodec for String {
    const LABEL: &'static str = "string";

    fn from_json(json: &Value, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        json.as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_type("string", json))
    }

    fn to_json(&self, _hooks: &CodecHooks) -> Value {
        Value::String(self.clone())
    }
}

/// RFC 3339 timestamps; sub-second digits are kept as given.
impl JsonCodec for DateTime<Utc> {
    const LABEL: &'static str = "timestamp";

    fn from_json(json: &Value, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        let text = json.as_str().ok_or_else(|| wrong_type("RFC 3339 string", json))?;
        DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| ParseError::constraint(format!("invalid timestamp '{}': {}", text, e)))
    }

    fn to_json(&self, _hooks: &CodecHooks) -> Value {
        Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}
