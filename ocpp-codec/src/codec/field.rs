//! Per-field parse/serialize helpers.
//!
//! Parsing goes through [`JsonObjectExt`], implemented for a JSON object map.
//! Each helper looks up one property, checks its JSON type and hands the raw
//! value to a converter. Failures are wrapped so that the final diagnostic
//! always names the property that was wrong.
//!
//! Serialization goes through [`JsonWriter`], which applies the same
//! mandatory/optional/set rules in reverse and runs the serialize hook chain
//! once the object is complete.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

use serde_json::{Map, Value};

use super::hooks::CodecHooks;
use crate::error::{json_type_name, ParseError};

/// A type with a canonical JSON representation.
pub trait JsonCodec: Sized {
    /// Human-readable name used in diagnostics and as the hook key.
    const LABEL: &'static str;

    fn from_json(json: &Value, hooks: &CodecHooks) -> Result<Self, ParseError>;

    fn to_json(&self, hooks: &CodecHooks) -> Value;
}

/// Field lookups on a JSON object.
pub trait JsonObjectExt {
    fn parse_mandatory<T>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnOnce(&Value) -> Result<T, ParseError>,
    ) -> Result<T, ParseError>;

    fn parse_optional<T>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnOnce(&Value) -> Result<T, ParseError>,
    ) -> Result<Option<T>, ParseError>;

    /// Parse a non-empty JSON array into a set.
    fn parse_mandatory_set<T: Ord>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnMut(&Value) -> Result<T, ParseError>,
    ) -> Result<BTreeSet<T>, ParseError>;

    /// Like `parse_mandatory_set`, but an absent key yields an empty set.
    fn parse_optional_set<T: Ord>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnMut(&Value) -> Result<T, ParseError>,
    ) -> Result<BTreeSet<T>, ParseError>;

    /// Fail on the first property not listed in `allowed`.
    fn reject_unknown(&self, allowed: &[&str]) -> Result<(), ParseError>;

    fn mandatory<T: JsonCodec>(&self, key: &str, hooks: &CodecHooks) -> Result<T, ParseError> {
        self.parse_mandatory(key, T::LABEL, |v| T::from_json(v, hooks))
    }

    fn optional<T: JsonCodec>(
        &self,
        key: &str,
        hooks: &CodecHooks,
    ) -> Result<Option<T>, ParseError> {
        self.parse_optional(key, T::LABEL, |v| T::from_json(v, hooks))
    }

    fn mandatory_set<T: JsonCodec + Ord>(
        &self,
        key: &str,
        hooks: &CodecHooks,
    ) -> Result<BTreeSet<T>, ParseError> {
        self.parse_mandatory_set(key, T::LABEL, |v| T::from_json(v, hooks))
    }

    fn optional_set<T: JsonCodec + Ord>(
        &self,
        key: &str,
        hooks: &CodecHooks,
    ) -> Result<BTreeSet<T>, ParseError> {
        self.parse_optional_set(key, T::LABEL, |v| T::from_json(v, hooks))
    }
}

impl JsonObjectExt for Map<String, Value> {
    fn parse_mandatory<T>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnOnce(&Value) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        match self.get(key) {
            None | Some(Value::Null) => Err(ParseError::Missing {
                key: key.to_string(),
                label,
            }),
            Some(value) => converter(value).map_err(|e| ParseError::in_field(key, label, e)),
        }
    }

    fn parse_optional<T>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnOnce(&Value) -> Result<T, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => converter(value)
                .map(Some)
                .map_err(|e| ParseError::in_field(key, label, e)),
        }
    }

    fn parse_mandatory_set<T: Ord>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnMut(&Value) -> Result<T, ParseError>,
    ) -> Result<BTreeSet<T>, ParseError> {
        self.parse_mandatory(key, label, |v| parse_set(v, label, converter))
    }

    fn parse_optional_set<T: Ord>(
        &self,
        key: &str,
        label: &'static str,
        converter: impl FnMut(&Value) -> Result<T, ParseError>,
    ) -> Result<BTreeSet<T>, ParseError> {
        Ok(self
            .parse_optional(key, label, |v| parse_set(v, label, converter))?
            .unwrap_or_default())
    }

    fn reject_unknown(&self, allowed: &[&str]) -> Result<(), ParseError> {
        match self.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(ParseError::UnexpectedProperty(key.clone())),
            None => Ok(()),
        }
    }
}

fn parse_set<T: Ord>(
    value: &Value,
    label: &'static str,
    mut converter: impl FnMut(&Value) -> Result<T, ParseError>,
) -> Result<BTreeSet<T>, ParseError> {
    let items = value.as_array().ok_or(ParseError::WrongType {
        expected: "array",
        found: json_type_name(value),
    })?;

    if items.is_empty() {
        return Err(ParseError::constraint("array must contain at least one item"));
    }

    let mut set = BTreeSet::new();
    for (index, item) in items.iter().enumerate() {
        let parsed =
            converter(item).map_err(|e| ParseError::in_field(&format!("[{}]", index), label, e))?;
        set.insert(parsed);
    }
    Ok(set)
}

/// Borrow `json` as an object, or fail with a type error.
pub fn expect_object(json: &Value) -> Result<&Map<String, Value>, ParseError> {
    json.as_object().ok_or(ParseError::WrongType {
        expected: "object",
        found: json_type_name(json),
    })
}

/// Borrow `json` as a string no longer than `max_len` characters.
pub fn bounded_str(json: &Value, max_len: usize) -> Result<&str, ParseError> {
    let text = json.as_str().ok_or(ParseError::WrongType {
        expected: "string",
        found: json_type_name(json),
    })?;

    if text.chars().count() > max_len {
        return Err(ParseError::constraint(format!(
            "string longer than {} characters",
            max_len
        )));
    }
    Ok(text)
}

/// Run a parse closure, turning a panic inside it into an internal fault.
///
/// Hooks are caller code; a panicking hook must not unwind through the
/// parse API.
pub fn catch_fault<T>(parse: impl FnOnce() -> Result<T, ParseError>) -> Result<T, ParseError> {
    match panic::catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic while parsing".to_string());
            Err(ParseError::Internal(message))
        }
    }
}

/// Builder for a JSON object following the field emission rules.
pub struct JsonWriter<'h> {
    map: Map<String, Value>,
    hooks: &'h CodecHooks,
}

impl<'h> JsonWriter<'h> {
    pub fn new(hooks: &'h CodecHooks) -> Self {
        Self {
            map: Map::new(),
            hooks,
        }
    }

    pub fn hooks(&self) -> &'h CodecHooks {
        self.hooks
    }

    pub fn mandatory<T: JsonCodec>(&mut self, key: &str, value: &T) -> &mut Self {
        self.map.insert(key.to_string(), value.to_json(self.hooks));
        self
    }

    pub fn optional<T: JsonCodec>(&mut self, key: &str, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.mandatory(key, value);
        }
        self
    }

    /// Emit a set as an array; empty sets are omitted.
    pub fn set<'a, T: JsonCodec + 'a>(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = &'a T>,
    ) -> &mut Self {
        let items: Vec<Value> = values.into_iter().map(|v| v.to_json(self.hooks)).collect();
        if !items.is_empty() {
            self.map.insert(key.to_string(), Value::Array(items));
        }
        self
    }

    /// Insert an already serialized value.
    pub fn raw(&mut self, key: &str, value: Value) -> &mut Self {
        self.map.insert(key.to_string(), value);
        self
    }

    /// Finish the object and run the serialize hooks for `label`.
    pub fn finish(self, label: &str) -> Value {
        self.hooks.finish(label, Value::Object(self.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_mandatory_missing() {
        let obj = object(json!({"other": 1}));
        let err = obj.mandatory::<i32>("evseId", &CodecHooks::none()).unwrap_err();
        assert!(err.to_string().contains("evseId"));
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn test_mandatory_wrong_type() {
        let obj = object(json!({"evseId": "one"}));
        let err = obj.mandatory::<i32>("evseId", &CodecHooks::none()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("evseId"));
        assert!(text.contains("string"));
    }

    #[test]
    fn test_optional_absent_and_null() {
        let obj = object(json!({"a": null}));
        let hooks = CodecHooks::none();
        assert_eq!(obj.optional::<i32>("a", &hooks).unwrap(), None);
        assert_eq!(obj.optional::<i32>("b", &hooks).unwrap(), None);
    }

    #[test]
    fn test_optional_present_invalid() {
        let obj = object(json!({"a": true}));
        assert!(obj.optional::<i32>("a", &CodecHooks::none()).is_err());
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let obj = object(json!({"ids": [3, 1, 3, 2]}));
        let set = obj.mandatory_set::<i32>("ids", &CodecHooks::none()).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_set_rejects_empty() {
        let obj = object(json!({"ids": []}));
        let err = obj.mandatory_set::<i32>("ids", &CodecHooks::none()).unwrap_err();
        assert!(err.to_string().contains("'ids'"));
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn test_custom_converter_reason() {
        let obj = object(json!({"level": 7}));
        let err = obj
            .parse_mandatory("level", "level", |v| match v.as_i64() {
                Some(n) if n < 5 => Ok(n),
                _ => Err(ParseError::constraint("level must be below 5")),
            })
            .unwrap_err();
        assert!(err.to_string().contains("level must be below 5"));
    }

    #[test]
    fn test_reject_unknown() {
        let obj = object(json!({"a": 1, "zzz": 2}));
        let err = obj.reject_unknown(&["a"]).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedProperty("zzz".into()));
    }

    #[test]
    fn test_bounded_str() {
        assert_eq!(bounded_str(&json!("abc"), 3).unwrap(), "abc");
        assert!(bounded_str(&json!("abcd"), 3).is_err());
        assert!(bounded_str(&json!(4), 3).is_err());
    }

    #[test]
    fn test_catch_fault() {
        let result: Result<(), ParseError> = catch_fault(|| panic!("hook exploded"));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalFault);
        assert!(err.to_string().contains("hook exploded"));
    }

    #[test]
    fn test_writer_rules() {
        let hooks = CodecHooks::none();
        let mut out = JsonWriter::new(&hooks);
        out.mandatory("a", &1i32)
            .optional::<i32>("b", None)
            .optional("c", Some(&2i32))
            .set::<i32>("d", &BTreeSet::new());
        assert_eq!(out.finish("test"), json!({"a": 1, "c": 2}));
    }
}
