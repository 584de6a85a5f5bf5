use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::codec::{CodecHooks, JsonCodec};
use crate::error::{json_type_name, ParseError};

/// A finite number in `0.0..=100.0`.
///
/// Ordering and hashing use the bit pattern, with `-0.0` folded into `0.0`,
/// so the type can sit in sets next to other value types.
#[derive(Debug, Clone, Copy)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Result<Self, ParseError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ParseError::constraint(format!(
                "{} is outside 0..100",
                value
            )));
        }
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Percentage {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Percentage {}

impl Hash for Percentage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Percentage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Percentage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl JsonCodec for Percentage {
    const LABEL: &'static str = "percentage";

    fn from_json(json: &Value, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        let value = json.as_f64().ok_or(ParseError::WrongType {
            expected: "number",
            found: json_type_name(json),
        })?;
        Percentage::new(value)
    }

    fn to_json(&self, _hooks: &CodecHooks) -> Value {
        Value::from(self.0)
    }
}
