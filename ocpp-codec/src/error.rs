//! Parse errors shared by the field codec, value types and envelopes.
//!
//! A `ParseError` renders as a human-readable diagnostic that names the
//! offending JSON property. That text is what ends up in the description of a
//! `FormationViolation` result, so the wording matters more than the variant.

use thiserror::Error;

/// Coarse classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing property, wrong JSON type, constraint violation.
    SchemaViolation,
    /// Token outside an enumeration's vocabulary.
    UnknownEnumValue,
    /// Unexpected fault while building a value from otherwise valid input.
    InternalFault,
}

/// Failure to turn a JSON document into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing JSON property '{key}' ({label})")]
    Missing { key: String, label: &'static str },

    #[error("invalid JSON property '{key}' ({label}): {source}")]
    Field {
        key: String,
        label: &'static str,
        source: Box<ParseError>,
    },

    #[error("unexpected JSON property '{0}'")]
    UnexpectedProperty(String),

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown {label} value '{token}'")]
    UnknownEnumValue { label: &'static str, token: String },

    #[error("{0}")]
    Constraint(String),

    #[error("internal fault: {0}")]
    Internal(String),
}

impl ParseError {
    /// Wrap an inner failure with the property it was found in.
    pub fn in_field(key: &str, label: &'static str, source: ParseError) -> Self {
        ParseError::Field {
            key: key.to_string(),
            label,
            source: Box::new(source),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        ParseError::Constraint(message.into())
    }

    /// Classify the failure, looking through nested field errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Field { source, .. } => source.kind(),
            ParseError::UnknownEnumValue { .. } => ErrorKind::UnknownEnumValue,
            ParseError::Internal(_) => ErrorKind::InternalFault,
            _ => ErrorKind::SchemaViolation,
        }
    }
}

/// Name of a JSON value's type, for diagnostics.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors from the text-level `parse` wrappers.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON syntax error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_kind() {
        let inner = ParseError::UnknownEnumValue {
            label: "id token type",
            token: "Bogus".into(),
        };
        let middle = ParseError::in_field("type", "id token type", inner);
        let outer = ParseError::in_field("idToken", "id token", middle);
        assert_eq!(outer.kind(), ErrorKind::UnknownEnumValue);

        let text = outer.to_string();
        assert!(text.contains("'idToken'"));
        assert!(text.contains("'type'"));
        assert!(text.contains("Bogus"));
    }

    #[test]
    fn test_missing_names_key() {
        let err = ParseError::Missing {
            key: "batteryData".into(),
            label: "battery data",
        };
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.to_string().contains("batteryData"));
    }
}
