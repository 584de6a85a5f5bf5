//! Protocol outcome of an exchange
//!
//! Every failure that reaches a peer is expressed as an [`OcppResult`]: a
//! closed [`ResultCode`], a human-readable description and an optional JSON
//! detail blob. Local failures are mapped here:
//!
//! | Condition | Code |
//! |-----------|------|
//! | malformed JSON, schema violation, unknown enum token | `FormationViolation` |
//! | signature present but rejected | `SignatureError` |
//! | fault inside local code | `Server` |
//! | channel failure before a payload existed | caller-supplied |

use serde_json::{json, Value};

use crate::codec::{expect_object, CodecHooks, JsonCodec, JsonObjectExt, JsonWriter};
use crate::error::{ErrorKind, ParseError};
use crate::ocpp_enum;
use crate::types::JsonBlob;

ocpp_enum! {
    /// Machine-readable outcome code.
    pub enum ResultCode: "result code" {
        Ok => "OK",
        FormationViolation => "FormationViolation",
        SignatureError => "SignatureError",
        Server => "Server",
        Timeout => "Timeout",
        NetworkError => "NetworkError",
        ProtocolError => "ProtocolError",
        NotImplemented => "NotImplemented",
        GenericError => "GenericError",
    }
}

/// Outcome attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OcppResult {
    pub code: ResultCode,
    pub description: Option<String>,
    pub details: Option<JsonBlob>,
}

impl OcppResult {
    pub fn ok() -> Self {
        Self {
            code: ResultCode::Ok,
            description: None,
            details: None,
        }
    }

    pub fn error(code: ResultCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: Some(description.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(JsonBlob::new(details));
        self
    }

    pub fn formation_violation(diagnostic: impl Into<String>) -> Self {
        Self::error(ResultCode::FormationViolation, diagnostic)
    }

    pub fn signature_error(description: impl Into<String>) -> Self {
        Self::error(ResultCode::SignatureError, description)
    }

    /// Only the error message crosses the wire; no source chain or backtrace.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self::error(ResultCode::Server, error.to_string())
    }

    /// Map a parse failure. Internal faults are the receiver's problem and
    /// become `Server`; everything else is the sender's and becomes
    /// `FormationViolation`.
    pub fn from_parse_error(error: &ParseError) -> Self {
        let kind = error.kind();
        let code = match kind {
            ErrorKind::InternalFault => ResultCode::Server,
            ErrorKind::SchemaViolation | ErrorKind::UnknownEnumValue => {
                ResultCode::FormationViolation
            }
        };
        Self::error(code, error.to_string()).with_details(json!({ "kind": format!("{:?}", kind) }))
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

impl Default for OcppResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<&ParseError> for OcppResult {
    fn from(error: &ParseError) -> Self {
        Self::from_parse_error(error)
    }
}

impl std::fmt::Display for OcppResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.code, description),
            None => write!(f, "{}", self.code),
        }
    }
}

impl JsonCodec for OcppResult {
    const LABEL: &'static str = "result";

    fn from_json(json: &Value, hooks: &CodecHooks) -> Result<Self, ParseError> {
        let json = hooks.prepare(Self::LABEL, json);
        let obj = expect_object(&json)?;
        obj.reject_unknown(&["code", "description", "details"])?;

        Ok(Self {
            code: obj.mandatory("code", hooks)?,
            description: obj.optional("description", hooks)?,
            details: obj.optional("details", hooks)?,
        })
    }

    fn to_json(&self, hooks: &CodecHooks) -> Value {
        let mut out = JsonWriter::new(hooks);
        out.mandatory("code", &self.code)
            .optional("description", self.description.as_ref())
            .optional("details", self.details.as_ref());
        out.finish(Self::LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_mapping() {
        let missing = ParseError::Missing {
            key: "batteryData".into(),
            label: "battery data",
        };
        let result = OcppResult::from_parse_error(&missing);
        assert_eq!(result.code, ResultCode::FormationViolation);
        assert!(result.description().contains("batteryData"));

        let fault = ParseError::Internal("hook exploded".into());
        assert_eq!(OcppResult::from(&fault).code, ResultCode::Server);
    }

    #[test]
    fn test_from_error_keeps_message_only() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let result = OcppResult::from_error(&io);
        assert_eq!(result.code, ResultCode::Server);
        assert_eq!(result.description(), "disk on fire");
    }

    #[test]
    fn test_result_json() {
        let hooks = CodecHooks::none();
        let result = OcppResult::signature_error("bad sig");
        let doc = result.to_json(&hooks);
        assert_eq!(doc, json!({"code": "SignatureError", "description": "bad sig"}));
        assert_eq!(OcppResult::from_json(&doc, &hooks).unwrap(), result);
        assert_eq!(OcppResult::ok().to_string(), "OK");
    }
}
