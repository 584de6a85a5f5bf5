//! OCPP-J message framing
//!
//! OCPP-J carries messages as JSON arrays over WebSocket:
//! - CALL: [2, messageId, action, payload]
//! - CALLRESULT: [3, messageId, payload]
//! - CALLERROR: [4, messageId, errorCode, errorDescription, errorDetails]
//!
//! The message id is the envelope's [`RequestId`]. Typed requests and
//! responses become frames through [`Frame::call`] and
//! [`Frame::from_response`]; a failed response is sent as CALLERROR.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::codec::CodecHooks;
use crate::envelope::{Action, Request, Response};
use crate::ocpp_enum;
use crate::result::ResultCode;
use crate::types::RequestId;

/// OCPP message type identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Call = 2,
    CallResult = 3,
    CallError = 4,
}

ocpp_enum! {
    /// OCPP-J error codes
    pub enum RpcErrorCode: "RPC error code" {
        FormatViolation => "FormatViolation",
        GenericError => "GenericError",
        InternalError => "InternalError",
        MessageTypeNotSupported => "MessageTypeNotSupported",
        NotImplemented => "NotImplemented",
        NotSupported => "NotSupported",
        OccurrenceConstraintViolation => "OccurrenceConstraintViolation",
        PropertyConstraintViolation => "PropertyConstraintViolation",
        ProtocolError => "ProtocolError",
        RpcFrameworkError => "RpcFrameworkError",
        SecurityError => "SecurityError",
        TypeConstraintViolation => "TypeConstraintViolation",
    }
}

impl From<RpcErrorCode> for ResultCode {
    fn from(code: RpcErrorCode) -> Self {
        match code {
            RpcErrorCode::FormatViolation
            | RpcErrorCode::OccurrenceConstraintViolation
            | RpcErrorCode::PropertyConstraintViolation
            | RpcErrorCode::TypeConstraintViolation => ResultCode::FormationViolation,
            RpcErrorCode::SecurityError => ResultCode::SignatureError,
            RpcErrorCode::InternalError => ResultCode::Server,
            RpcErrorCode::NotImplemented
            | RpcErrorCode::NotSupported
            | RpcErrorCode::MessageTypeNotSupported => ResultCode::NotImplemented,
            RpcErrorCode::ProtocolError | RpcErrorCode::RpcFrameworkError => {
                ResultCode::ProtocolError
            }
            RpcErrorCode::GenericError => ResultCode::GenericError,
        }
    }
}

/// `Timeout` and `NetworkError` describe the local channel and have no
/// OCPP-J counterpart; they go out as `GenericError`.
impl From<ResultCode> for RpcErrorCode {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::FormationViolation => RpcErrorCode::FormatViolation,
            ResultCode::SignatureError => RpcErrorCode::SecurityError,
            ResultCode::Server => RpcErrorCode::InternalError,
            ResultCode::ProtocolError => RpcErrorCode::ProtocolError,
            ResultCode::NotImplemented => RpcErrorCode::NotImplemented,
            ResultCode::Ok
            | ResultCode::Timeout
            | ResultCode::NetworkError
            | ResultCode::GenericError => RpcErrorCode::GenericError,
        }
    }
}

/// Errors in OCPP-J framing
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid message format: {0}")]
    InvalidFormat(&'static str),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(i64),
}

impl RpcError {
    /// OCPP-J error code to answer a broken frame with.
    pub fn error_code(&self) -> RpcErrorCode {
        match self {
            RpcError::Json(_) | RpcError::InvalidFormat(_) => RpcErrorCode::FormatViolation,
            RpcError::UnknownMessageType(_) => RpcErrorCode::MessageTypeNotSupported,
        }
    }
}

/// OCPP CALL message (request)
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub message_id: RequestId,
    pub action: String,
    pub payload: Value,
}

/// OCPP CALLRESULT message (success response)
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub message_id: RequestId,
    pub payload: Value,
}

/// OCPP CALLERROR message (error response)
#[derive(Debug, Clone, PartialEq)]
pub struct CallError {
    pub message_id: RequestId,
    pub error_code: RpcErrorCode,
    pub error_description: String,
    pub error_details: Value,
}

impl CallError {
    pub fn new(
        message_id: RequestId,
        error_code: RpcErrorCode,
        error_description: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            error_code,
            error_description: error_description.into(),
            error_details: Value::Object(Map::new()),
        }
    }
}

/// Parsed OCPP-J frame (any type)
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Call(Call),
    CallResult(CallResult),
    CallError(CallError),
}

impl Frame {
    /// CALL frame for a typed request.
    pub fn call<A: Action>(request: &Request<A>, hooks: &CodecHooks) -> Self {
        Frame::Call(Call {
            message_id: request.request_id().clone(),
            action: A::NAME.to_string(),
            payload: request.to_json(hooks),
        })
    }

    /// CALLRESULT for a successful response, CALLERROR otherwise.
    pub fn from_response<A: Action>(response: &Response<A>, hooks: &CodecHooks) -> Self {
        let message_id = response.request().request_id().clone();
        match response.to_json(hooks) {
            Some(payload) => Frame::CallResult(CallResult { message_id, payload }),
            None => {
                let result = response.result();
                Frame::CallError(CallError {
                    message_id,
                    error_code: result.code.into(),
                    error_description: result.description().to_string(),
                    error_details: result
                        .details
                        .as_ref()
                        .map(|d| d.value().clone())
                        .unwrap_or_else(|| Value::Object(Map::new())),
                })
            }
        }
    }

    /// Parse an OCPP-J frame from JSON bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, RpcError> {
        let array: Vec<Value> = serde_json::from_slice(bytes)?;

        let msg_type = array
            .first()
            .and_then(Value::as_i64)
            .ok_or(RpcError::InvalidFormat("missing message type"))?;

        let message_id = || -> Result<RequestId, RpcError> {
            let id = array
                .get(1)
                .and_then(Value::as_str)
                .ok_or(RpcError::InvalidFormat("message id must be a string"))?;
            if id.is_empty() {
                return Err(RpcError::InvalidFormat("message id must not be empty"));
            }
            Ok(RequestId::from(id))
        };

        match msg_type {
            2 => {
                // CALL: [2, messageId, action, payload]
                if array.len() != 4 {
                    return Err(RpcError::InvalidFormat("CALL must have 4 elements"));
                }

                let action = array[2]
                    .as_str()
                    .ok_or(RpcError::InvalidFormat("action must be a string"))?
                    .to_string();

                Ok(Frame::Call(Call {
                    message_id: message_id()?,
                    action,
                    payload: array[3].clone(),
                }))
            }
            3 => {
                // CALLRESULT: [3, messageId, payload]
                if array.len() != 3 {
                    return Err(RpcError::InvalidFormat("CALLRESULT must have 3 elements"));
                }

                Ok(Frame::CallResult(CallResult {
                    message_id: message_id()?,
                    payload: array[2].clone(),
                }))
            }
            4 => {
                // CALLERROR: [4, messageId, errorCode, errorDescription, errorDetails]
                if array.len() != 5 {
                    return Err(RpcError::InvalidFormat("CALLERROR must have 5 elements"));
                }

                let error_code = array[2]
                    .as_str()
                    .and_then(RpcErrorCode::from_token)
                    .unwrap_or(RpcErrorCode::GenericError);

                Ok(Frame::CallError(CallError {
                    message_id: message_id()?,
                    error_code,
                    error_description: array[3].as_str().unwrap_or("").to_string(),
                    error_details: array[4].clone(),
                }))
            }
            _ => Err(RpcError::UnknownMessageType(msg_type)),
        }
    }

    /// Get the message ID
    pub fn message_id(&self) -> &RequestId {
        match self {
            Frame::Call(c) => &c.message_id,
            Frame::CallResult(r) => &r.message_id,
            Frame::CallError(e) => &e.message_id,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Frame::Call(_) => MessageType::Call,
            Frame::CallResult(_) => MessageType::CallResult,
            Frame::CallError(_) => MessageType::CallError,
        }
    }

    /// Action name; only CALL frames carry one.
    pub fn action(&self) -> Option<&str> {
        match self {
            Frame::Call(c) => Some(&c.action),
            _ => None,
        }
    }

    /// Payload of a CALL/CALLRESULT, details of a CALLERROR.
    pub fn body(&self) -> &Value {
        match self {
            Frame::Call(c) => &c.payload,
            Frame::CallResult(r) => &r.payload,
            Frame::CallError(e) => &e.error_details,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Frame::Call(c) => json!([
                MessageType::Call as i32,
                c.message_id.as_str(),
                &c.action,
                &c.payload
            ]),
            Frame::CallResult(r) => json!([
                MessageType::CallResult as i32,
                r.message_id.as_str(),
                &r.payload
            ]),
            Frame::CallError(e) => json!([
                MessageType::CallError as i32,
                e.message_id.as_str(),
                e.error_code.as_str(),
                &e.error_description,
                &e.error_details
            ]),
        }
    }

    /// Serialize to OCPP-J wire format
    pub fn to_bytes(&self) -> Result<Vec<u8>, RpcError> {
        Ok(serde_json::to_vec(&self.to_json())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_parsing() {
        let json = r#"[2, "msg-123", "Heartbeat", {}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();

        match frame {
            Frame::Call(call) => {
                assert_eq!(call.message_id.as_str(), "msg-123");
                assert_eq!(call.action, "Heartbeat");
            }
            _ => panic!("Expected Call"),
        }
    }

    #[test]
    fn test_call_result_parsing() {
        let json = r#"[3, "msg-123", {"currentTime": "2026-01-20T12:00:00Z"}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();

        assert_eq!(frame.message_type(), MessageType::CallResult);
        assert_eq!(frame.message_id().as_str(), "msg-123");
        assert_eq!(frame.body()["currentTime"], "2026-01-20T12:00:00Z");
    }

    #[test]
    fn test_call_error_parsing() {
        let json = r#"[4, "msg-123", "NotImplemented", "Action not supported", {}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();

        match frame {
            Frame::CallError(error) => {
                assert_eq!(error.message_id.as_str(), "msg-123");
                assert_eq!(error.error_code, RpcErrorCode::NotImplemented);
                assert_eq!(ResultCode::from(error.error_code), ResultCode::NotImplemented);
            }
            _ => panic!("Expected CallError"),
        }
    }

    #[test]
    fn test_unknown_error_code_is_generic() {
        let json = r#"[4, "m", "SomethingNew", "?", {}]"#;
        match Frame::parse(json.as_bytes()).unwrap() {
            Frame::CallError(error) => assert_eq!(error.error_code, RpcErrorCode::GenericError),
            _ => panic!("Expected CallError"),
        }
    }

    #[test]
    fn test_invalid_frames() {
        let invalid = |bytes: &[u8]| matches!(Frame::parse(bytes), Err(RpcError::InvalidFormat(_)));
        assert!(invalid(b"[]"));
        assert!(invalid(b"[2, \"m\", \"Heartbeat\"]"));
        assert!(invalid(b"[2, 7, \"Heartbeat\", {}]"));
        assert!(matches!(Frame::parse(b"[9, \"m\", {}]"), Err(RpcError::UnknownMessageType(9))));
        assert!(matches!(Frame::parse(b"{}"), Err(RpcError::Json(_))));
    }

    #[test]
    fn test_empty_message_id_rejected() {
        for bytes in [
            &br#"[2, "", "Heartbeat", {}]"#[..],
            &br#"[3, "", {}]"#[..],
            &br#"[4, "", "GenericError", "", {}]"#[..],
        ] {
            let err = Frame::parse(bytes).unwrap_err();
            assert!(matches!(err, RpcError::InvalidFormat(_)));
            assert_eq!(err.error_code(), RpcErrorCode::FormatViolation);
            assert_eq!(ResultCode::from(err.error_code()), ResultCode::FormationViolation);
        }
        assert_eq!(
            RpcError::UnknownMessageType(9).error_code(),
            RpcErrorCode::MessageTypeNotSupported
        );
    }

    #[test]
    fn test_frame_bytes_roundtrip() {
        let frame = Frame::CallError(CallError::new(
            RequestId::from("m-1"),
            RpcErrorCode::FormatViolation,
            "missing JSON property 'batteryData'",
        ));
        let bytes = frame.to_bytes().unwrap();
        assert!(bytes.starts_with(b"[4,\"m-1\",\"FormatViolation\""));
        assert_eq!(Frame::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_result_code_mapping() {
        for code in [
            ResultCode::FormationViolation,
            ResultCode::SignatureError,
            ResultCode::Server,
            ResultCode::ProtocolError,
            ResultCode::NotImplemented,
            ResultCode::GenericError,
        ] {
            assert_eq!(ResultCode::from(RpcErrorCode::from(code)), code);
        }
        assert_eq!(RpcErrorCode::from(ResultCode::Timeout), RpcErrorCode::GenericError);
    }
}
