//! Request/response envelopes
//!
//! Every action shares the same envelope: correlation id, routing metadata,
//! timestamps, signatures, custom data and the JSON-LD context. The envelope
//! is a plain struct composed into [`Request<A>`] and [`Response<A>`], which
//! are generic over an [`Action`] binding a name to its two payload types.
//!
//! ## Wire shape
//!
//! ```text
//! { <payload fields>, "customData"?: {...}, "signatures"?: [...], "@context"?: "uri" }
//! ```
//!
//! Routing metadata does not travel in the JSON object; the dispatcher hands
//! it over as [`RequestMeta`] / [`ResponseMeta`].

mod exchange;

pub use exchange::{Exchange, ExchangeError, ExchangeState};

use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::{catch_fault, expect_object, CodecHooks, JsonCodec, JsonObjectExt, JsonWriter};
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{json_type_name, CodecError, ParseError};
use crate::result::{OcppResult, ResultCode};
use crate::rpc::RpcErrorCode;
use crate::types::{
    CustomData, Destination, EventTrackingId, NetworkPath, RequestId, Signature, SignatureVerifier,
};

/// Key of the JSON-LD context property.
pub const CONTEXT_KEY: &str = "@context";

const REQUEST_RESERVED_KEYS: &[&str] = &["customData", "signatures", CONTEXT_KEY];
const RESPONSE_RESERVED_KEYS: &[&str] = &["customData", "signatures"];

/// Action-specific fields of a request or response.
pub trait Payload: Debug + Clone + PartialEq + Eq + Hash + Send + Sync + 'static {
    /// JSON properties owned by the payload.
    const KEYS: &'static [&'static str];

    fn parse_fields(obj: &Map<String, Value>, hooks: &CodecHooks) -> Result<Self, ParseError>;

    fn write_fields(&self, out: &mut JsonWriter<'_>);
}

/// Binds an action name to its request and response payloads.
pub trait Action: Debug + Copy + PartialEq + Eq + Hash + Send + Sync + 'static {
    const NAME: &'static str;
    /// Hook label of the request object.
    const REQUEST_LABEL: &'static str;
    /// Hook label of the response object.
    const RESPONSE_LABEL: &'static str;

    type Request: Payload;
    type Response: Payload;
}

// ============================================================================
// Metadata from the dispatcher
// ============================================================================

/// Routing metadata accompanying a request document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    /// Generated when `None`.
    pub request_id: Option<RequestId>,
    pub destination: Destination,
    pub network_path: NetworkPath,
    /// Generated when `None`.
    pub event_tracking_id: Option<EventTrackingId>,
    /// Now when `None`.
    pub request_timestamp: Option<DateTime<Utc>>,
    /// [`DEFAULT_REQUEST_TIMEOUT`] when `None`.
    pub request_timeout: Option<Duration>,
}

impl RequestMeta {
    pub fn to(destination: impl Into<Destination>) -> Self {
        Self {
            request_id: None,
            destination: destination.into(),
            network_path: NetworkPath::empty(),
            event_tracking_id: None,
            request_timestamp: None,
            request_timeout: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<RequestId>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_network_path(mut self, path: NetworkPath) -> Self {
        self.network_path = path;
        self
    }

    pub fn with_event_tracking_id(mut self, id: EventTrackingId) -> Self {
        self.event_tracking_id = Some(id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.request_timestamp = Some(timestamp);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Routing metadata accompanying a response document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Back to the request's source when `None`.
    pub destination: Option<Destination>,
    pub network_path: NetworkPath,
    /// The request's id when `None`.
    pub event_tracking_id: Option<EventTrackingId>,
    /// Now when `None`.
    pub response_timestamp: Option<DateTime<Utc>>,
}

impl ResponseMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, destination: impl Into<Destination>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_network_path(mut self, path: NetworkPath) -> Self {
        self.network_path = path;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.response_timestamp = Some(timestamp);
        self
    }
}

// ============================================================================
// Envelopes
// ============================================================================

/// Fields shared by every request.
///
/// Equality and hashing ignore `request_timestamp`.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub request_id: RequestId,
    pub destination: Destination,
    pub network_path: NetworkPath,
    pub request_timestamp: DateTime<Utc>,
    pub request_timeout: Duration,
    pub event_tracking_id: EventTrackingId,
    pub signatures: Vec<Signature>,
    pub custom_data: Option<CustomData>,
    /// JSON-LD `@context` URI.
    pub context: Option<String>,
}

type RequestIdentity<'a> = (
    &'a RequestId,
    &'a Destination,
    &'a NetworkPath,
    &'a Duration,
    &'a EventTrackingId,
    &'a [Signature],
    &'a Option<CustomData>,
    &'a Option<String>,
);

impl RequestEnvelope {
    fn from_meta(meta: RequestMeta) -> Self {
        Self {
            request_id: meta.request_id.unwrap_or_else(RequestId::generate),
            destination: meta.destination,
            network_path: meta.network_path,
            request_timestamp: meta.request_timestamp.unwrap_or_else(Utc::now),
            request_timeout: meta.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            event_tracking_id: meta.event_tracking_id.unwrap_or_else(EventTrackingId::generate),
            signatures: Vec::new(),
            custom_data: None,
            context: None,
        }
    }

    fn identity(&self) -> RequestIdentity<'_> {
        (
            &self.request_id,
            &self.destination,
            &self.network_path,
            &self.request_timeout,
            &self.event_tracking_id,
            &self.signatures,
            &self.custom_data,
            &self.context,
        )
    }
}

impl PartialEq for RequestEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for RequestEnvelope {}

impl Hash for RequestEnvelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Fields shared by every response.
///
/// Equality and hashing ignore `response_timestamp`.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub result: OcppResult,
    pub response_timestamp: DateTime<Utc>,
    pub destination: Destination,
    pub network_path: NetworkPath,
    pub event_tracking_id: EventTrackingId,
    pub signatures: Vec<Signature>,
    pub custom_data: Option<CustomData>,
}

type ResponseIdentity<'a> = (
    &'a OcppResult,
    &'a Destination,
    &'a NetworkPath,
    &'a EventTrackingId,
    &'a [Signature],
    &'a Option<CustomData>,
);

impl ResponseEnvelope {
    fn reply_to(request: &RequestEnvelope, result: OcppResult, meta: ResponseMeta) -> Self {
        // Replies go back to where the request came from. Without a recorded
        // path the peer is a direct neighbour named by the request destination.
        let destination = meta.destination.unwrap_or_else(|| match request.network_path.source() {
            Some(source) => Destination::Node(source.clone()),
            None => request.destination.clone(),
        });

        Self {
            result,
            response_timestamp: meta.response_timestamp.unwrap_or_else(Utc::now),
            destination,
            network_path: meta.network_path,
            event_tracking_id: meta
                .event_tracking_id
                .unwrap_or_else(|| request.event_tracking_id.clone()),
            signatures: Vec::new(),
            custom_data: None,
        }
    }

    fn identity(&self) -> ResponseIdentity<'_> {
        (
            &self.result,
            &self.destination,
            &self.network_path,
            &self.event_tracking_id,
            &self.signatures,
            &self.custom_data,
        )
    }
}

impl PartialEq for ResponseEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for ResponseEnvelope {}

impl Hash for ResponseEnvelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

// ============================================================================
// Reserved properties
// ============================================================================

/// Parse `signatures`, keeping wire order and dropping repeats.
fn parse_signatures(
    obj: &Map<String, Value>,
    hooks: &CodecHooks,
) -> Result<Vec<Signature>, ParseError> {
    let parsed = obj.parse_optional("signatures", Signature::LABEL, |value| {
        let items = value.as_array().ok_or(ParseError::WrongType {
            expected: "array",
            found: json_type_name(value),
        })?;

        let mut signatures: Vec<Signature> = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let signature = Signature::from_json(item, hooks)
                .map_err(|e| ParseError::in_field(&format!("[{}]", index), Signature::LABEL, e))?;
            if !signatures.contains(&signature) {
                signatures.push(signature);
            }
        }
        Ok(signatures)
    })?;
    Ok(parsed.unwrap_or_default())
}

fn allowed_keys(payload: &[&'static str], reserved: &[&'static str]) -> Vec<&'static str> {
    payload.iter().chain(reserved).copied().collect()
}

// ============================================================================
// Request
// ============================================================================

/// A typed request of action `A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request<A: Action> {
    envelope: RequestEnvelope,
    payload: A::Request,
}

/// A signature that did not verify.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("signature '{key_id}' rejected: {reason}")]
pub struct SignatureRejected {
    pub key_id: String,
    pub reason: String,
}

impl<A: Action> Request<A> {
    pub fn new(meta: RequestMeta, payload: A::Request) -> Self {
        Self {
            envelope: RequestEnvelope::from_meta(meta),
            payload,
        }
    }

    pub fn action(&self) -> &'static str {
        A::NAME
    }

    pub fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }

    pub fn payload(&self) -> &A::Request {
        &self.payload
    }

    pub fn request_id(&self) -> &RequestId {
        &self.envelope.request_id
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.envelope.signatures
    }

    pub fn custom_data(&self) -> Option<&CustomData> {
        self.envelope.custom_data.as_ref()
    }

    pub fn context(&self) -> Option<&str> {
        self.envelope.context.as_deref()
    }

    /// Copy with `signature` added; repeats are ignored.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        if !self.envelope.signatures.contains(&signature) {
            self.envelope.signatures.push(signature);
        }
        self
    }

    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.envelope.custom_data = Some(custom_data);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.envelope.context = Some(context.into());
        self
    }

    /// Parse a request document. Never panics: faults raised by hooks come
    /// back as [`ParseError::Internal`].
    pub fn try_parse(
        json: &Value,
        meta: RequestMeta,
        hooks: &CodecHooks,
    ) -> Result<Self, ParseError> {
        let result = catch_fault(|| {
            let json = hooks.prepare(A::REQUEST_LABEL, json);
            let obj = expect_object(&json)?;
            obj.reject_unknown(&allowed_keys(A::Request::KEYS, REQUEST_RESERVED_KEYS))?;

            let payload = A::Request::parse_fields(obj, hooks)?;
            let mut envelope = RequestEnvelope::from_meta(meta);
            envelope.signatures = parse_signatures(obj, hooks)?;
            envelope.custom_data = obj.optional("customData", hooks)?;
            envelope.context = obj.optional(CONTEXT_KEY, hooks)?;

            Ok(Self { envelope, payload })
        });

        if let Err(ref e) = result {
            debug!("{} request rejected: {}", A::NAME, e);
        }
        result
    }

    /// Parse request text, for callers that expect well-formed input.
    pub fn parse(text: &str, meta: RequestMeta, hooks: &CodecHooks) -> Result<Self, CodecError> {
        let json: Value = serde_json::from_str(text)?;
        Ok(Self::try_parse(&json, meta, hooks)?)
    }

    /// Serialize payload and reserved properties. Empty signatures and absent
    /// custom data are omitted.
    pub fn to_json(&self, hooks: &CodecHooks) -> Value {
        let mut out = JsonWriter::new(hooks);
        self.payload.write_fields(&mut out);
        out.set("signatures", &self.envelope.signatures)
            .optional("customData", self.envelope.custom_data.as_ref())
            .optional(CONTEXT_KEY, self.envelope.context.as_ref());
        out.finish(A::REQUEST_LABEL)
    }

    /// Bytes covered by the signatures: the request JSON without
    /// `signatures`, keys sorted.
    pub fn signed_bytes(&self, hooks: &CodecHooks) -> Vec<u8> {
        let mut json = self.to_json(hooks);
        if let Some(obj) = json.as_object_mut() {
            obj.remove("signatures");
        }
        json.to_string().into_bytes()
    }

    /// Check every attached signature; the first failure wins.
    pub fn verify_signatures(
        &self,
        verifier: &dyn SignatureVerifier,
        hooks: &CodecHooks,
    ) -> Result<(), SignatureRejected> {
        if self.envelope.signatures.is_empty() {
            return Ok(());
        }

        let signed = self.signed_bytes(hooks);
        for signature in &self.envelope.signatures {
            verifier
                .verify(signature, &signed)
                .map_err(|reason| SignatureRejected {
                    key_id: signature.key_id.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

// ============================================================================
// Response
// ============================================================================

/// A typed response of action `A`, bound to the request that produced it.
///
/// Failed responses carry no payload; on OCPP-J they travel as CALLERROR.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Response<A: Action> {
    request: Arc<Request<A>>,
    envelope: ResponseEnvelope,
    payload: Option<A::Response>,
}

impl<A: Action> Response<A> {
    fn build(request: Arc<Request<A>>, result: OcppResult, payload: Option<A::Response>) -> Self {
        let envelope =
            ResponseEnvelope::reply_to(&request.envelope, result, ResponseMeta::default());
        Self {
            request,
            envelope,
            payload,
        }
    }

    /// Successful response.
    pub fn ok(request: Arc<Request<A>>, payload: A::Response) -> Self {
        Self::build(request, OcppResult::ok(), Some(payload))
    }

    /// The request or reply document did not match the schema.
    pub fn formation_violation(request: Arc<Request<A>>, diagnostic: impl Into<String>) -> Self {
        Self::build(request, OcppResult::formation_violation(diagnostic), None)
    }

    /// A signature was present but did not verify.
    pub fn signature_error(request: Arc<Request<A>>, description: impl Into<String>) -> Self {
        Self::build(request, OcppResult::signature_error(description), None)
    }

    /// Failure decided by the caller.
    ///
    /// A failed response has no payload, so an `OK` result is replaced by a
    /// `Server` error.
    pub fn failed(request: Arc<Request<A>>, result: OcppResult) -> Self {
        let result = if result.is_ok() {
            warn!("{} {}: failed response built with an OK result", A::NAME, request.request_id());
            OcppResult::error(ResultCode::Server, "failed response carried an OK result")
        } else {
            result
        };
        Self::build(request, result, None)
    }

    /// Local fault while processing the request.
    pub fn exception_occurred(request: Arc<Request<A>>, error: &dyn std::error::Error) -> Self {
        Self::build(request, OcppResult::from_error(error), None)
    }

    /// The channel failed before any reply document existed.
    pub fn request_error(
        request: Arc<Request<A>>,
        code: ResultCode,
        description: impl Into<String>,
    ) -> Self {
        Self::build(request, OcppResult::error(code, description), None)
    }

    /// The peer answered with a CALLERROR. Null or an empty details object
    /// counts as no details.
    pub fn from_call_error(
        request: Arc<Request<A>>,
        code: RpcErrorCode,
        description: impl Into<String>,
        details: Value,
    ) -> Self {
        let mut result = OcppResult::error(code.into(), description);
        let has_details = match &details {
            Value::Null => false,
            Value::Object(d) => !d.is_empty(),
            _ => true,
        };
        if has_details {
            result = result.with_details(details);
        }
        Self::build(request, result, None)
    }

    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        let result = self.envelope.result.clone();
        let signatures = std::mem::take(&mut self.envelope.signatures);
        let custom_data = self.envelope.custom_data.take();

        self.envelope = ResponseEnvelope::reply_to(&self.request.envelope, result, meta);
        self.envelope.signatures = signatures;
        self.envelope.custom_data = custom_data;
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        if !self.envelope.signatures.contains(&signature) {
            self.envelope.signatures.push(signature);
        }
        self
    }

    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.envelope.custom_data = Some(custom_data);
        self
    }

    pub fn request(&self) -> &Arc<Request<A>> {
        &self.request
    }

    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }

    pub fn result(&self) -> &OcppResult {
        &self.envelope.result
    }

    pub fn is_ok(&self) -> bool {
        self.envelope.result.is_ok()
    }

    pub fn payload(&self) -> Option<&A::Response> {
        self.payload.as_ref()
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.envelope.signatures
    }

    pub fn custom_data(&self) -> Option<&CustomData> {
        self.envelope.custom_data.as_ref()
    }

    /// Parse a reply document for an already matched request.
    pub fn try_parse(
        request: Arc<Request<A>>,
        json: &Value,
        meta: ResponseMeta,
        hooks: &CodecHooks,
    ) -> Result<Self, ParseError> {
        let result = catch_fault(|| {
            let json = hooks.prepare(A::RESPONSE_LABEL, json);
            let obj = expect_object(&json)?;
            obj.reject_unknown(&allowed_keys(A::Response::KEYS, RESPONSE_RESERVED_KEYS))?;

            let payload = A::Response::parse_fields(obj, hooks)?;
            let signatures = parse_signatures(obj, hooks)?;
            let custom_data = obj.optional("customData", hooks)?;
            Ok((payload, signatures, custom_data))
        });

        match result {
            Ok((payload, signatures, custom_data)) => {
                let mut envelope =
                    ResponseEnvelope::reply_to(&request.envelope, OcppResult::ok(), meta);
                envelope.signatures = signatures;
                envelope.custom_data = custom_data;
                Ok(Self {
                    request,
                    envelope,
                    payload: Some(payload),
                })
            }
            Err(e) => {
                debug!("{} response to {} rejected: {}", A::NAME, request.request_id(), e);
                Err(e)
            }
        }
    }

    pub fn parse(
        request: Arc<Request<A>>,
        text: &str,
        meta: ResponseMeta,
        hooks: &CodecHooks,
    ) -> Result<Self, CodecError> {
        let json: Value = serde_json::from_str(text)?;
        Ok(Self::try_parse(request, &json, meta, hooks)?)
    }

    /// Reply document, or `None` for a failed response.
    pub fn to_json(&self, hooks: &CodecHooks) -> Option<Value> {
        let payload = self.payload.as_ref()?;
        let mut out = JsonWriter::new(hooks);
        payload.write_fields(&mut out);
        out.set("signatures", &self.envelope.signatures)
            .optional("customData", self.envelope.custom_data.as_ref());
        Some(out.finish(A::RESPONSE_LABEL))
    }
}
