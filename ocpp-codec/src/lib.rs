//! # OCPP Codec
//!
//! Message layer of the Open Charge Point Protocol: typed request/response
//! pairs, their JSON codec, the shared envelope, protocol result codes,
//! OCPP-J framing and the OCPP 1.5 SOAP envelope.
//!
//! The crate performs no I/O. A transport hands it a JSON document plus
//! routing metadata and gets back a typed message, or the reverse.
//!
//! ## Architecture
//!
//! ```text
//!   WebSocket / HTTP transport (not part of this crate)
//!         │ bytes
//!         ▼
//! ┌──────────────────────────────────────────────┐
//! │ rpc        [2,id,action,{..}] / [3,..] / [4,..]
//! │ dispatch   Correlator: RequestId -> PendingCall, observers
//! ├──────────────────────────────────────────────┤
//! │ envelope   Request<A> / Response<A> / Exchange<A>
//! │ result     ResultCode, OcppResult
//! ├──────────────────────────────────────────────┤
//! │ messages   BatterySwap, BootNotification, ..
//! │ types      IdToken, BatteryData, Signature, CustomData, ..
//! │ codec      JsonCodec, field helpers, hooks, generator macros
//! └──────────────────────────────────────────────┘
//!   soap + xml: OCPP 1.5 envelope, used instead of rpc for SOAP peers
//! ```
//!
//! ## Usage
//!
//! ```
//! use ocpp_codec::messages::BatterySwap;
//! use ocpp_codec::types::{BatterySwapEvent, NetworkingNodeId};
//! use ocpp_codec::{CodecHooks, Request, RequestMeta};
//!
//! let text = r#"{
//!     "requestId": 42,
//!     "eventType": "BatteryIn",
//!     "idToken": {"idToken": "ABC123", "type": "ISO14443"},
//!     "batteryData": [{"evseId": 1, "serialNumber": "SN1", "soC": 80.0, "soH": 95.0}]
//! }"#;
//!
//! let meta = RequestMeta::to(NetworkingNodeId::from("csms"));
//! let request = Request::<BatterySwap>::parse(text, meta, &CodecHooks::none()).unwrap();
//!
//! assert_eq!(request.payload().request_id, 42);
//! assert_eq!(request.payload().event_type, BatterySwapEvent::BatteryIn);
//! ```

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod messages;
pub mod result;
pub mod rpc;
pub mod soap;
pub mod types;
pub mod xml;

#[doc(hidden)]
pub use serde_json as __serde_json;

pub use codec::{CodecHooks, JsonCodec};
pub use config::CodecConfig;
pub use dispatch::{Correlator, Direction, Inbound, MessageObserver, TracingObserver};
pub use envelope::{
    Action, Exchange, ExchangeState, Payload, Request, RequestMeta, Response, ResponseMeta,
};
pub use error::{CodecError, ErrorKind, ParseError};
pub use result::{OcppResult, ResultCode};
pub use rpc::{Frame, RpcErrorCode};
