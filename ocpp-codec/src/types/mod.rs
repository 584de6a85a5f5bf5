//! Domain value types
//!
//! Immutable values with a canonical JSON form and derived structural
//! equality. Every type implements [`JsonCodec`](crate::codec::JsonCodec).

mod battery;
mod custom_data;
mod enums;
mod id_token;
mod ids;
mod json_blob;
mod percentage;
mod primitives;
mod signature;
mod status;

pub use battery::BatteryData;
pub use custom_data::CustomData;
pub use enums::*;
pub use id_token::{AdditionalInfo, IdToken};
pub use ids::{Destination, EventTrackingId, NetworkPath, NetworkingNodeId, RequestId};
pub use json_blob::JsonBlob;
pub use percentage::Percentage;
pub use signature::{Signature, SignatureVerifier};
pub use status::{ChargingStation, StatusInfo};
