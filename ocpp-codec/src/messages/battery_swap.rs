//! BatterySwap (OCPP 2.1), written out by hand.
//!
//! Sent by a battery swap station when a battery is inserted, removed or
//! left unclaimed. The other actions are generated from field tables; this
//! one spells out what those tables expand to.
//!
//! ```json
//! {
//!   "requestId": 42,
//!   "eventType": "BatteryIn",
//!   "idToken": {"idToken": "ABC123", "type": "ISO14443"},
//!   "batteryData": [{"evseId": 1, "serialNumber": "SN1", "soC": 80.0, "soH": 95.0}]
//! }
//! ```

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::codec::{CodecHooks, JsonObjectExt, JsonWriter};
use crate::envelope::{Action, Payload};
use crate::error::ParseError;
use crate::types::{BatteryData, BatterySwapEvent, IdToken};

/// The BatterySwap action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BatterySwap;

impl Action for BatterySwap {
    const NAME: &'static str = "BatterySwap";
    const REQUEST_LABEL: &'static str = "BatterySwapRequest";
    const RESPONSE_LABEL: &'static str = "BatterySwapResponse";

    type Request = BatterySwapRequest;
    type Response = BatterySwapResponse;
}

/// Batteries moved during one swap event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatterySwapRequest {
    /// At least one battery; wire order carries no meaning.
    pub battery_data: BTreeSet<BatteryData>,
    pub event_type: BatterySwapEvent,
    /// Token that authorized the swap.
    pub id_token: IdToken,
    /// Correlates with the RequestBatterySwap that triggered this event.
    pub request_id: i32,
}

impl BatterySwapRequest {
    pub fn new(
        request_id: i32,
        event_type: BatterySwapEvent,
        id_token: IdToken,
        battery_data: impl IntoIterator<Item = BatteryData>,
    ) -> Self {
        Self {
            battery_data: battery_data.into_iter().collect(),
            event_type,
            id_token,
            request_id,
        }
    }
}

impl Payload for BatterySwapRequest {
    const KEYS: &'static [&'static str] = &["batteryData", "eventType", "idToken", "requestId"];

    fn parse_fields(obj: &Map<String, Value>, hooks: &CodecHooks) -> Result<Self, ParseError> {
        Ok(Self {
            battery_data: obj.mandatory_set("batteryData", hooks)?,
            event_type: obj.mandatory("eventType", hooks)?,
            id_token: obj.mandatory("idToken", hooks)?,
            request_id: obj.mandatory("requestId", hooks)?,
        })
    }

    fn write_fields(&self, out: &mut JsonWriter<'_>) {
        out.set("batteryData", &self.battery_data)
            .mandatory("eventType", &self.event_type)
            .mandatory("idToken", &self.id_token)
            .mandatory("requestId", &self.request_id);
    }
}

/// Acknowledgement; carries no fields besides `customData`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BatterySwapResponse;

impl Payload for BatterySwapResponse {
    const KEYS: &'static [&'static str] = &[];

    fn parse_fields(_obj: &Map<String, Value>, _hooks: &CodecHooks) -> Result<Self, ParseError> {
        Ok(Self)
    }

    fn write_fields(&self, _out: &mut JsonWriter<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IdTokenKind, Percentage};

    fn battery(evse_id: i32, serial: &str) -> BatteryData {
        BatteryData::new(
            evse_id,
            serial,
            Percentage::new(80.0).unwrap(),
            Percentage::new(95.0).unwrap(),
        )
    }

    #[test]
    fn test_write_fields_order_independent() {
        let hooks = CodecHooks::none();
        let a = BatterySwapRequest::new(
            7,
            BatterySwapEvent::BatteryOut,
            IdToken::new("T1", IdTokenKind::Local),
            [battery(2, "SN2"), battery(1, "SN1")],
        );
        let b = BatterySwapRequest::new(
            7,
            BatterySwapEvent::BatteryOut,
            IdToken::new("T1", IdTokenKind::Local),
            [battery(1, "SN1"), battery(2, "SN2")],
        );
        assert_eq!(a, b);

        let mut out = JsonWriter::new(&hooks);
        a.write_fields(&mut out);
        let doc = out.finish(BatterySwap::REQUEST_LABEL);
        assert_eq!(doc["batteryData"][0]["serialNumber"], "SN1");
        assert_eq!(doc["eventType"], "BatteryOut");
    }
}
