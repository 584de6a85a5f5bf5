//! Battery swap station data, written out by hand.
//!
//! `BatteryData` carries range and length limits the generated objects do not
//! express, so its codec spells out each property with a custom converter.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::codec::{bounded_str, expect_object, CodecHooks, JsonCodec, JsonObjectExt, JsonWriter};
use crate::error::ParseError;

use super::{CustomData, Percentage};

const SERIAL_NUMBER_MAX_LEN: usize = 50;
const VENDOR_INFO_MAX_LEN: usize = 500;

/// State of one battery moved in or out of a swap station.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatteryData {
    /// Slot the battery sits in.
    pub evse_id: i32,
    pub serial_number: String,
    /// State of charge.
    pub soc: Percentage,
    /// State of health.
    pub soh: Percentage,
    pub production_date: Option<DateTime<Utc>>,
    /// Vendor-specific information, at most 500 characters.
    pub vendor_info: Option<String>,
    pub custom_data: Option<CustomData>,
}

impl BatteryData {
    pub const KEYS: &'static [&'static str] = &[
        "evseId",
        "serialNumber",
        "soC",
        "soH",
        "productionDate",
        "vendorInfo",
        "customData",
    ];

    pub fn new(
        evse_id: i32,
        serial_number: impl Into<String>,
        soc: Percentage,
        soh: Percentage,
    ) -> Self {
        Self {
            evse_id,
            serial_number: serial_number.into(),
            soc,
            soh,
            production_date: None,
            vendor_info: None,
            custom_data: None,
        }
    }

    pub fn with_production_date(mut self, date: DateTime<Utc>) -> Self {
        self.production_date = Some(date);
        self
    }

    pub fn with_vendor_info(mut self, info: impl Into<String>) -> Self {
        self.vendor_info = Some(info.into());
        self
    }
}

impl JsonCodec for BatteryData {
    const LABEL: &'static str = "battery data";

    fn from_json(json: &Value, hooks: &CodecHooks) -> Result<Self, ParseError> {
        let json = hooks.prepare(Self::LABEL, json);
        let obj = expect_object(&json)?;
        obj.reject_unknown(Self::KEYS)?;

        let evse_id = obj.parse_mandatory("evseId", "EVSE id", |v| {
            let id = i32::from_json(v, hooks)?;
            if id < 0 {
                return Err(ParseError::constraint("must not be negative"));
            }
            Ok(id)
        })?;

        let serial_number = obj.parse_mandatory("serialNumber", "serial number", |v| {
            bounded_str(v, SERIAL_NUMBER_MAX_LEN).map(str::to_string)
        })?;

        let vendor_info = obj.parse_optional("vendorInfo", "vendor info", |v| {
            bounded_str(v, VENDOR_INFO_MAX_LEN).map(str::to_string)
        })?;

        Ok(Self {
            evse_id,
            serial_number,
            soc: obj.mandatory("soC", hooks)?,
            soh: obj.mandatory("soH", hooks)?,
            production_date: obj.optional("productionDate", hooks)?,
            vendor_info,
            custom_data: obj.optional("customData", hooks)?,
        })
    }

    fn to_json(&self, hooks: &CodecHooks) -> Value {
        let mut out = JsonWriter::new(hooks);
        out.mandatory("evseId", &self.evse_id)
            .mandatory("serialNumber", &self.serial_number)
            .mandatory("soC", &self.soc)
            .mandatory("soH", &self.soh)
            .optional("productionDate", self.production_date.as_ref())
            .optional("vendorInfo", self.vendor_info.as_ref())
            .optional("customData", self.custom_data.as_ref());
        out.finish(Self::LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({"evseId": 1, "serialNumber": "SN1", "soC": 80.0, "soH": 95.0})
    }

    #[test]
    fn test_parse_minimal() {
        let data = BatteryData::from_json(&sample(), &CodecHooks::none()).unwrap();
        assert_eq!(data.evse_id, 1);
        assert_eq!(data.serial_number, "SN1");
        assert_eq!(data.soc.value(), 80.0);
        assert_eq!(data.to_json(&CodecHooks::none()), sample());
    }

    #[test]
    fn test_state_of_charge_range() {
        let mut doc = sample();
        doc["soC"] = json!(120.5);
        let err = BatteryData::from_json(&doc, &CodecHooks::none()).unwrap_err();
        assert!(err.to_string().contains("'soC'"));
    }

    #[test]
    fn test_negative_evse_id() {
        let mut doc = sample();
        doc["evseId"] = json!(-1);
        let err = BatteryData::from_json(&doc, &CodecHooks::none()).unwrap_err();
        assert!(err.to_string().contains("evseId"));
    }

    #[test]
    fn test_serial_number_length() {
        let mut doc = sample();
        doc["serialNumber"] = json!("S".repeat(51));
        assert!(BatteryData::from_json(&doc, &CodecHooks::none()).is_err());
    }

    #[test]
    fn test_optional_fields_roundtrip() {
        let hooks = CodecHooks::none();
        let mut doc = sample();
        doc["productionDate"] = json!("2024-03-01T00:00:00Z");
        doc["vendorInfo"] = json!("cells: NMC");

        let data = BatteryData::from_json(&doc, &hooks).unwrap();
        assert_eq!(data.vendor_info.as_deref(), Some("cells: NMC"));
        assert_eq!(BatteryData::from_json(&data.to_json(&hooks), &hooks).unwrap(), data);
    }
}
