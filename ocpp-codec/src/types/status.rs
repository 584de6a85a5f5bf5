use crate::ocpp_object;

ocpp_object! {
    /// Status info for responses
    pub struct StatusInfo: "status info" {
        mandatory reason_code: String = "reasonCode",
        optional additional_info: String = "additionalInfo",
    }
}

impl StatusInfo {
    pub fn new(reason_code: impl Into<String>) -> Self {
        Self {
            reason_code: reason_code.into(),
            additional_info: None,
            custom_data: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }
}

ocpp_object! {
    /// Charging station information
    pub struct ChargingStation: "charging station" {
        mandatory model: String = "model",
        mandatory vendor_name: String = "vendorName",
        optional serial_number: String = "serialNumber",
        optional firmware_version: String = "firmwareVersion",
    }
}

impl ChargingStation {
    pub fn new(vendor_name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            vendor_name: vendor_name.into(),
            serial_number: None,
            firmware_version: None,
            custom_data: None,
        }
    }
}
