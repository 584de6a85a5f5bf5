//! DataTransfer
//!
//! Vendor-specific payloads in either direction. `data` is free-form JSON.

use crate::types::{DataTransferStatus, JsonBlob, StatusInfo};
use crate::{ocpp_action, ocpp_payload};

ocpp_payload! {
    pub struct DataTransferRequest {
        optional message_id: String = "messageId",
        optional data: JsonBlob = "data",
        mandatory vendor_id: String = "vendorId",
    }
}

ocpp_payload! {
    pub struct DataTransferResponse {
        mandatory status: DataTransferStatus = "status",
        optional status_info: StatusInfo = "statusInfo",
        optional data: JsonBlob = "data",
    }
}

ocpp_action! {
    pub struct DataTransfer = "DataTransfer" {
        request: DataTransferRequest,
        response: DataTransferResponse,
    }
}
