//! BootNotification

use chrono::{DateTime, Utc};

use crate::types::{BootReason, ChargingStation, RegistrationStatus, StatusInfo};
use crate::{ocpp_action, ocpp_payload};

ocpp_payload! {
    /// BootNotification request (CP -> CSMS)
    pub struct BootNotificationRequest {
        mandatory charging_station: ChargingStation = "chargingStation",
        mandatory reason: BootReason = "reason",
    }
}

ocpp_payload! {
    /// BootNotification response (CSMS -> CP)
    pub struct BootNotificationResponse {
        mandatory current_time: DateTime<Utc> = "currentTime",
        /// Heartbeat interval in seconds
        mandatory interval: i32 = "interval",
        mandatory status: RegistrationStatus = "status",
        optional status_info: StatusInfo = "statusInfo",
    }
}

ocpp_action! {
    pub struct BootNotification = "BootNotification" {
        request: BootNotificationRequest,
        response: BootNotificationResponse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::codec::CodecHooks;
    use crate::envelope::{Request, RequestMeta, Response, ResponseMeta};
    use crate::types::NetworkingNodeId;
    use serde_json::json;

    fn meta() -> RequestMeta {
        RequestMeta::to(NetworkingNodeId::from("csms")).with_request_id("boot-1")
    }

    fn boot_request() -> Arc<Request<BootNotification>> {
        Arc::new(Request::new(
            meta(),
            BootNotificationRequest {
                charging_station: ChargingStation::new("Elektrokombinacija", "EK3-OCPP"),
                reason: BootReason::PowerUp,
            },
        ))
    }

    fn boot_response() -> serde_json::Value {
        json!({
            "currentTime": "2026-01-20T12:00:00Z",
            "interval": 300,
            "status": "Accepted"
        })
    }

    #[test]
    fn test_boot_request() {
        let json = json!({
            "chargingStation": {
                "model": "EK3-OCPP",
                "vendorName": "Elektrokombinacija",
                "firmwareVersion": "0.1.0"
            },
            "reason": "PowerUp"
        });

        let request =
            Request::<BootNotification>::try_parse(&json, meta(), &CodecHooks::none()).unwrap();
        assert_eq!(request.payload().charging_station.vendor_name, "Elektrokombinacija");
        assert_eq!(request.payload().reason, BootReason::PowerUp);
        assert_eq!(request.to_json(&CodecHooks::none()), json);
    }

    #[test]
    fn test_boot_request_missing_reason() {
        let json = json!({"chargingStation": {"model": "M", "vendorName": "V"}});
        let err = Request::<BootNotification>::try_parse(&json, meta(), &CodecHooks::none())
            .unwrap_err();
        assert!(err.to_string().contains("'reason'"));
    }

    #[test]
    fn test_boot_response() {
        let hooks = CodecHooks::none();
        let json = boot_response();
        let response =
            Response::try_parse(boot_request(), &json, ResponseMeta::new(), &hooks).unwrap();
        let payload = response.payload().unwrap();
        assert_eq!(payload.interval, 300);
        assert_eq!(payload.status, RegistrationStatus::Accepted);
        assert_eq!(response.to_json(&hooks), Some(json));
    }

    #[test]
    fn test_boot_response_missing_keys() {
        for key in ["currentTime", "interval", "status"] {
            let mut json = boot_response();
            json.as_object_mut().unwrap().remove(key);

            let err = Response::try_parse(
                boot_request(),
                &json,
                ResponseMeta::new(),
                &CodecHooks::none(),
            )
            .unwrap_err();
            assert!(err.to_string().contains(&format!("'{}'", key)), "{}: {}", key, err);
        }
    }
}
