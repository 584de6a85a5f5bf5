//! Heartbeat

use chrono::{DateTime, Utc};

use crate::{ocpp_action, ocpp_payload};

ocpp_payload! {
    /// Keep-alive from a charging station.
    pub struct HeartbeatRequest {}
}

ocpp_payload! {
    /// CSMS clock at the time of the heartbeat.
    pub struct HeartbeatResponse {
        mandatory current_time: DateTime<Utc> = "currentTime",
    }
}

ocpp_action! {
    pub struct Heartbeat = "Heartbeat" {
        request: HeartbeatRequest,
        response: HeartbeatResponse,
    }
}
