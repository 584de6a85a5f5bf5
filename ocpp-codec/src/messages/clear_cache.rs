//! ClearCache

use crate::types::{ClearCacheStatus, StatusInfo};
use crate::{ocpp_action, ocpp_payload};

ocpp_payload! {
    /// Ask a charging station to clear its authorization cache.
    pub struct ClearCacheRequest {}
}

ocpp_payload! {
    pub struct ClearCacheResponse {
        mandatory status: ClearCacheStatus = "status",
        optional status_info: StatusInfo = "statusInfo",
    }
}

ocpp_action! {
    pub struct ClearCache = "ClearCache" {
        request: ClearCacheRequest,
        response: ClearCacheResponse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::codec::CodecHooks;
    use crate::envelope::{Request, RequestMeta, Response, ResponseMeta};
    use crate::error::ErrorKind;
    use crate::types::NetworkingNodeId;
    use serde_json::json;

    fn request() -> Arc<Request<ClearCache>> {
        let meta = RequestMeta::to(NetworkingNodeId::from("cs01")).with_request_id("cc-1");
        Arc::new(Request::new(meta, ClearCacheRequest {}))
    }

    #[test]
    fn test_request_roundtrip() {
        let hooks = CodecHooks::none();
        let meta = RequestMeta::to(NetworkingNodeId::from("cs01"));
        let request = Request::<ClearCache>::try_parse(&json!({}), meta, &hooks).unwrap();
        assert_eq!(request.to_json(&hooks), json!({}));

        let meta = RequestMeta::to(NetworkingNodeId::from("cs01"));
        let err =
            Request::<ClearCache>::try_parse(&json!({"all": true}), meta, &hooks).unwrap_err();
        assert!(err.to_string().contains("'all'"));
    }

    #[test]
    fn test_response_roundtrip() {
        let hooks = CodecHooks::none();
        let doc = json!({
            "status": "Rejected",
            "statusInfo": {"reasonCode": "Busy", "additionalInfo": "transaction running"}
        });

        let response = Response::try_parse(request(), &doc, ResponseMeta::new(), &hooks).unwrap();
        let payload = response.payload().unwrap();
        assert_eq!(payload.status, ClearCacheStatus::Rejected);
        let info = StatusInfo::new("Busy").with_info("transaction running");
        assert_eq!(payload.status_info, Some(info));
        assert_eq!(response.to_json(&hooks), Some(doc));
    }

    #[test]
    fn test_response_missing_status() {
        let err = Response::try_parse(
            request(),
            &json!({"statusInfo": {"reasonCode": "Busy"}}),
            ResponseMeta::new(),
            &CodecHooks::none(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.to_string().contains("'status'"));
    }
}
