//! Configuration for a node using the codec
//!
//! Identity and defaults applied to requests built locally.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::envelope::{Action, Request, RequestMeta};
use crate::types::{Destination, NetworkPath, NetworkingNodeId};

/// Timeout given to requests that do not specify one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-LD context of OCPP 2.1 documents.
pub const OCPP_21_CONTEXT: &str = "https://www.openchargealliance.org/schemas/ocpp/2.1";

/// Codec configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Identity of this node on the overlay network
    pub node_id: String,

    /// Request timeout
    pub request_timeout: Duration,

    /// `@context` stamped on outgoing requests (optional)
    pub json_ld_context: Option<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            node_id: "ocpp-node".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            json_ld_context: None,
        }
    }
}

impl CodecConfig {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            ..Default::default()
        }
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set JSON-LD context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.json_ld_context = Some(context.into());
        self
    }

    pub fn node_id(&self) -> NetworkingNodeId {
        NetworkingNodeId::from(self.node_id.as_str())
    }

    /// Metadata for a request originating at this node.
    pub fn request_meta(&self, destination: impl Into<Destination>) -> RequestMeta {
        RequestMeta::to(destination)
            .with_network_path(NetworkPath::empty().append(self.node_id()))
            .with_timeout(self.request_timeout)
    }

    /// Build a request from this node, stamped with the configured context.
    pub fn new_request<A: Action>(
        &self,
        destination: impl Into<Destination>,
        payload: A::Request,
    ) -> Request<A> {
        let request = Request::new(self.request_meta(destination), payload);
        match &self.json_ld_context {
            Some(context) => request.with_context(context.clone()),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CodecConfig::new("cs01")
            .with_request_timeout(Duration::from_secs(5))
            .with_context(OCPP_21_CONTEXT);

        assert_eq!(config.node_id().as_str(), "cs01");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.json_ld_context.as_deref(), Some(OCPP_21_CONTEXT));
    }

    #[test]
    fn test_request_meta_starts_path_here() {
        let config = CodecConfig::new("cs01");
        let meta = config.request_meta(NetworkingNodeId::from("csms"));

        assert_eq!(meta.network_path.hops(), &[NetworkingNodeId::from("cs01")]);
        assert_eq!(meta.request_timeout, Some(DEFAULT_REQUEST_TIMEOUT));
    }

    #[test]
    fn test_new_request_applies_defaults() {
        use crate::codec::CodecHooks;
        use crate::envelope::CONTEXT_KEY;
        use crate::messages::{Heartbeat, HeartbeatRequest};

        let config = CodecConfig::new("cs01")
            .with_request_timeout(Duration::from_secs(5))
            .with_context(OCPP_21_CONTEXT);
        let request =
            config.new_request::<Heartbeat>(NetworkingNodeId::from("csms"), HeartbeatRequest {});

        assert_eq!(request.context(), Some(OCPP_21_CONTEXT));
        assert_eq!(request.envelope().request_timeout, Duration::from_secs(5));
        assert_eq!(
            request.envelope().network_path.source(),
            Some(&NetworkingNodeId::from("cs01"))
        );
        assert_eq!(request.to_json(&CodecHooks::none())[CONTEXT_KEY], OCPP_21_CONTEXT);

        let plain = CodecConfig::new("cs01")
            .new_request::<Heartbeat>(NetworkingNodeId::from("csms"), HeartbeatRequest {});
        assert_eq!(plain.context(), None);
        assert_eq!(plain.envelope().request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_config_serde() {
        let config = CodecConfig::new("lc01");
        let text = serde_json::to_string(&config).unwrap();
        let back: CodecConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
