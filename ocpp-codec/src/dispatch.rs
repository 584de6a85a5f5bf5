//! Request/response correlation and traffic observation
//!
//! The [`Correlator`] is the bookkeeping half of a dispatcher: it remembers
//! which request ids are in flight, classifies incoming frames against that
//! table and expires requests whose timeout has passed. It performs no I/O;
//! the transport hands it frames and sends what it returns.
//!
//! Every frame passing through is reported once to the registered
//! [`MessageObserver`]s.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::CodecHooks;
use crate::config::CodecConfig;
use crate::envelope::{Action, Exchange, ExchangeError, Response};
use crate::rpc::{Call, Frame};
use crate::types::{NetworkingNodeId, RequestId};

/// Which way a message travels relative to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => f.write_str("<-"),
            Direction::Outgoing => f.write_str("->"),
        }
    }
}

/// Sink for a copy of every message passing through the dispatcher.
///
/// CALL and CALLRESULT frames are reported by payload; a CALLERROR is
/// reported as the whole frame so code and description are not lost.
pub trait MessageObserver: Send + Sync {
    fn observe(&self, action: &str, direction: Direction, payload: &Value);
}

/// Observer that logs each message at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MessageObserver for TracingObserver {
    fn observe(&self, action: &str, direction: Direction, payload: &Value) {
        debug!("{} {} {}", direction, action, payload);
    }
}

/// A request awaiting its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub action: &'static str,
    pub sent_at: DateTime<Utc>,
    pub timeout: Duration,
}

impl PendingCall {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        (now - self.sent_at)
            .to_std()
            .map(|elapsed| elapsed >= self.timeout)
            .unwrap_or(false)
    }
}

/// Classification of an incoming frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A new request from the peer
    Call(Call),
    /// Reply to one of our requests; the entry has left the table
    Reply { pending: PendingCall, frame: Frame },
    /// Reply for an id we do not know (late, duplicate or foreign)
    Unmatched(Frame),
}

/// Errors in dispatching
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request id {0} is already in flight")]
    DuplicateRequestId(RequestId),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Correlation table keyed by request id.
pub struct Correlator {
    node_id: NetworkingNodeId,
    pending: HashMap<RequestId, PendingCall>,
    observers: Vec<Arc<dyn MessageObserver>>,
}

impl Correlator {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            node_id: config.node_id(),
            pending: HashMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn node_id(&self) -> &NetworkingNodeId {
        &self.node_id
    }

    /// Register an observer
    pub fn observe_with(&mut self, observer: Arc<dyn MessageObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, action: &str, direction: Direction, frame: &Frame) {
        if self.observers.is_empty() {
            return;
        }
        let payload = observed(frame);
        for observer in &self.observers {
            observer.observe(action, direction, &payload);
        }
    }

    /// Track the exchange's request and return its CALL frame.
    pub fn send<A: Action>(
        &mut self,
        exchange: &mut Exchange<A>,
        now: DateTime<Utc>,
        hooks: &CodecHooks,
    ) -> Result<Frame, DispatchError> {
        let request = exchange.request().clone();
        let request_id = request.request_id().clone();
        if self.pending.contains_key(&request_id) {
            return Err(DispatchError::DuplicateRequestId(request_id));
        }

        exchange.mark_sent(now)?;
        self.pending.insert(
            request_id.clone(),
            PendingCall {
                action: A::NAME,
                sent_at: now,
                timeout: request.envelope().request_timeout,
            },
        );

        let frame = Frame::call(&request, hooks);
        self.notify(A::NAME, Direction::Outgoing, &frame);
        debug!("{}: {} {} pending", self.node_id, A::NAME, request_id);
        Ok(frame)
    }

    /// Frame answering a request we received.
    pub fn reply<A: Action>(&self, response: &Response<A>, hooks: &CodecHooks) -> Frame {
        let frame = Frame::from_response(response, hooks);
        self.notify(A::NAME, Direction::Outgoing, &frame);
        frame
    }

    /// Classify an incoming frame, removing a matched entry from the table.
    pub fn receive(&mut self, frame: Frame) -> Inbound {
        match frame {
            Frame::Call(call) => {
                for observer in &self.observers {
                    observer.observe(&call.action, Direction::Incoming, &call.payload);
                }
                Inbound::Call(call)
            }
            reply => match self.pending.remove(reply.message_id()) {
                Some(pending) => {
                    self.notify(pending.action, Direction::Incoming, &reply);
                    Inbound::Reply {
                        pending,
                        frame: reply,
                    }
                }
                None => {
                    warn!("{}: unmatched reply {}", self.node_id, reply.message_id());
                    self.notify("?", Direction::Incoming, &reply);
                    Inbound::Unmatched(reply)
                }
            },
        }
    }

    /// Drop and return every request whose timeout has elapsed at `now`.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<(RequestId, PendingCall)> {
        let overdue: Vec<RequestId> = self
            .pending
            .iter()
            .filter(|(_, call)| call.is_overdue(now))
            .map(|(id, _)| id.clone())
            .collect();

        let expired: Vec<(RequestId, PendingCall)> = overdue
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|call| (id, call)))
            .collect();

        if !expired.is_empty() {
            info!("{}: {} request(s) timed out", self.node_id, expired.len());
        }
        expired
    }

    pub fn is_pending(&self, request_id: &RequestId) -> bool {
        self.pending.contains_key(request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn observed(frame: &Frame) -> Cow<'_, Value> {
    match frame {
        Frame::CallError(_) => Cow::Owned(frame.to_json()),
        _ => Cow::Borrowed(frame.body()),
    }
}

impl fmt::Debug for Correlator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correlator")
            .field("node_id", &self.node_id)
            .field("pending", &self.pending)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::envelope::{Request, RequestMeta};
    use crate::rpc::{CallResult, RpcErrorCode};
    use crate::types::ClearCacheStatus;
    use crate::{ocpp_action, ocpp_payload};

    ocpp_payload! {
        pub struct FlushRequest {}
    }

    ocpp_payload! {
        pub struct FlushResponse {
            mandatory status: ClearCacheStatus = "status",
        }
    }

    ocpp_action! {
        pub struct Flush = "Flush" {
            request: FlushRequest,
            response: FlushResponse,
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, Direction)>>,
        payloads: Mutex<Vec<Value>>,
    }

    impl MessageObserver for Recorder {
        fn observe(&self, action: &str, direction: Direction, payload: &Value) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((action.to_string(), direction));
            }
            if let Ok(mut payloads) = self.payloads.lock() {
                payloads.push(payload.clone());
            }
        }
    }

    fn exchange(id: &str) -> Exchange<Flush> {
        let meta = RequestMeta::to(NetworkingNodeId::from("cs01"))
            .with_request_id(id)
            .with_timeout(Duration::from_secs(30));
        Exchange::new(Request::new(meta, FlushRequest {}))
    }

    #[test]
    fn test_send_and_match_reply() {
        let recorder = Arc::new(Recorder::default());
        let mut correlator = Correlator::new(&CodecConfig::new("csms"));
        correlator.observe_with(recorder.clone());

        let mut ex = exchange("r-1");
        let now = Utc::now();
        let frame = correlator.send(&mut ex, now, &CodecHooks::none()).unwrap();
        assert_eq!(frame.action(), Some("Flush"));
        assert!(correlator.is_pending(&RequestId::from("r-1")));

        let reply = Frame::CallResult(CallResult {
            message_id: RequestId::from("r-1"),
            payload: json!({"status": "Accepted"}),
        });
        match correlator.receive(reply) {
            Inbound::Reply { pending, frame } => {
                assert_eq!(pending.action, "Flush");
                ex.receive(&frame, Default::default(), &CodecHooks::none()).unwrap();
            }
            other => panic!("Expected Reply, got {:?}", other),
        }
        assert_eq!(correlator.pending_count(), 0);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("Flush".to_string(), Direction::Outgoing),
                ("Flush".to_string(), Direction::Incoming)
            ]
        );
    }

    #[test]
    fn test_call_error_observed_as_whole_frame() {
        let recorder = Arc::new(Recorder::default());
        let mut correlator = Correlator::new(&CodecConfig::new("csms"));
        correlator.observe_with(recorder.clone());
        correlator.send(&mut exchange("r-2"), Utc::now(), &CodecHooks::none()).unwrap();

        let error = Frame::CallError(crate::rpc::CallError::new(
            RequestId::from("r-2"),
            RpcErrorCode::SecurityError,
            "bad sig",
        ));
        assert!(matches!(correlator.receive(error), Inbound::Reply { .. }));

        let payloads = recorder.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[1], json!([4, "r-2", "SecurityError", "bad sig", {}]));
    }

    #[test]
    fn test_tracing_observer_alongside_recorder() {
        let recorder = Arc::new(Recorder::default());
        let mut correlator = Correlator::new(&CodecConfig::new("csms"));
        correlator.observe_with(Arc::new(TracingObserver));
        correlator.observe_with(recorder.clone());
        assert!(format!("{:?}", correlator).contains("observers: 2"));

        let call = Frame::parse(br#"[2, "c-9", "Heartbeat", {}]"#).unwrap();
        assert!(matches!(correlator.receive(call), Inbound::Call(_)));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(*seen, vec![("Heartbeat".to_string(), Direction::Incoming)]);
    }

    #[test]
    fn test_duplicate_request_id() {
        let mut correlator = Correlator::new(&CodecConfig::default());
        let now = Utc::now();
        correlator.send(&mut exchange("dup"), now, &CodecHooks::none()).unwrap();

        let err = correlator.send(&mut exchange("dup"), now, &CodecHooks::none()).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateRequestId(_)));
    }

    #[test]
    fn test_unmatched_and_incoming_call() {
        let mut correlator = Correlator::new(&CodecConfig::default());

        let late = Frame::CallError(crate::rpc::CallError::new(
            RequestId::from("gone"),
            RpcErrorCode::GenericError,
            "late",
        ));
        assert!(matches!(correlator.receive(late), Inbound::Unmatched(_)));

        let call = Frame::parse(br#"[2, "c-1", "Heartbeat", {}]"#).unwrap();
        assert!(matches!(correlator.receive(call), Inbound::Call(_)));
    }

    #[test]
    fn test_expire() {
        let mut correlator = Correlator::new(&CodecConfig::default());
        let start = Utc::now();
        correlator.send(&mut exchange("a"), start, &CodecHooks::none()).unwrap();

        assert!(correlator.expire(start + chrono::Duration::seconds(29)).is_empty());

        let expired = correlator.expire(start + chrono::Duration::seconds(30));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].0.as_str(), "a");
        assert!(!correlator.is_pending(&RequestId::from("a")));
    }
}
