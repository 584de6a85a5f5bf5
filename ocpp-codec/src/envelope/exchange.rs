//! Per-exchange state machine
//!
//! ```text
//! Created ──mark_sent──▶ Sent ──complete/receive──▶ ResponseReceived | ErrorReceived
//!                          └─────time_out─────────▶ TimedOut
//! ```
//!
//! Terminal states accept nothing further. A retry is a new request with a
//! new id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Action, Request, Response, ResponseMeta};
use crate::codec::CodecHooks;
use crate::result::{OcppResult, ResultCode};
use crate::rpc::Frame;
use crate::types::RequestId;

/// Lifecycle state of one request/response exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeState {
    /// Built, not yet handed to the transport
    Created,
    /// Sent, awaiting a reply
    Sent,
    /// Reply received with a successful result
    ResponseReceived,
    /// Reply received with an error result
    ErrorReceived,
    /// No reply within the request timeout
    TimedOut,
}

impl ExchangeState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExchangeState::ResponseReceived | ExchangeState::ErrorReceived | ExchangeState::TimedOut
        )
    }
}

/// Errors in driving an exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("cannot {event} in state {from:?}")]
    InvalidTransition {
        from: ExchangeState,
        event: &'static str,
    },

    #[error("reply for {found} does not belong to request {expected}")]
    RequestMismatch { expected: RequestId, found: RequestId },

    #[error("a CALL frame is not a reply")]
    NotAReply,
}

/// One request and, eventually, its response.
#[derive(Debug)]
pub struct Exchange<A: Action> {
    request: Arc<Request<A>>,
    state: ExchangeState,
    sent_at: Option<DateTime<Utc>>,
    response: Option<Response<A>>,
}

impl<A: Action> Exchange<A> {
    pub fn new(request: Request<A>) -> Self {
        Self {
            request: Arc::new(request),
            state: ExchangeState::Created,
            sent_at: None,
            response: None,
        }
    }

    pub fn request(&self) -> &Arc<Request<A>> {
        &self.request
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn response(&self) -> Option<&Response<A>> {
        self.response.as_ref()
    }

    fn expect_state(
        &self,
        expected: ExchangeState,
        event: &'static str,
    ) -> Result<(), ExchangeError> {
        if self.state != expected {
            return Err(ExchangeError::InvalidTransition {
                from: self.state,
                event,
            });
        }
        Ok(())
    }

    /// Record the hand-over to the transport.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) -> Result<(), ExchangeError> {
        self.expect_state(ExchangeState::Created, "send")?;
        self.state = ExchangeState::Sent;
        self.sent_at = Some(at);
        debug!("{} {} sent", A::NAME, self.request.request_id());
        Ok(())
    }

    /// Whether the request timeout has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.state, self.sent_at) {
            (ExchangeState::Sent, Some(sent_at)) => (now - sent_at)
                .to_std()
                .map(|elapsed| elapsed >= self.request.envelope().request_timeout)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Accept the response for this exchange.
    pub fn complete(&mut self, response: Response<A>) -> Result<&Response<A>, ExchangeError> {
        self.expect_state(ExchangeState::Sent, "complete")?;

        let found = response.request().request_id();
        if found != self.request.request_id() {
            return Err(ExchangeError::RequestMismatch {
                expected: self.request.request_id().clone(),
                found: found.clone(),
            });
        }

        self.state = if response.is_ok() {
            info!("{} {} completed", A::NAME, self.request.request_id());
            ExchangeState::ResponseReceived
        } else {
            warn!("{} {} failed: {}", A::NAME, self.request.request_id(), response.result());
            ExchangeState::ErrorReceived
        };
        Ok(&*self.response.insert(response))
    }

    /// Give up waiting; the response records a `Timeout` result.
    pub fn time_out(&mut self) -> Result<&Response<A>, ExchangeError> {
        self.expect_state(ExchangeState::Sent, "time out")?;

        let timeout = self.request.envelope().request_timeout;
        warn!("{} {} timed out after {:?}", A::NAME, self.request.request_id(), timeout);

        let response = Response::request_error(
            self.request.clone(),
            ResultCode::Timeout,
            format!("no response within {:?}", timeout),
        );
        self.state = ExchangeState::TimedOut;
        Ok(&*self.response.insert(response))
    }

    /// Turn a reply frame into the typed response and complete the exchange.
    ///
    /// A CALLRESULT that fails to parse completes the exchange with a
    /// `FormationViolation` response rather than an error.
    pub fn receive(
        &mut self,
        frame: &Frame,
        meta: ResponseMeta,
        hooks: &CodecHooks,
    ) -> Result<&Response<A>, ExchangeError> {
        self.expect_state(ExchangeState::Sent, "receive")?;
        if frame.message_id() != self.request.request_id() {
            return Err(ExchangeError::RequestMismatch {
                expected: self.request.request_id().clone(),
                found: frame.message_id().clone(),
            });
        }

        let response = match frame {
            Frame::Call(_) => return Err(ExchangeError::NotAReply),
            Frame::CallResult(result) => {
                let request = self.request.clone();
                match Response::try_parse(request, &result.payload, meta.clone(), hooks) {
                    Ok(response) => response,
                    Err(e) => {
                        Response::failed(self.request.clone(), OcppResult::from_parse_error(&e))
                    }
                }
            }
            Frame::CallError(error) => Response::from_call_error(
                self.request.clone(),
                error.error_code,
                error.error_description.clone(),
                error.error_details.clone(),
            ),
        };

        self.complete(response.with_meta(meta))
    }
}
