//! Remote collection call contract shared by every serverless handler.
//!
//! Every handler accepts `{ action, data?, ..params }` and answers `{ code, msg?, data? }` where
//! `code == 0` means success. Domain failures travel inside [`CallResponse`]; only transport
//! failures become [`RemoteError`].

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Response code signalling success.
pub const CODE_OK: i64 = 0;

/// Generic failure code used by local adapters.
pub const CODE_FAILED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Request envelope sent to a serverless handler.
pub struct CallRequest {
    /// Handler-specific operation name (for example `list` or `create`).
    pub action: String,
    /// Optional record payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Additional top-level parameters such as `id` or `childId`.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl CallRequest {
    /// Creates a request with only an action.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            data: None,
            params: Map::new(),
        }
    }

    /// Attaches a record payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a top-level parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Merges every field of a JSON object into the top-level parameters.
    ///
    /// Non-object values are ignored.
    pub fn with_params(mut self, options: Value) -> Self {
        if let Value::Object(map) = options {
            self.params.extend(map);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Response envelope returned by a serverless handler.
pub struct CallResponse {
    /// `0` on success, any other value is a domain failure.
    pub code: i64,
    /// Human-readable message. Some handlers name this field `message`.
    #[serde(default, alias = "message", skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Optional result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CallResponse {
    /// Builds a successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            code: CODE_OK,
            msg: None,
            data: Some(data),
        }
    }

    /// Builds a domain failure with `code` and `msg`.
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: Some(msg.into()),
            data: None,
        }
    }

    /// Returns whether the handler reported success.
    pub const fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// Returns the message or `fallback` when the handler did not supply one.
    pub fn msg_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.msg.as_deref().unwrap_or(fallback)
    }

    /// Decodes `data` into `T`, treating a missing payload as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Decode`] when the payload does not match `T`.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, RemoteError> {
        let value = self.data.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Transport-level failures. Domain failures are reported through [`CallResponse::code`].
pub enum RemoteError {
    /// The call itself failed (network, platform SDK, missing handler).
    #[error("remote call `{function}` failed: {reason}")]
    Transport {
        /// Serverless function name.
        function: String,
        /// Adapter-provided failure description.
        reason: String,
    },
    /// A successful response carried a payload of the wrong shape.
    #[error("remote payload decode failed: {0}")]
    Decode(String),
}

/// Object-safe boxed future used by [`RemoteService`].
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that invokes named serverless functions.
pub trait RemoteService {
    /// Calls `function` with `request`.
    fn call_function<'a>(
        &'a self,
        function: &'a str,
        request: &'a CallRequest,
    ) -> RemoteFuture<'a, Result<CallResponse, RemoteError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Remote service for hosts without a backend; every call fails at the transport level.
pub struct NoopRemoteService;

impl RemoteService for NoopRemoteService {
    fn call_function<'a>(
        &'a self,
        function: &'a str,
        _request: &'a CallRequest,
    ) -> RemoteFuture<'a, Result<CallResponse, RemoteError>> {
        Box::pin(async move {
            Err(RemoteError::Transport {
                function: function.to_string(),
                reason: "no remote backend configured".to_string(),
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One call observed by [`MemoryRemoteService`].
pub struct RecordedCall {
    /// Serverless function name.
    pub function: String,
    /// Request as sent.
    pub request: CallRequest,
}

type ScriptedReply = Result<CallResponse, RemoteError>;

#[derive(Debug, Clone, Default)]
/// Scripted in-memory remote service.
///
/// Replies are queued per `(function, action)`; the last queued reply is sticky so repeated
/// calls keep answering. Unscripted calls fail with a transport error. Every call is recorded.
pub struct MemoryRemoteService {
    replies: Rc<RefCell<HashMap<(String, String), VecDeque<ScriptedReply>>>>,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

impl MemoryRemoteService {
    /// Queues a reply for `function`/`action`.
    pub fn reply(&self, function: &str, action: &str, reply: ScriptedReply) {
        self.replies
            .borrow_mut()
            .entry((function.to_string(), action.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queues a successful reply carrying `data`.
    pub fn reply_ok(&self, function: &str, action: &str, data: Value) {
        self.reply(function, action, Ok(CallResponse::ok(data)));
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Returns how many calls targeted `function`/`action`.
    pub fn call_count(&self, function: &str, action: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.function == function && call.request.action == action)
            .count()
    }

    fn next_reply(&self, function: &str, action: &str) -> ScriptedReply {
        let mut replies = self.replies.borrow_mut();
        let Some(queue) = replies.get_mut(&(function.to_string(), action.to_string())) else {
            return Err(RemoteError::Transport {
                function: function.to_string(),
                reason: format!("no scripted reply for action `{action}`"),
            });
        };
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.unwrap_or_else(|| {
            Err(RemoteError::Transport {
                function: function.to_string(),
                reason: "reply queue drained".to_string(),
            })
        })
    }
}

impl RemoteService for MemoryRemoteService {
    fn call_function<'a>(
        &'a self,
        function: &'a str,
        request: &'a CallRequest,
    ) -> RemoteFuture<'a, Result<CallResponse, RemoteError>> {
        Box::pin(async move {
            self.calls.borrow_mut().push(RecordedCall {
                function: function.to_string(),
                request: request.clone(),
            });
            self.next_reply(function, &request.action)
        })
    }
}
