//! Thin logging wrapper over the host remote service.

use std::rc::Rc;

use household_host::{CallRequest, CallResponse, RemoteError, RemoteService};
use serde_json::Value;

#[derive(Clone)]
/// Issues serverless calls and logs transport failures before propagating them.
pub struct ApiClient {
    remote: Rc<dyn RemoteService>,
}

impl ApiClient {
    /// Creates a client over `remote`.
    pub fn new(remote: Rc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    /// Calls `function` with `request`.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged. Domain failures arrive as `Ok` responses with a
    /// non-zero code.
    pub async fn call(
        &self,
        function: &str,
        request: CallRequest,
    ) -> Result<CallResponse, RemoteError> {
        match self.remote.call_function(function, &request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                leptos::logging::error!("call `{function}.{}` failed: {err}", request.action);
                Err(err)
            }
        }
    }

    /// Calls `function` with a bare `action`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn action(&self, function: &str, action: &str) -> Result<CallResponse, RemoteError> {
        self.call(function, CallRequest::new(action)).await
    }

    /// Calls `function` with `action` and a record payload.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn action_with_data(
        &self,
        function: &str,
        action: &str,
        data: Value,
    ) -> Result<CallResponse, RemoteError> {
        self.call(function, CallRequest::new(action).with_data(data))
            .await
    }
}

/// Decodes a list payload. A missing or `null` payload is an empty list.
///
/// # Errors
///
/// Returns [`RemoteError::Decode`] when the payload is not a list of `T`.
pub fn decode_list<T: serde::de::DeserializeOwned>(
    response: &CallResponse,
) -> Result<Vec<T>, RemoteError> {
    match &response.data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(_) => response.decode_data(),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use household_host::{MemoryRemoteService, NoopRemoteService};
    use serde_json::json;

    use super::*;

    #[test]
    fn call_passes_responses_through() {
        let remote = MemoryRemoteService::default();
        remote.reply(
            "manageRewards",
            "list",
            Ok(CallResponse::failure(-1, "获取奖励列表失败")),
        );
        let client = ApiClient::new(Rc::new(remote));

        let response = block_on(client.action("manageRewards", "list")).expect("response");
        assert!(!response.is_ok());
        assert_eq!(response.msg_or(""), "获取奖励列表失败");
    }

    #[test]
    fn transport_errors_propagate() {
        let client = ApiClient::new(Rc::new(NoopRemoteService));
        let err = block_on(client.action("manageTasks", "list")).expect_err("transport");
        assert!(matches!(err, RemoteError::Transport { .. }));
    }

    #[test]
    fn decode_list_treats_missing_payload_as_empty() {
        let empty = CallResponse {
            code: 0,
            msg: None,
            data: None,
        };
        assert_eq!(decode_list::<u8>(&empty).expect("empty"), Vec::<u8>::new());
        assert_eq!(
            decode_list::<u8>(&CallResponse::ok(json!([1, 2]))).expect("list"),
            vec![1, 2]
        );
        assert!(decode_list::<u8>(&CallResponse::ok(json!({"a": 1}))).is_err());
    }
}
