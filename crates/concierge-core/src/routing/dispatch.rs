use std::future::Future;
use std::time::Duration;

use crate::error::DispatchError;
use crate::types::ChatRequest;

use super::table::AgentEndpoint;

/// Delivers a message to a downstream agent and returns its JSON reply.
pub trait Dispatcher: Send + Sync {
    fn dispatch(
        &self,
        endpoint: &AgentEndpoint,
        message: &str,
    ) -> impl Future<Output = Result<serde_json::Value, DispatchError>> + Send;
}

/// `POST {"message": ...}` with a per-request timeout. Any 2xx with a JSON body succeeds.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDispatcher {
    #[must_use]
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        endpoint: &AgentEndpoint,
        message: &str,
    ) -> Result<serde_json::Value, DispatchError> {
        let body = ChatRequest {
            message: message.to_owned(),
        };
        let response = self
            .client
            .post(&endpoint.url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| DispatchError::Decode(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> DispatchError {
    if e.is_timeout() {
        DispatchError::Timeout
    } else {
        DispatchError::Transport(e.to_string())
    }
}
