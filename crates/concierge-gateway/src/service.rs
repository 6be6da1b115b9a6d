use std::future::Future;
use std::pin::Pin;

use crate::error::BoxError;

pub type ChatFuture<'a> =
    Pin<Box<dyn Future<Output = Result<serde_json::Value, BoxError>> + Send + 'a>>;

/// Anything that turns a user message into a JSON reply.
///
/// Errors are logged by the gateway and never reach the client.
pub trait ChatService: Send + Sync + 'static {
    fn chat<'a>(&'a self, message: &'a str) -> ChatFuture<'a>;

    fn name(&self) -> &str;
}
