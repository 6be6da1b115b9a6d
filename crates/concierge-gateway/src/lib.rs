//! HTTP chat endpoint and health check in front of a [`ChatService`].

mod error;
mod handlers;
mod router;
mod server;
mod service;

pub use error::{BoxError, GatewayError};
pub use server::GatewayServer;
pub use service::{ChatFuture, ChatService};
