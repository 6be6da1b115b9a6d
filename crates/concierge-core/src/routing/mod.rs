//! Intent-based routing of messages to downstream agents.

mod dispatch;
mod router;
mod table;

pub use dispatch::{Dispatcher, HttpDispatcher};
pub use router::{RouteOutcome, RouteState, RouteTrace, Router};
pub use table::{AgentEndpoint, Protocol, RouteTable};
