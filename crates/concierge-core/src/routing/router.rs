use crate::config::DEFAULT_FALLBACK_MESSAGE;
use crate::error::{ClassificationError, DispatchError};
use crate::intent::{Classifier, IntentLabel};

use super::dispatch::Dispatcher;
use super::table::{AgentEndpoint, RouteTable};

/// Per-message routing state.
///
/// `attempt` counts failed attempts so far. Every failure, whether an unroutable label or a
/// failed dispatch, moves through `Retrying`, which either loops back to `Classifying` or
/// ends in `Exhausted` once the budget is spent.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteState {
    Classifying {
        attempt: u32,
    },
    Dispatching {
        attempt: u32,
        label: String,
        endpoint: AgentEndpoint,
    },
    Retrying {
        attempt: u32,
    },
    Succeeded(serde_json::Value),
    Exhausted,
}

impl RouteState {
    #[must_use]
    pub fn initial(max_retries: u32) -> Self {
        if max_retries == 0 {
            Self::Exhausted
        } else {
            Self::Classifying { attempt: 0 }
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Exhausted)
    }

    /// `Classifying` → `Dispatching` for a routable label, otherwise `Retrying`.
    #[must_use]
    pub fn on_classified(
        attempt: u32,
        result: Result<IntentLabel, ClassificationError>,
        routes: &RouteTable,
    ) -> Self {
        let label = result.unwrap_or(IntentLabel::Unknown);
        match label {
            IntentLabel::Known(label) => match routes.get(&label) {
                Some(endpoint) => Self::Dispatching {
                    attempt,
                    endpoint: endpoint.clone(),
                    label,
                },
                None => Self::Retrying {
                    attempt: attempt + 1,
                },
            },
            IntentLabel::Unknown => Self::Retrying {
                attempt: attempt + 1,
            },
        }
    }

    /// `Dispatching` → `Succeeded` or `Retrying`.
    #[must_use]
    pub fn on_dispatched(attempt: u32, result: Result<serde_json::Value, DispatchError>) -> Self {
        match result {
            Ok(body) => Self::Succeeded(body),
            Err(_) => Self::Retrying {
                attempt: attempt + 1,
            },
        }
    }

    /// `Retrying` → `Classifying` while budget remains, else `Exhausted`.
    #[must_use]
    pub fn after_retry(attempt: u32, max_retries: u32) -> Self {
        if attempt < max_retries {
            Self::Classifying { attempt }
        } else {
            Self::Exhausted
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Remote agent reply, unchanged.
    Succeeded(serde_json::Value),
    Exhausted,
}

/// How many calls a routing run made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteTrace {
    pub classifications: u32,
    pub dispatches: u32,
}

pub struct Router<C: Classifier, D: Dispatcher> {
    classifier: C,
    dispatcher: D,
    routes: RouteTable,
    max_retries: u32,
    fallback_message: String,
}

impl<C: Classifier, D: Dispatcher> Router<C, D> {
    pub fn new(classifier: C, dispatcher: D, routes: RouteTable) -> Self {
        Self {
            classifier,
            dispatcher,
            routes,
            max_retries: 3,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.into(),
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Perform the side effect of `state` and return the next state.
    ///
    /// Terminal states are returned unchanged.
    pub async fn advance(&self, state: RouteState, message: &str, trace: &mut RouteTrace) -> RouteState {
        match state {
            RouteState::Classifying { attempt } => {
                trace.classifications += 1;
                let result = self.classifier.classify(message).await;
                match &result {
                    Ok(label) => tracing::debug!(attempt, label = %label, "classified"),
                    Err(e) => tracing::warn!(attempt, error = %e, "classification failed"),
                }
                let next = RouteState::on_classified(attempt, result, &self.routes);
                if matches!(next, RouteState::Retrying { .. }) {
                    tracing::info!(attempt, "no route for message");
                }
                next
            }
            RouteState::Dispatching {
                attempt,
                label,
                endpoint,
            } => {
                trace.dispatches += 1;
                tracing::info!(attempt, %label, url = %endpoint.url, "dispatching");
                let result = self.dispatcher.dispatch(&endpoint, message).await;
                if let Err(e) = &result {
                    tracing::warn!(attempt, %label, error = %e, "dispatch failed");
                }
                RouteState::on_dispatched(attempt, result)
            }
            RouteState::Retrying { attempt } => RouteState::after_retry(attempt, self.max_retries),
            terminal @ (RouteState::Succeeded(_) | RouteState::Exhausted) => terminal,
        }
    }

    /// Run the state machine to completion.
    pub async fn route_outcome(&self, message: &str) -> (RouteOutcome, RouteTrace) {
        let mut trace = RouteTrace::default();
        let mut state = RouteState::initial(self.max_retries);
        while !state.is_terminal() {
            state = self.advance(state, message, &mut trace).await;
        }

        let outcome = match state {
            RouteState::Succeeded(body) => RouteOutcome::Succeeded(body),
            _ => {
                tracing::warn!(
                    classifications = trace.classifications,
                    dispatches = trace.dispatches,
                    "routing attempts exhausted"
                );
                RouteOutcome::Exhausted
            }
        };
        (outcome, trace)
    }

    /// Reply for `message`: the agent's body verbatim, or `{"response": <fallback>}`.
    pub async fn route(&self, message: &str) -> serde_json::Value {
        match self.route_outcome(message).await.0 {
            RouteOutcome::Succeeded(body) => body,
            RouteOutcome::Exhausted => serde_json::json!({ "response": self.fallback_message }),
        }
    }
}
