use serde::{Deserialize, Serialize};

/// Inbound body accepted by both the router and every agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply produced by an agent, or by the router when it gives up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
}

impl AgentReply {
    #[must_use]
    pub fn with_references(response: String, references: Vec<String>) -> Self {
        Self {
            response,
            references: Some(references),
        }
    }

    #[must_use]
    pub fn fallback(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            references: None,
        }
    }
}
