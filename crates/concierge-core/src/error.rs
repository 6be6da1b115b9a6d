use concierge_llm::LlmError;
use concierge_memory::VectorStoreError;

/// Startup configuration problems. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required secret {0}")]
    MissingSecret(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding service failed: {0}")]
    Embedding(#[source] LlmError),

    #[error("vector index unavailable: {0}")]
    IndexUnavailable(#[source] VectorStoreError),

    #[error("stored point {id} has no string field {field}")]
    MalformedPayload { id: u64, field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("chat service failed: {0}")]
    Chat(#[source] LlmError),
}

#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("chat service failed: {0}")]
    Chat(#[from] LlmError),

    #[error("classifier returned an empty label")]
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("agent request timed out")]
    Timeout,

    #[error("agent transport failed: {0}")]
    Transport(String),

    #[error("agent returned status {0}")]
    Status(u16),

    #[error("agent returned an undecodable body: {0}")]
    Decode(String),
}
