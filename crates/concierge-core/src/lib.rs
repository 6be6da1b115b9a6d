//! Policy question answering and intent routing.

pub mod answer;
pub mod config;
pub mod error;
pub mod intent;
pub mod retrieval;
pub mod routing;
pub mod types;
pub mod vault;

pub use answer::AnswerSynthesizer;
pub use error::{AnswerError, ClassificationError, ConfigError, DispatchError, RetrievalError};
pub use intent::{Classifier, IntentClassifier, IntentLabel};
pub use retrieval::{ChunkMetadata, RetrievalResult, RetrievedChunk, Retriever};
pub use routing::{AgentEndpoint, Dispatcher, HttpDispatcher, RouteOutcome, RouteTable, Router};
pub use types::AgentReply;
