use serde::{Deserialize, Serialize};

use crate::routing::{AgentEndpoint, RouteTable};
use crate::vault::Secret;

pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm having trouble understanding your request. \
If you would like to speak to a human support agent, please submit the contact form. \
Have a good day!";

pub const DEFAULT_AGENT_SYSTEM_PROMPT: &str = "You are an HR assistant. \
Answer HR-related queries based on company policy, using only the given context.";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".into()
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Embedded store persisted as JSON snapshots under `path`.
    #[default]
    Local,
    Qdrant,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,
    #[serde(default = "default_index_path")]
    pub path: String,
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_index_path() -> String {
    "./hr_vector_db".into()
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

fn default_collection() -> String {
    "hr_docs".into()
}

fn default_top_k() -> usize {
    3
}

fn default_batch_size() -> usize {
    64
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            path: default_index_path(),
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            top_k: default_top_k(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_agent_port")]
    pub port: u16,
}

fn default_agent_system_prompt() -> String {
    DEFAULT_AGENT_SYSTEM_PROMPT.into()
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_agent_port() -> u16 {
    8001
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_agent_system_prompt(),
            bind: default_bind(),
            port: default_agent_port(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RouterConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_router_port")]
    pub port: u16,
    #[serde(default = "default_routes")]
    pub routes: RouteTable,
}

fn default_max_retries() -> u32 {
    3
}

fn default_dispatch_timeout_secs() -> u64 {
    5
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.into()
}

fn default_router_port() -> u16 {
    8000
}

fn default_routes() -> RouteTable {
    RouteTable::new()
        .with_route(
            "hr_policy",
            AgentEndpoint::http_json("http://127.0.0.1:8001/chat"),
        )
        .with_route(
            "pricing",
            AgentEndpoint::http_json("https://pricing-service-url/chat"),
        )
        .with_route(
            "complaints",
            AgentEndpoint::http_json("https://complaint-service-url/chat"),
        )
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            dispatch_timeout_secs: default_dispatch_timeout_secs(),
            fallback_message: default_fallback_message(),
            bind: default_bind(),
            port: default_router_port(),
            routes: default_routes(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Requests per minute per client IP. Zero disables limiting.
    #[serde(default = "default_gateway_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
}

fn default_gateway_rate_limit() -> u32 {
    120
}

fn default_gateway_max_body() -> usize {
    1_048_576
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rate_limit: default_gateway_rate_limit(),
            max_body_size: default_gateway_max_body(),
        }
    }
}
