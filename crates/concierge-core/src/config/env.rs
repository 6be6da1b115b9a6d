use super::{Config, IndexBackend};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CONCIERGE_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("CONCIERGE_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("CONCIERGE_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("CONCIERGE_INDEX_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "local" => self.index.backend = IndexBackend::Local,
                "qdrant" => self.index.backend = IndexBackend::Qdrant,
                _ => tracing::warn!("ignoring invalid CONCIERGE_INDEX_BACKEND value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("CONCIERGE_INDEX_PATH") {
            self.index.path = v;
        }
        if let Ok(v) = std::env::var("CONCIERGE_QDRANT_URL") {
            self.index.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("CONCIERGE_INDEX_COLLECTION") {
            self.index.collection = v;
        }
        if let Ok(v) = std::env::var("CONCIERGE_INDEX_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.index.top_k = k;
        }
        if let Ok(v) = std::env::var("CONCIERGE_AGENT_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.agent.port = port;
        }
        if let Ok(v) = std::env::var("CONCIERGE_ROUTER_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.router.port = port;
        }
        if let Ok(v) = std::env::var("CONCIERGE_ROUTER_MAX_RETRIES")
            && let Ok(n) = v.parse::<u32>()
        {
            self.router.max_retries = n;
        }
        if let Ok(v) = std::env::var("CONCIERGE_ROUTER_TIMEOUT_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.router.dispatch_timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("CONCIERGE_GATEWAY_RATE_LIMIT")
            && let Ok(limit) = v.parse::<u32>()
        {
            self.gateway.rate_limit = limit;
        }
    }
}
