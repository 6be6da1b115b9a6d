use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wire protocol spoken by a downstream agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// `POST {"message": ...}` answered with a JSON body.
    #[default]
    HttpJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpoint {
    pub url: String,
    #[serde(default)]
    pub protocol: Protocol,
}

impl AgentEndpoint {
    #[must_use]
    pub fn http_json(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocol: Protocol::HttpJson,
        }
    }
}

/// Read-only mapping from intent label to the agent that handles it.
///
/// Backed by a `BTreeMap` so label iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable(BTreeMap<String, AgentEndpoint>);

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_route(mut self, label: impl Into<String>, endpoint: AgentEndpoint) -> Self {
        self.0.insert(label.into(), endpoint);
        self
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&AgentEndpoint> {
        self.0.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AgentEndpoint)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AgentEndpoint)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (String, AgentEndpoint)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_sorted() {
        let table = RouteTable::new()
            .with_route("pricing", AgentEndpoint::http_json("http://p"))
            .with_route("complaints", AgentEndpoint::http_json("http://c"))
            .with_route("hr_policy", AgentEndpoint::http_json("http://h"));
        let labels: Vec<_> = table.labels().collect();
        assert_eq!(labels, ["complaints", "hr_policy", "pricing"]);
    }

    #[test]
    fn lookup_is_exact() {
        let table = RouteTable::new().with_route("hr_policy", AgentEndpoint::http_json("http://h"));
        assert!(table.get("hr_policy").is_some());
        assert!(table.get("HR_POLICY").is_none());
        assert!(table.get("unknown").is_none());
    }

    #[test]
    fn deserializes_with_default_protocol() {
        let table: RouteTable = toml::from_str(
            r#"
            hr_policy = { url = "http://127.0.0.1:8001/chat" }
            pricing = { url = "http://127.0.0.1:8002/chat", protocol = "http_json" }
            "#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("hr_policy").unwrap().protocol, Protocol::HttpJson);
    }
}
