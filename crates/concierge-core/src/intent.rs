use std::fmt;
use std::future::Future;
use std::sync::Arc;

use concierge_llm::{LlmProvider, Message};

use crate::error::ClassificationError;

pub const UNKNOWN_LABEL: &str = "unknown";

/// Outcome of classifying a message. `Unknown` never routes anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentLabel {
    Known(String),
    Unknown,
}

impl IntentLabel {
    /// Trim the raw model output; empty or `unknown` (any case) become [`IntentLabel::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let label = raw.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(UNKNOWN_LABEL) {
            Self::Unknown
        } else {
            Self::Known(label.to_owned())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(label) => label,
            Self::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        message: &str,
    ) -> impl Future<Output = Result<IntentLabel, ClassificationError>> + Send;
}

/// Labels messages with a single chat call against a fixed taxonomy prompt.
pub struct IntentClassifier<P: LlmProvider> {
    provider: Arc<P>,
    system_prompt: String,
}

impl<P: LlmProvider> IntentClassifier<P> {
    pub fn new<'a>(provider: Arc<P>, labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            provider,
            system_prompt: taxonomy_prompt(labels),
        }
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

/// `"Classify the user's request into one of: 'a', 'b'. If unsure, return 'unknown'."`
#[must_use]
pub fn taxonomy_prompt<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    let quoted = labels
        .into_iter()
        .map(|l| format!("'{l}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Classify the user's request into one of: {quoted}. If unsure, return '{UNKNOWN_LABEL}'."
    )
}

impl<P: LlmProvider> Classifier for IntentClassifier<P> {
    async fn classify(&self, message: &str) -> Result<IntentLabel, ClassificationError> {
        let messages = [
            Message::system(self.system_prompt.clone()),
            Message::user(message),
        ];
        let raw = self.provider.chat(&messages).await?;
        if raw.trim().is_empty() {
            return Err(ClassificationError::Empty);
        }
        let label = IntentLabel::parse(&raw);
        tracing::debug!(label = %label, "classified message");
        Ok(label)
    }
}
