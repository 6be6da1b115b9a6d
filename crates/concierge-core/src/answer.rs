//! Retrieval-augmented answers for the HR policy agent.

use std::sync::Arc;

use concierge_llm::{LlmProvider, Message};

use crate::config::DEFAULT_AGENT_SYSTEM_PROMPT;
use crate::error::AnswerError;
use crate::retrieval::{DEFAULT_TOP_K, RetrievalResult, Retriever};
use crate::types::AgentReply;

pub struct AnswerSynthesizer<P: LlmProvider> {
    retriever: Retriever<P>,
    provider: Arc<P>,
    system_prompt: String,
    top_k: usize,
}

impl<P: LlmProvider> AnswerSynthesizer<P> {
    pub fn new(retriever: Retriever<P>, provider: Arc<P>) -> Self {
        Self {
            retriever,
            provider,
            system_prompt: DEFAULT_AGENT_SYSTEM_PROMPT.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer `message` from the indexed policy text.
    ///
    /// An empty retrieval still reaches the model with an empty context.
    ///
    /// # Errors
    ///
    /// Returns [`AnswerError::Retrieval`] or [`AnswerError::Chat`]; neither is retried here.
    pub async fn answer(&self, message: &str) -> Result<AgentReply, AnswerError> {
        let retrieved = self.retriever.retrieve(message, self.top_k).await?;
        let messages = build_messages(&self.system_prompt, &retrieved, message);

        let response = self
            .provider
            .chat(&messages)
            .await
            .map_err(AnswerError::Chat)?;

        tracing::info!(chunks = retrieved.len(), "answered policy question");
        Ok(AgentReply::with_references(response, retrieved.headings()))
    }
}

/// Render hits as `"{heading} - {subheading}:\n{document}"` blocks separated by a blank line.
#[must_use]
pub fn build_context(retrieved: &RetrievalResult) -> String {
    retrieved
        .iter()
        .map(|hit| {
            format!(
                "{} - {}:\n{}",
                hit.metadata.heading, hit.metadata.subheading, hit.document
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_messages(system_prompt: &str, retrieved: &RetrievalResult, message: &str) -> Vec<Message> {
    let context = build_context(retrieved);
    vec![
        Message::system(system_prompt),
        Message::user(format!("Context:\n{context}\n\nUser Query: {message}")),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use concierge_llm::Role;
    use concierge_llm::mock::MockProvider;
    use concierge_memory::document::{DOCUMENT_KEY, HEADING_KEY, SUBHEADING_KEY};
    use concierge_memory::{InMemoryVectorStore, VectorPoint, VectorStore};

    use super::*;
    use crate::retrieval::{ChunkMetadata, RetrievedChunk};

    fn hit(heading: &str, subheading: &str, document: &str) -> RetrievedChunk {
        RetrievedChunk {
            document: document.into(),
            metadata: ChunkMetadata {
                heading: heading.into(),
                subheading: subheading.into(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn context_blocks_in_retrieval_order() {
        let retrieved = RetrievalResult {
            hits: vec![
                hit("## Leave", "### Sick", "10 days"),
                hit("## Pay", "Miscellaneous", "monthly"),
            ],
        };
        assert_eq!(
            build_context(&retrieved),
            "## Leave - ### Sick:\n10 days\n\n## Pay - Miscellaneous:\nmonthly"
        );
    }

    #[test]
    fn empty_retrieval_gives_empty_context() {
        let messages = build_messages("sys", &RetrievalResult::default(), "hello?");
        assert_eq!(messages[1].content, "Context:\n\n\nUser Query: hello?");
    }

    async fn store_with(points: Vec<VectorPoint>) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("hr_docs", 2).await.unwrap();
        if !points.is_empty() {
            store.upsert("hr_docs", points).await.unwrap();
        }
        store
    }

    fn point(id: u64, vector: Vec<f32>, heading: &str) -> VectorPoint {
        VectorPoint {
            id,
            vector,
            payload: HashMap::from([
                (HEADING_KEY.to_owned(), heading.into()),
                (SUBHEADING_KEY.to_owned(), "Miscellaneous".into()),
                (DOCUMENT_KEY.to_owned(), format!("text under {heading}").into()),
            ]),
        }
    }

    #[tokio::test]
    async fn answer_returns_response_and_headings_with_duplicates() {
        let provider = Arc::new(
            MockProvider::with_responses(vec!["You get 10 sick days.".into()])
                .with_default_embedding(vec![1.0, 0.0]),
        );
        let store = store_with(vec![
            point(0, vec![1.0, 0.0], "Leave Policy"),
            point(1, vec![1.0, 0.1], "Leave Policy"),
            point(2, vec![0.0, 1.0], "Payroll"),
        ])
        .await;
        let synth = AnswerSynthesizer::new(
            Retriever::new(provider.clone(), store, "hr_docs"),
            provider.clone(),
        );

        let reply = synth.answer("sick days?").await.unwrap();
        assert_eq!(reply.response, "You get 10 sick days.");
        assert_eq!(
            reply.references.unwrap(),
            ["Leave Policy", "Leave Policy", "Payroll"]
        );
        assert_eq!(provider.chat_calls(), 1);
    }

    #[tokio::test]
    async fn prompt_uses_system_instruction_and_query() {
        let provider = Arc::new(MockProvider::default().with_default_embedding(vec![1.0, 0.0]));
        let store = store_with(vec![point(0, vec![1.0, 0.0], "Leave Policy")]).await;
        let synth = AnswerSynthesizer::new(
            Retriever::new(provider.clone(), store, "hr_docs"),
            provider.clone(),
        )
        .with_system_prompt("be brief");

        synth.answer("vacation?").await.unwrap();
        let recorded = provider.recorded();
        let messages = &recorded[0];
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "be brief");
        assert_eq!(
            messages[1].content,
            "Context:\nLeave Policy - Miscellaneous:\ntext under Leave Policy\n\nUser Query: vacation?"
        );
    }

    #[tokio::test]
    async fn default_prompt_restricts_to_context() {
        let provider = Arc::new(MockProvider::default().with_default_embedding(vec![1.0, 0.0]));
        let store = store_with(vec![point(0, vec![1.0, 0.0], "Leave Policy")]).await;
        AnswerSynthesizer::new(
            Retriever::new(provider.clone(), store, "hr_docs"),
            provider.clone(),
        )
        .answer("vacation?")
        .await
        .unwrap();

        let system = &provider.recorded()[0][0].content;
        assert_eq!(system, DEFAULT_AGENT_SYSTEM_PROMPT);
        assert!(system.contains("using only the given context"));
    }

    #[tokio::test]
    async fn empty_index_still_calls_model() {
        let provider = Arc::new(MockProvider::default());
        let store = store_with(Vec::new()).await;
        let synth = AnswerSynthesizer::new(
            Retriever::new(provider.clone(), store, "hr_docs"),
            provider.clone(),
        );

        let reply = synth.answer("anything").await.unwrap();
        assert_eq!(reply.references, Some(Vec::new()));
        assert_eq!(provider.chat_calls(), 1);
    }

    #[tokio::test]
    async fn chat_failure_is_chat_error() {
        let mut mock = MockProvider::default().with_default_embedding(vec![1.0, 0.0]);
        mock.fail_chat = true;
        let provider = Arc::new(mock);
        let store = store_with(vec![point(0, vec![1.0, 0.0], "Leave Policy")]).await;
        let synth = AnswerSynthesizer::new(
            Retriever::new(provider.clone(), store, "hr_docs"),
            provider,
        );
        assert!(matches!(
            synth.answer("q").await,
            Err(AnswerError::Chat(_))
        ));
    }

    #[tokio::test]
    async fn retrieval_failure_skips_chat() {
        let provider = Arc::new(MockProvider::failing());
        let store = store_with(Vec::new()).await;
        let synth = AnswerSynthesizer::new(
            Retriever::new(provider.clone(), store, "hr_docs"),
            provider.clone(),
        );
        assert!(matches!(
            synth.answer("q").await,
            Err(AnswerError::Retrieval(_))
        ));
        assert_eq!(provider.chat_calls(), 0);
    }
}
