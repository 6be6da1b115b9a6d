use concierge_core::{AnswerSynthesizer, Classifier, Dispatcher, Router};
use concierge_gateway::{ChatFuture, ChatService};
use concierge_llm::LlmProvider;

/// HR policy agent served over `POST /chat`.
pub struct PolicyAgentService<P: LlmProvider> {
    synthesizer: AnswerSynthesizer<P>,
}

impl<P: LlmProvider> PolicyAgentService<P> {
    pub fn new(synthesizer: AnswerSynthesizer<P>) -> Self {
        Self { synthesizer }
    }
}

impl<P: LlmProvider + 'static> ChatService for PolicyAgentService<P> {
    fn chat<'a>(&'a self, message: &'a str) -> ChatFuture<'a> {
        Box::pin(async move {
            let reply = self.synthesizer.answer(message).await?;
            Ok(serde_json::to_value(reply)?)
        })
    }

    fn name(&self) -> &str {
        "hr_policy"
    }
}

/// Intent router served over `POST /chat`. Never fails: exhaustion yields the fallback reply.
pub struct RouterService<C: Classifier, D: Dispatcher> {
    router: Router<C, D>,
}

impl<C: Classifier, D: Dispatcher> RouterService<C, D> {
    pub fn new(router: Router<C, D>) -> Self {
        Self { router }
    }
}

impl<C: Classifier + 'static, D: Dispatcher + 'static> ChatService for RouterService<C, D> {
    fn chat<'a>(&'a self, message: &'a str) -> ChatFuture<'a> {
        Box::pin(async move { Ok(self.router.route(message).await) })
    }

    fn name(&self) -> &str {
        "router"
    }
}
