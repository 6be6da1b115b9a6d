use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use concierge_core::config::DEFAULT_FALLBACK_MESSAGE;
use concierge_core::retrieval::Retriever;
use concierge_core::{
    AgentEndpoint, AnswerSynthesizer, HttpDispatcher, IntentClassifier, RouteOutcome, RouteTable,
    Router,
};
use concierge_llm::mock::MockProvider;
use concierge_memory::document::{
    DOCUMENT_KEY, Document, HEADING_KEY, IngestionPipeline, SUBHEADING_KEY,
};
use concierge_memory::{InMemoryVectorStore, VectorPoint, VectorStore};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LEAVE_POLICY: &str = "## Leave Policy\n### Sick Leave\nEmployees get 10 sick days.\n";

fn classifier(response: &str, routes: &RouteTable) -> IntentClassifier<MockProvider> {
    let mut provider = MockProvider::default();
    provider.default_response = response.to_owned();
    IntentClassifier::new(Arc::new(provider), routes.labels())
}

fn dispatcher(timeout: Duration) -> HttpDispatcher {
    HttpDispatcher::new(reqwest::Client::new(), timeout)
}

#[tokio::test]
async fn leave_policy_ingests_to_one_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::default().with_default_embedding(vec![0.3, 0.7]));
    let store = Arc::new(InMemoryVectorStore::open(dir.path()).unwrap());

    let report = IngestionPipeline::new(provider, store.clone(), "hr_docs")
        .ingest(&[Document::from_text("policy.md", LEAVE_POLICY)])
        .await
        .unwrap();
    assert_eq!(report.chunks, 1);
    assert_eq!(store.count("hr_docs").await.unwrap(), 1);

    let hits = store.search("hr_docs", vec![0.3, 0.7], 5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 0);
    assert_eq!(hits[0].payload[HEADING_KEY], "## Leave Policy");
    assert_eq!(hits[0].payload[SUBHEADING_KEY], "### Sick Leave");
    assert!(
        hits[0].payload[DOCUMENT_KEY]
            .as_str()
            .unwrap()
            .contains("Employees get 10 sick days.")
    );
}

#[tokio::test]
async fn ingested_index_survives_reopen_and_answers() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(
        MockProvider::with_responses(vec!["You get 10 sick days.".into()])
            .with_default_embedding(vec![1.0, 0.0]),
    );

    {
        let store = Arc::new(InMemoryVectorStore::open(dir.path()).unwrap());
        IngestionPipeline::new(provider.clone(), store, "hr_docs")
            .ingest(&[Document::from_text("policy.md", LEAVE_POLICY)])
            .await
            .unwrap();
    }

    let reopened = Arc::new(InMemoryVectorStore::open(dir.path()).unwrap());
    let synth = AnswerSynthesizer::new(
        Retriever::new(provider.clone(), reopened, "hr_docs"),
        provider.clone(),
    );
    let reply = synth.answer("How many sick days do I get?").await.unwrap();

    assert_eq!(reply.response, "You get 10 sick days.");
    assert_eq!(reply.references.unwrap(), ["## Leave Policy"]);
    let prompt = &provider.recorded()[0][1].content;
    assert!(prompt.starts_with(
        "Context:\n## Leave Policy - ### Sick Leave:\n## Leave Policy\n### Sick Leave\nEmployees get 10 sick days."
    ));
    assert!(prompt.ends_with("User Query: How many sick days do I get?"));
}

#[tokio::test]
async fn nearest_chunk_heading_is_the_only_reference() {
    let provider = Arc::new(MockProvider::default().with_default_embedding(vec![0.0, 1.0]));
    let store = Arc::new(InMemoryVectorStore::new());
    store.ensure_collection("hr_docs", 2).await.unwrap();
    store
        .upsert(
            "hr_docs",
            vec![VectorPoint {
                id: 0,
                vector: vec![0.0, 1.0],
                payload: HashMap::from([
                    (HEADING_KEY.to_owned(), "Leave Policy".into()),
                    (SUBHEADING_KEY.to_owned(), "Sick Leave".into()),
                    (DOCUMENT_KEY.to_owned(), "Employees get 10 sick days.".into()),
                ]),
            }],
        )
        .await
        .unwrap();

    let synth = AnswerSynthesizer::new(
        Retriever::new(provider.clone(), store, "hr_docs"),
        provider,
    )
    .with_top_k(1);
    let reply = synth.answer("sick days?").await.unwrap();
    assert_eq!(reply.references.unwrap(), ["Leave Policy"]);
}

#[tokio::test]
async fn router_returns_agent_body_verbatim() {
    let agent = MockServer::start().await;
    let body = json!({"response": "You get 10 sick days.", "references": ["## Leave Policy"]});
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"message": "sick days?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&agent)
        .await;

    let routes = RouteTable::new()
        .with_route(
            "hr_policy",
            AgentEndpoint::http_json(format!("{}/chat", agent.uri())),
        )
        .with_route("pricing", AgentEndpoint::http_json("http://127.0.0.1:1/chat"));
    let router = Router::new(
        classifier("hr_policy", &routes),
        dispatcher(Duration::from_secs(2)),
        routes,
    );

    let (outcome, trace) = router.route_outcome("sick days?").await;
    assert_eq!(outcome, RouteOutcome::Succeeded(body));
    assert_eq!(trace.classifications, 1);
    assert_eq!(trace.dispatches, 1);
}

#[tokio::test]
async fn router_falls_back_when_intent_is_unknown() {
    let agent = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "x"})))
        .expect(0)
        .mount(&agent)
        .await;

    let routes =
        RouteTable::new().with_route("hr_policy", AgentEndpoint::http_json(agent.uri()));
    let router = Router::new(
        classifier("unknown", &routes),
        dispatcher(Duration::from_secs(2)),
        routes,
    );

    let (outcome, trace) = router.route_outcome("what's the weather?").await;
    assert_eq!(outcome, RouteOutcome::Exhausted);
    assert_eq!(trace.classifications, 3);
    assert_eq!(trace.dispatches, 0);
    assert_eq!(
        router.route("what's the weather?").await,
        json!({"response": DEFAULT_FALLBACK_MESSAGE})
    );
}

#[tokio::test]
async fn router_falls_back_when_agent_times_out() {
    let agent = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late"}))
                .set_delay(Duration::from_millis(400)),
        )
        .expect(3)
        .mount(&agent)
        .await;

    let routes =
        RouteTable::new().with_route("hr_policy", AgentEndpoint::http_json(agent.uri()));
    let router = Router::new(
        classifier("hr_policy", &routes),
        dispatcher(Duration::from_millis(50)),
        routes,
    );

    let (outcome, trace) = router.route_outcome("sick days?").await;
    assert_eq!(outcome, RouteOutcome::Exhausted);
    assert_eq!(trace.classifications, 3);
    assert_eq!(trace.dispatches, 3);
}

#[tokio::test]
async fn router_retries_past_server_errors() {
    let agent = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&agent)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "third time"})))
        .mount(&agent)
        .await;

    let routes =
        RouteTable::new().with_route("hr_policy", AgentEndpoint::http_json(agent.uri()));
    let router = Router::new(
        classifier("hr_policy", &routes),
        dispatcher(Duration::from_secs(2)),
        routes,
    );

    assert_eq!(
        router.route("sick days?").await,
        json!({"response": "third time"})
    );
}
