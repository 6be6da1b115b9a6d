mod cli;
mod services;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use concierge_core::config::{Config, IndexBackend};
use concierge_core::retrieval::Retriever;
use concierge_core::vault::EnvVaultProvider;
use concierge_core::{AnswerSynthesizer, Classifier, HttpDispatcher, IntentClassifier, Router};
use concierge_gateway::{ChatService, GatewayServer};
use concierge_llm::openai::OpenAiProvider;
use concierge_memory::document::IngestionPipeline;
use concierge_memory::{InMemoryVectorStore, QdrantStore, VectorStore};
use tokio::sync::watch;

use crate::cli::{Cli, Command};
use crate::services::{PolicyAgentService, RouterService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    config.validate()?;
    config.resolve_secrets(&EnvVaultProvider).await?;

    match cli.command {
        Command::Ingest { files, recreate } => ingest(&config, &files, recreate).await,
        Command::Agent => serve_agent(&config).await,
        Command::Router => serve_router(&config).await,
        Command::Ask { message } => ask(&config, &message).await,
        Command::Classify { message } => classify(&config, &message).await,
    }
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_provider(config: &Config) -> anyhow::Result<Arc<OpenAiProvider>> {
    let api_key = config.openai_api_key()?;
    let provider = OpenAiProvider::new(
        api_key.expose().to_owned(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.max_tokens,
        Some(config.llm.embedding_model.clone()),
    )
    .context("failed to build OpenAI provider")?;
    Ok(Arc::new(provider))
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.index.backend {
        IndexBackend::Local => Arc::new(
            InMemoryVectorStore::open(&config.index.path)
                .with_context(|| format!("failed to open index at {}", config.index.path))?,
        ),
        IndexBackend::Qdrant => Arc::new(
            QdrantStore::new(&config.index.qdrant_url)
                .with_context(|| format!("failed to connect to {}", config.index.qdrant_url))?,
        ),
    };
    Ok(store)
}

fn build_synthesizer(
    config: &Config,
    store: Arc<dyn VectorStore>,
) -> anyhow::Result<AnswerSynthesizer<OpenAiProvider>> {
    let provider = create_provider(config)?;
    let retriever = Retriever::new(provider.clone(), store, config.index.collection.clone());
    Ok(AnswerSynthesizer::new(retriever, provider)
        .with_system_prompt(config.agent.system_prompt.clone())
        .with_top_k(config.index.top_k))
}

async fn ingest(config: &Config, files: &[std::path::PathBuf], recreate: bool) -> anyhow::Result<()> {
    let provider = create_provider(config)?;
    let store = open_store(config)?;
    let pipeline = IngestionPipeline::new(provider, store, config.index.collection.clone())
        .with_batch_size(config.index.batch_size)
        .with_recreate(recreate);

    let report = pipeline.load_and_ingest(files).await?;
    println!(
        "ingested {} document(s) into {} chunk(s) in collection {}",
        report.documents, report.chunks, config.index.collection
    );
    Ok(())
}

async fn ask(config: &Config, message: &str) -> anyhow::Result<()> {
    let reply = build_synthesizer(config, open_store(config)?)?
        .answer(message)
        .await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn classify(config: &Config, message: &str) -> anyhow::Result<()> {
    let classifier = IntentClassifier::new(create_provider(config)?, config.router.routes.labels());
    let label = match classifier.classify(message).await {
        Ok(label) => label,
        Err(e) => {
            tracing::warn!(error = %e, "classification failed");
            concierge_core::IntentLabel::Unknown
        }
    };
    println!("{label}");
    Ok(())
}

async fn require_collection(store: &dyn VectorStore, collection: &str) -> anyhow::Result<()> {
    if !store.collection_exists(collection).await? {
        anyhow::bail!("collection {collection} not found; run `concierge ingest` first");
    }
    Ok(())
}

async fn serve_agent(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    require_collection(store.as_ref(), &config.index.collection).await?;

    let synthesizer = build_synthesizer(config, store)?;
    let service: Arc<dyn ChatService> = Arc::new(PolicyAgentService::new(synthesizer));
    serve(config, &config.agent.bind, config.agent.port, service).await
}

async fn serve_router(config: &Config) -> anyhow::Result<()> {
    let classifier = IntentClassifier::new(create_provider(config)?, config.router.routes.labels());
    let dispatcher = HttpDispatcher::new(
        concierge_llm::http::default_client()?,
        config.dispatch_timeout(),
    );
    let router = Router::new(classifier, dispatcher, config.router.routes.clone())
        .with_max_retries(config.router.max_retries)
        .with_fallback_message(config.router.fallback_message.clone());

    for (label, endpoint) in config.router.routes.iter() {
        tracing::info!(%label, url = %endpoint.url, "route");
    }

    let service: Arc<dyn ChatService> = Arc::new(RouterService::new(router));
    serve(config, &config.router.bind, config.router.port, service).await
}

async fn serve(
    config: &Config,
    bind: &str,
    port: u16,
    service: Arc<dyn ChatService>,
) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(bind, port, service, shutdown_rx)
        .with_rate_limit(config.gateway.rate_limit)
        .with_max_body_size(config.gateway.max_body_size)
        .serve()
        .await?;
    Ok(())
}
