use anyhow::Context;
use rag_service::api::{create_router, AppState};
use rag_service::application::{ModelInvoker, RagService};
use rag_service::infrastructure::config::{LogFormat, LoggingConfig};
use rag_service::infrastructure::{
    AppConfig, AzureChatLlm, AzureEmbedding, AzureOpenAiClient, InMemoryVectorStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let app_config = AppConfig::load()?;
    init_tracing(&app_config.config.logging);
    let config = &app_config.config;

    let client = AzureOpenAiClient::new(&config.azure)?;
    info!(endpoint = %config.azure.endpoint, "Azure OpenAI client initialized");

    let embedding = Arc::new(AzureEmbedding::from_config(client.clone(), &config.embedding));
    let llm = Arc::new(AzureChatLlm::from_config(client, &config.llm));
    let store = Arc::new(InMemoryVectorStore::new(embedding));
    let invoker = Arc::new(ModelInvoker::new(llm, config.llm.retry_policy()));
    let rag = Arc::new(
        RagService::new(
            store,
            invoker,
            app_config.prompts.rag.context_inference.clone(),
            config.rag.top_k,
        )
        .with_chunk_size(config.rag.chunk_size),
    );

    if let Some(path) = &config.rag.seed_path {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading seed documents from {}", path.display()))?;
        let documents = rag.ingest(&content).await?;
        info!(documents, path = %path.display(), "knowledge base seeded");
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let app = create_router(AppState::new(rag, app_config));

    info!("RAG server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
