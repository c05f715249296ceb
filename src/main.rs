//! BakeChat entrypoint.
//!
//! - default: HTTP server
//! - `--query "<question>" [--top-k N] [--reranker]`: print the top sources and the answer, then exit
//! - `--health-check`: probe `/healthz` on the configured port, exit 0 or 1

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use bakechat::answer::AnswerEngine;
use bakechat::config::Config;
use bakechat::constants::{CANDIDATE_LIMIT, clamp_top_k};
use bakechat::embedding::{QueryEncoder, QueryEncoderConfig, RerankerConfig};
use bakechat::generation::{GenerationAdapter, Generator};
use bakechat::retrieval::RetrievalGateway;
use bakechat::server::{AppState, create_router};
use bakechat::vectordb::QdrantClient;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Grounded recipe question answering.
#[derive(Parser, Debug)]
#[command(name = "bakechat", version, about)]
struct CliArgs {
    /// Probe /healthz on BAKECHAT_PORT and exit 0 or 1
    #[arg(long)]
    health_check: bool,

    /// Answer one question, print the top sources and the answer, then exit
    #[arg(long)]
    query: Option<String>,

    /// Retrieval depth (clamped to 5..=50); defaults to BAKECHAT_TOP_K
    #[arg(long, alias = "topk")]
    top_k: Option<u64>,

    /// Re-sort retrieved recipes with the cross-encoder
    #[arg(long)]
    reranker: bool,
}

type Engine = AnswerEngine<QdrantClient, Generator>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();

    if cli.health_check {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let engine = build_engine(&config).await?;

    if let Some(query) = cli.query.as_deref() {
        let top_k = cli.top_k.unwrap_or(config.top_k);
        return run_query(&engine, query, top_k, cli.reranker).await;
    }

    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        collection = %config.collection,
        "BakeChat starting"
    );

    let app = create_router(AppState::new(engine, config.top_k));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("BakeChat shutdown complete");
    Ok(())
}

async fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let index = QdrantClient::new(&config.qdrant_url)?;
    index
        .health_check()
        .await
        .with_context(|| format!("Qdrant is not reachable at {}", index.url()))?;

    let encoder_config = match &config.embedder_path {
        Some(path) => QueryEncoderConfig::new(path.clone()),
        None => {
            tracing::warn!("No BAKECHAT_EMBEDDER_PATH configured, running query encoder in stub mode");
            QueryEncoderConfig::stub()
        }
    };
    let encoder = Arc::new(QueryEncoder::load(encoder_config)?);

    let reranker_config = config
        .reranker_path
        .clone()
        .map(RerankerConfig::new)
        .unwrap_or_default();

    let gateway = RetrievalGateway::new(encoder, index, config.collection.clone(), reranker_config);
    gateway
        .ensure_ready()
        .await
        .with_context(|| format!("recipe collection '{}' is not available", config.collection))?;

    let generator = Generator::from_config(config)?;
    tracing::info!(generator = generator.name(), "Generator ready");

    let generation = GenerationAdapter::new(generator)
        .with_max_new_tokens(config.max_new_tokens)
        .with_timeout(config.generation_timeout);

    Ok(AnswerEngine::new(gateway, generation))
}

async fn run_query(
    engine: &Engine,
    query: &str,
    top_k: u64,
    use_reranker: bool,
) -> anyhow::Result<()> {
    let query = query.trim();
    let top_k = clamp_top_k(top_k);

    let mut docs = engine.gateway().retrieve(query, top_k, use_reranker).await?;
    docs.truncate(CANDIDATE_LIMIT);

    println!("Top docs:");
    for doc in &docs {
        println!("  {:<12} {:<48} {:.4}", doc.id, doc.title, doc.retrieval_score);
    }

    let synthesis = engine.synthesize(query, &docs).await?;
    println!("\nAnswer:\n{}", synthesis.answer);

    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("BAKECHAT_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
