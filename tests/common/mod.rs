//! Shared fixtures: in-memory recipe index, scripted generator, and a test server.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use bakechat::answer::AnswerEngine;
use bakechat::embedding::{QueryEncoder, QueryEncoderConfig, RerankerConfig};
use bakechat::generation::{GenerationAdapter, MockGenerator};
use bakechat::retrieval::{CandidateDocument, RetrievalGateway};
use bakechat::server::{AppState, create_router};
use bakechat::vectordb::{MockVectorDbClient, RecipePayload};

pub const COLLECTION: &str = "recipes_test";
pub const DIM: usize = 32;

pub type TestEngine = AnswerEngine<MockVectorDbClient, MockGenerator>;

pub fn encoder() -> Arc<QueryEncoder> {
    Arc::new(
        QueryEncoder::load(QueryEncoderConfig::stub().with_embedding_dim(DIM))
            .expect("stub encoder loads"),
    )
}

pub fn beef_stew() -> CandidateDocument {
    CandidateDocument::new(
        "s1",
        "Beef Stew",
        "beef, carrots, potatoes",
        "Brown the beef. Simmer for two hours.",
    )
}

pub fn banana_bread() -> CandidateDocument {
    CandidateDocument::new(
        "b1",
        "Banana Bread",
        "ripe bananas, flour, sugar, eggs",
        "Mash the bananas.\nMix with flour and sugar.\n\nBake for 60 minutes.",
    )
}

pub fn brownies() -> CandidateDocument {
    CandidateDocument::new(
        "c1",
        "Chocolate Brownies",
        "cocoa, butter, sugar, eggs",
        "Melt butter with cocoa. Bake for 25 minutes.",
    )
}

/// Retrieval order used by most tests: stew first, so lexical re-sorting is visible.
pub fn kitchen() -> Vec<CandidateDocument> {
    vec![beef_stew(), banana_bread(), brownies()]
}

/// Index where each recipe's vector is the encoding of its title.
pub fn seeded_index(encoder: &QueryEncoder, docs: &[CandidateDocument]) -> MockVectorDbClient {
    let index = MockVectorDbClient::new();
    index.create_collection(COLLECTION, DIM);
    for doc in docs {
        index
            .insert(
                COLLECTION,
                encoder.encode(&doc.title).expect("stub encoding"),
                RecipePayload::new(
                    doc.id.clone(),
                    doc.title.clone(),
                    doc.ingredients.clone(),
                    doc.steps.clone(),
                ),
            )
            .expect("insert recipe");
    }
    index
}

pub fn engine_with(index: MockVectorDbClient, generator: MockGenerator) -> TestEngine {
    let gateway = RetrievalGateway::new(encoder(), index, COLLECTION, RerankerConfig::stub());
    AnswerEngine::new(gateway, GenerationAdapter::new(generator))
}

/// Engine over an empty collection, for tests that call `synthesize` directly.
pub fn offline_engine(generator: MockGenerator) -> TestEngine {
    let index = MockVectorDbClient::new();
    index.create_collection(COLLECTION, DIM);
    engine_with(index, generator)
}

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serves `engine` on an ephemeral local port.
pub async fn spawn_test_server(engine: TestEngine) -> anyhow::Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(AppState::new(engine, 20));

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer { addr, handle })
}
