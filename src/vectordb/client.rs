use qdrant_client::Qdrant;
use qdrant_client::qdrant::SearchPointsBuilder;
use tracing::debug;

use super::error::VectorDbError;
use super::model::RecipeHit;

#[derive(Clone)]
/// Direct Qdrant client wrapper.
pub struct QdrantClient {
    client: Qdrant,
    url: String,
}

impl QdrantClient {
    /// Creates a client for `url`.
    pub fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }

    /// Searches a collection; results arrive ordered by descending similarity.
    pub async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<RecipeHit>, VectorDbError> {
        let search_result = self
            .client
            .search_points(SearchPointsBuilder::new(collection, query, limit).with_payload(true))
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        debug!(
            collection,
            hits = search_result.result.len(),
            "Qdrant search complete"
        );

        search_result
            .result
            .into_iter()
            .map(RecipeHit::from_scored_point)
            .collect()
    }
}

/// Minimal async interface used by the retrieval gateway.
pub trait VectorDbClient: Send + Sync {
    /// Returns `true` if the collection exists.
    fn collection_exists(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, VectorDbError>> + Send;

    /// Searches for the `limit` most similar recipes.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<RecipeHit>, VectorDbError>> + Send;
}

impl VectorDbClient for QdrantClient {
    async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.collection_exists(name).await
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<RecipeHit>, VectorDbError> {
        self.search(collection, query, limit).await
    }
}
