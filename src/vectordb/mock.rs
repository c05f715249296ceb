use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::vectordb::{RecipeHit, RecipePayload, VectorDbClient, VectorDbError};

/// In-memory flat inner-product index for tests.
#[derive(Default)]
pub struct MockVectorDbClient {
    collections: std::sync::RwLock<HashMap<String, MockCollection>>,
    unavailable: AtomicBool,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: usize,
    // Insertion order doubles as the tie-break order for equal scores.
    points: Vec<(Vec<f32>, RecipePayload)>,
}

impl MockVectorDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_collection(&self, name: &str, vector_size: usize) {
        if let Ok(mut collections) = self.collections.write() {
            collections.entry(name.to_string()).or_insert(MockCollection {
                vector_size,
                points: Vec::new(),
            });
        }
    }

    /// Adds a recipe; vectors must match the collection size.
    pub fn insert(
        &self,
        collection: &str,
        vector: Vec<f32>,
        recipe: RecipePayload,
    ) -> Result<(), VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::SearchFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        if vector.len() != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size,
                actual: vector.len(),
            });
        }

        coll.points.push((vector, recipe));
        Ok(())
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }

    /// Makes every subsequent call fail as if the backing store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self, collection: &str) -> Result<(), VectorDbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "backing store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl VectorDbClient for MockVectorDbClient {
    async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.check_available(name)?;
        Ok(self
            .collections
            .read()
            .map(|c| c.contains_key(name))
            .unwrap_or(false))
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<RecipeHit>, VectorDbError> {
        self.check_available(collection)?;

        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        if query.len() != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size,
                actual: query.len(),
            });
        }

        let mut results: Vec<RecipeHit> = coll
            .points
            .iter()
            .map(|(vector, recipe)| RecipeHit::new(inner_product(&query, vector), recipe.clone()))
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results.truncate(limit as usize);
        Ok(results)
    }
}

pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
