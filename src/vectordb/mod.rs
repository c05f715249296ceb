//! Qdrant-backed recipe index (read side).
//!
//! The index is built offline: one point per recipe, vectors L2-normalized, payload
//! carrying `recipe_id`, `title`, `ingredients` and `steps`. This module only searches it.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantClient, VectorDbClient};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorDbClient, inner_product};
pub use model::{RecipeHit, RecipePayload};

pub use crate::config::DEFAULT_COLLECTION as DEFAULT_COLLECTION_NAME;
