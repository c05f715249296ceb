use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by recipe index operations.
pub enum VectorDbError {
    /// Could not connect to the Qdrant endpoint.
    #[error("failed to connect to Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name.
        collection: String,
    },

    /// Search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Query vector dimension does not match the collection.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A stored recipe lacks a required payload field.
    #[error("malformed recipe record (point {point}): missing field '{field}'")]
    MalformedRecord {
        /// Point id as reported by the index.
        point: String,
        /// Name of the missing field.
        field: &'static str,
    },
}
