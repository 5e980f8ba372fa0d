use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{FilterError, FilterSpec};

use super::document::Document;

/// Errors surfaced across the document-store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Duplicate document in {0}")]
    Duplicate(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertResult {
    #[serde(rename = "insertedId")]
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    #[serde(rename = "matchedCount")]
    pub matched_count: u64,
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// The contract this service expects from a document collection: filtered,
/// sorted, paginated reads plus insert / merge-update / delete and a count.
///
/// Two implementations exist: Postgres-backed for production and in-memory
/// for tests, so the access-control pipeline and handlers are exercisable
/// without a database.
#[async_trait]
pub trait Collection: Send + Sync {
    async fn find(&self, spec: FilterSpec) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, spec: FilterSpec) -> Result<Option<Document>, StoreError>;

    /// Counts documents matching the spec's predicates; sort and pagination
    /// are ignored.
    async fn count(&self, spec: FilterSpec) -> Result<i64, StoreError>;

    async fn insert_one(&self, body: Map<String, Value>) -> Result<InsertResult, StoreError>;

    /// `$set`-style shallow merge of `patch` onto every matching document.
    async fn update_set(
        &self,
        spec: FilterSpec,
        patch: Map<String, Value>,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_many(&self, spec: FilterSpec) -> Result<DeleteResult, StoreError>;
}
