pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Collections used by the marketplace. Names match the MongoDB collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tools,
    Users,
    Orders,
    Reviews,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tools => "tools",
            Collection::Users => "users",
            Collection::Orders => "orders",
            Collection::Reviews => "reviews",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Acknowledgement of `insertOne`, shaped like the driver result clients already consume.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    #[schema(value_type = String)]
    pub inserted_id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    #[schema(value_type = Option<String>)]
    pub upserted_id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Single-call document operations. Handlers hold a `web::Data<dyn DocumentStore>`
/// so MongoDB and the in-memory store are interchangeable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find(&self, collection: Collection, filter: Document) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>, StoreError>;

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOutcome, StoreError>;

    /// `update` is an update document (`{"$set": {...}}`).
    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<DeleteOutcome, StoreError>;
}

/// Converts a BSON value to the JSON clients see: ObjectIds as hex strings,
/// dates as RFC 3339, everything else as relaxed extended JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            dt.try_to_rfc3339_string()
                .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
        ),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    Value::Object(doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect())
}

pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}
