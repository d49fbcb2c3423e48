use super::{
    bson_to_json, Collection, DeleteOutcome, DocumentStore, InsertOutcome, StoreError,
    UpdateOutcome,
};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process document store for local runs (`DATABASE_URL=memory://`) and tests.
///
/// Filters are top-level equality matches and the only update operator is `$set`,
/// which is all the routes ever issue.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection` matching `filter`.
    pub async fn count(&self, collection: Collection, filter: &Document) -> usize {
        let collections = self.collections.read().await;
        collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).count())
            .unwrap_or(0)
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| match document.get(key) {
            Some(actual) => actual == expected,
            // Mongo treats `{field: null}` as matching a missing field
            None => matches!(expected, Bson::Null),
        })
}

fn set_fields(update: &Document) -> Result<&Document, StoreError> {
    if let Some(op) = update.keys().find(|k| k.as_str() != "$set") {
        return Err(StoreError::Unsupported(format!("update operator {}", op)));
    }

    match update.get("$set") {
        Some(Bson::Document(fields)) => Ok(fields),
        Some(_) => Err(StoreError::Unsupported("$set must be a document".into())),
        None => Err(StoreError::Unsupported("empty update".into())),
    }
}

fn apply_set(target: &mut Document, fields: &Document) -> bool {
    let mut changed = false;
    for (key, value) in fields {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: Document) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertOutcome, StoreError> {
        let id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        };

        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(document);

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: bson_to_json(id),
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        let fields = set_fields(&update)?;

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(existing) = docs.iter_mut().find(|d| matches(d, &filter)) {
            let changed = apply_set(existing, fields);
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(changed),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        // New document seeded from the filter's equality fields, like the server does
        let id = Bson::ObjectId(ObjectId::new());
        let mut created = Document::new();
        created.insert("_id", id.clone());
        for (key, value) in filter.iter().filter(|(k, _)| !k.starts_with('$')) {
            created.insert(key.clone(), value.clone());
        }
        apply_set(&mut created, fields);
        docs.push(created);

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(bson_to_json(id)),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<DeleteOutcome, StoreError> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|d| matches(d, &filter)) {
                Some(index) => {
                    docs.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count,
        })
    }
}
