//! In-memory `Collection` used by the test suite. Evaluates the same
//! `FilterSpec` contract as the Postgres implementation, including the
//! unique-key tuples that back duplicate detection.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::{FilterSpec, Predicate, SortDirection, SortKey};

use super::collection::{Collection, DeleteResult, InsertResult, StoreError, UpdateResult};
use super::document::Document;

pub struct MemCollection {
    name: &'static str,
    docs: RwLock<Vec<Document>>,
    unique_keys: Vec<Vec<&'static str>>,
}

impl MemCollection {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: RwLock::new(vec![]),
            unique_keys: vec![],
        }
    }

    /// Rejects inserts whose values for `fields` all match an existing
    /// document, mirroring a store-level unique index.
    pub fn with_unique_key(mut self, fields: &[&'static str]) -> Self {
        self.unique_keys.push(fields.to_vec());
        self
    }
}

fn matches(doc: &Document, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|predicate| match predicate {
        Predicate::Eq { field, value } => doc.body.get(field) == Some(value),
        Predicate::ContainsCi { field, pattern } => doc
            .field_str(field)
            .map_or(false, |s| s.to_lowercase().contains(&pattern.to_lowercase())),
        Predicate::Id(id) => doc.id == *id,
    })
}

fn compare(a: &Document, b: &Document, key: &SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Field(field) => {
            let left = a.body.get(field).map(|v| v.to_string());
            let right = b.body.get(field).map(|v| v.to_string());
            left.cmp(&right)
        }
    }
}

fn apply(spec: &FilterSpec, docs: &[Document]) -> Vec<Document> {
    let mut selected: Vec<Document> = docs
        .iter()
        .filter(|d| matches(d, spec.predicates()))
        .cloned()
        .collect();

    if let Some(order) = spec.order_spec() {
        selected.sort_by(|a, b| {
            let ordering = compare(a, b, &order.key);
            match order.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    let skip = spec.offset_value().unwrap_or(0).max(0) as usize;
    let take = spec
        .limit_value()
        .map(|l| l.max(0) as usize)
        .unwrap_or(usize::MAX);

    selected.into_iter().skip(skip).take(take).collect()
}

#[async_trait]
impl Collection for MemCollection {
    async fn find(&self, spec: FilterSpec) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(apply(&spec, &docs))
    }

    async fn find_one(&self, spec: FilterSpec) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(apply(&spec.limit(1), &docs).into_iter().next())
    }

    async fn count(&self, spec: FilterSpec) -> Result<i64, StoreError> {
        let docs = self.docs.read().await;
        let matched = docs.iter().filter(|d| matches(d, spec.predicates())).count();
        Ok(matched as i64)
    }

    async fn insert_one(&self, body: Map<String, Value>) -> Result<InsertResult, StoreError> {
        let mut docs = self.docs.write().await;

        for key in &self.unique_keys {
            let collides = docs.iter().any(|existing| {
                key.iter()
                    .all(|field| existing.body.get(*field) == body.get(*field))
                    && key.iter().any(|field| body.contains_key(*field))
            });
            if collides {
                return Err(StoreError::Duplicate(self.name.to_string()));
            }
        }

        let doc = Document {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            body,
        };
        let inserted_id = doc.id;
        docs.push(doc);

        Ok(InsertResult { inserted_id })
    }

    async fn update_set(
        &self,
        spec: FilterSpec,
        patch: Map<String, Value>,
    ) -> Result<UpdateResult, StoreError> {
        let mut docs = self.docs.write().await;
        let mut matched = 0;
        let mut modified = 0;

        for doc in docs.iter_mut().filter(|d| matches(d, spec.predicates())) {
            matched += 1;
            let mut changed = false;
            for (field, value) in &patch {
                if doc.body.get(field) != Some(value) {
                    doc.body.insert(field.clone(), value.clone());
                    changed = true;
                }
            }
            if changed {
                modified += 1;
            }
        }

        Ok(UpdateResult {
            matched_count: matched,
            modified_count: modified,
        })
    }

    async fn delete_many(&self, spec: FilterSpec) -> Result<DeleteResult, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| !matches(d, spec.predicates()));
        Ok(DeleteResult {
            deleted_count: (before - docs.len()) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object body")
    }

    #[tokio::test]
    async fn find_filters_sorts_and_paginates() {
        let pets = MemCollection::new("pets");
        for i in 0..5 {
            pets.insert_one(body(json!({"name": format!("pet-{i}"), "adopted": i % 2 == 0})))
                .await
                .unwrap();
        }

        let spec = FilterSpec::new().eq("adopted", false);
        let found = pets.find(spec.clone()).await.unwrap();
        assert_eq!(found.len(), 2);
        // Newest first under the default sort
        assert!(found[0].created_at >= found[1].created_at);

        let limited = pets.find(spec.limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn contains_ci_matches_substrings_case_insensitively() {
        let pets = MemCollection::new("pets");
        pets.insert_one(body(json!({"name": "Fuzzy"}))).await.unwrap();
        pets.insert_one(body(json!({"name": "Rex"}))).await.unwrap();

        let found = pets
            .find(FilterSpec::new().contains_ci("name", "uz"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field_str("name"), Some("Fuzzy"));
    }

    #[tokio::test]
    async fn unique_key_rejects_duplicates() {
        let requests =
            MemCollection::new("adoption_requests").with_unique_key(&["petId", "adoptedReqByEmail"]);

        requests
            .insert_one(body(json!({"petId": "p1", "adoptedReqByEmail": "a@b.c"})))
            .await
            .unwrap();
        let err = requests
            .insert_one(body(json!({"petId": "p1", "adoptedReqByEmail": "a@b.c"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // Different requester is fine
        requests
            .insert_one(body(json!({"petId": "p1", "adoptedReqByEmail": "x@y.z"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_set_reports_matched_and_modified() {
        let pets = MemCollection::new("pets");
        let inserted = pets
            .insert_one(body(json!({"name": "Fuzzy", "adopted": false})))
            .await
            .unwrap();

        let result = pets
            .update_set(
                FilterSpec::new().id(inserted.inserted_id),
                body(json!({"adopted": true})),
            )
            .await
            .unwrap();
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.modified_count, 1);

        // Same patch again matches but changes nothing
        let result = pets
            .update_set(
                FilterSpec::new().id(inserted.inserted_id),
                body(json!({"adopted": true})),
            )
            .await
            .unwrap();
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.modified_count, 0);
    }

    #[tokio::test]
    async fn delete_many_reports_deleted_count() {
        let pets = MemCollection::new("pets");
        pets.insert_one(body(json!({"email": "a@b.c"}))).await.unwrap();
        pets.insert_one(body(json!({"email": "a@b.c"}))).await.unwrap();
        pets.insert_one(body(json!({"email": "x@y.z"}))).await.unwrap();

        let result = pets
            .delete_many(FilterSpec::new().eq("email", "a@b.c"))
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 2);
        assert_eq!(pets.count(FilterSpec::new()).await.unwrap(), 1);
    }
}
