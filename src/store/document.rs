use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// A stored document: caller-supplied JSON body plus the store-assigned
/// primary key and creation timestamp.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub body: Map<String, Value>,
}

impl Document {
    /// Wire form: the body with `id` and `createdAt` merged in. Store-managed
    /// fields win over any client-supplied keys of the same name.
    pub fn to_value(&self) -> Value {
        let mut out = self.body.clone();
        out.insert("id".to_string(), json!(self.id));
        out.insert("createdAt".to_string(), json!(self.created_at));
        Value::Object(out)
    }

    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(Value::as_str)
    }
}

pub fn to_values(docs: &[Document]) -> Vec<Value> {
    docs.iter().map(Document::to_value).collect()
}
