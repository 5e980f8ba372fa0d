use serde_json::Value;
use uuid::Uuid;

/// A single predicate over a stored document. Predicates compose with AND;
/// the query layer never exposes OR to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact match on a top-level document field.
    Eq { field: String, value: Value },
    /// Case-insensitive substring match on a top-level string field.
    ContainsCi { field: String, pattern: String },
    /// Match on the store-assigned primary key.
    Id(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort key: the store-managed creation timestamp, or a document field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    CreatedAt,
    Field(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for OrderSpec {
    /// Newest-first, the sort every listing uses unless it says otherwise.
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Rendered SQL plus its positional arguments, in bind order.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

#[derive(Debug, Clone)]
pub enum SqlArg {
    Json(Value),
    Text(String),
    Uuid(Uuid),
}
