use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::filter::{sql, FilterSpec};

use super::collection::{Collection, DeleteResult, InsertResult, StoreError, UpdateResult};
use super::document::Document;

pub(crate) const TABLES: &[&str] = &[
    "users",
    "pets",
    "donations",
    "donation_payments",
    "adoption_requests",
];

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// One document collection stored as a `(id, doc, created_at)` table.
pub struct PgCollection {
    table: &'static str,
    pool: PgPool,
}

impl PgCollection {
    pub fn new(table: &'static str, pool: PgPool) -> Self {
        Self { table, pool }
    }

    fn bind<'q>(
        query: &'q crate::filter::types::SqlQuery,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut q = sqlx::query(&query.sql);
        for arg in &query.args {
            q = match arg {
                crate::filter::types::SqlArg::Json(v) => q.bind(v.clone()),
                crate::filter::types::SqlArg::Text(s) => q.bind(s.clone()),
                crate::filter::types::SqlArg::Uuid(u) => q.bind(*u),
            };
        }
        q
    }

    fn map_insert_error(&self, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Duplicate(self.table.to_string());
            }
        }
        StoreError::Sqlx(err)
    }
}

fn row_to_document(row: &PgRow) -> Result<Document, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let doc: Value = row.try_get("doc")?;
    let body = doc.as_object().cloned().unwrap_or_default();
    Ok(Document {
        id,
        created_at,
        body,
    })
}

#[async_trait]
impl Collection for PgCollection {
    async fn find(&self, spec: FilterSpec) -> Result<Vec<Document>, StoreError> {
        let query = sql::select(self.table, &spec)?;
        let rows = Self::bind(&query).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    async fn find_one(&self, spec: FilterSpec) -> Result<Option<Document>, StoreError> {
        let query = sql::select(self.table, &spec.limit(1))?;
        let row = Self::bind(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn count(&self, spec: FilterSpec) -> Result<i64, StoreError> {
        let query = sql::count(self.table, &spec)?;
        let row = Self::bind(&query).fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    async fn insert_one(&self, body: Map<String, Value>) -> Result<InsertResult, StoreError> {
        let insert_sql = format!(
            "INSERT INTO \"{}\" (doc) VALUES ($1) RETURNING id",
            self.table
        );
        let row = sqlx::query(&insert_sql)
            .bind(Value::Object(body))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_insert_error(e))?;

        Ok(InsertResult {
            inserted_id: row.try_get("id")?,
        })
    }

    async fn update_set(
        &self,
        spec: FilterSpec,
        patch: Map<String, Value>,
    ) -> Result<UpdateResult, StoreError> {
        let query = sql::update_set(self.table, &spec, Value::Object(patch))?;
        let result = Self::bind(&query).execute(&self.pool).await?;
        let affected = result.rows_affected();
        Ok(UpdateResult {
            matched_count: affected,
            modified_count: affected,
        })
    }

    async fn delete_many(&self, spec: FilterSpec) -> Result<DeleteResult, StoreError> {
        let query = sql::delete(self.table, &spec)?;
        let result = Self::bind(&query).execute(&self.pool).await?;
        Ok(DeleteResult {
            deleted_count: result.rows_affected(),
        })
    }
}

/// Creates the collection tables and the unique indexes that back the
/// handler-level duplicate pre-checks. Idempotent, run at startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for table in TABLES {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\
             id uuid PRIMARY KEY DEFAULT gen_random_uuid(), \
             doc jsonb NOT NULL, \
             created_at timestamptz NOT NULL DEFAULT now())",
            table
        );
        sqlx::query(&ddl).execute(pool).await?;
    }

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS adoption_requests_pet_requester_key \
         ON \"adoption_requests\" ((doc->>'petId'), (doc->>'adoptedReqByEmail'))",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON \"users\" ((doc->>'email'))",
    )
    .execute(pool)
    .await?;

    Ok(())
}
