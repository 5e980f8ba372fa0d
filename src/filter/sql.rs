//! Renders a `FilterSpec` into SQL over document tables of the shape
//! `(id uuid, doc jsonb, created_at timestamptz)`.
//!
//! Exact matches use jsonb containment so values of any JSON type bind as a
//! single parameter; substring matches use ILIKE over the extracted text.
//! Identifiers are validated before interpolation, values are always bound.

use serde_json::{Map, Value};

use super::error::FilterError;
use super::spec::FilterSpec;
use super::types::{OrderSpec, Predicate, SortKey, SqlArg, SqlQuery};

pub(crate) fn select(table: &str, spec: &FilterSpec) -> Result<SqlQuery, FilterError> {
    validate_identifier(table).map_err(|_| FilterError::InvalidCollection(table.to_string()))?;

    let mut args = vec![];
    let where_clause = render_where(spec, &mut args, 0)?;
    let order_clause = render_order(spec.order_spec())?;
    let limit_clause = render_limit(spec.limit_value(), spec.offset_value());

    let sql = [
        format!("SELECT id, doc, created_at FROM \"{}\"", table),
        where_clause,
        order_clause,
        limit_clause,
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Ok(SqlQuery { sql, args })
}

/// Count query for the same predicates, ignoring sort and pagination.
pub(crate) fn count(table: &str, spec: &FilterSpec) -> Result<SqlQuery, FilterError> {
    validate_identifier(table).map_err(|_| FilterError::InvalidCollection(table.to_string()))?;

    let mut args = vec![];
    let where_clause = render_where(spec, &mut args, 0)?;

    let sql = [
        format!("SELECT COUNT(*) AS count FROM \"{}\"", table),
        where_clause,
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Ok(SqlQuery { sql, args })
}

/// `$set`-style shallow merge of `patch` onto every matching document.
pub(crate) fn update_set(
    table: &str,
    spec: &FilterSpec,
    patch: Value,
) -> Result<SqlQuery, FilterError> {
    validate_identifier(table).map_err(|_| FilterError::InvalidCollection(table.to_string()))?;
    if spec.predicates().is_empty() {
        return Err(FilterError::UnfilteredWrite(table.to_string()));
    }

    let mut args = vec![SqlArg::Json(patch)];
    let where_clause = render_where(spec, &mut args, 1)?;

    let sql = format!("UPDATE \"{}\" SET doc = doc || $1 {}", table, where_clause);
    Ok(SqlQuery { sql, args })
}

pub(crate) fn delete(table: &str, spec: &FilterSpec) -> Result<SqlQuery, FilterError> {
    validate_identifier(table).map_err(|_| FilterError::InvalidCollection(table.to_string()))?;
    if spec.predicates().is_empty() {
        return Err(FilterError::UnfilteredWrite(table.to_string()));
    }

    let mut args = vec![];
    let where_clause = render_where(spec, &mut args, 0)?;

    let sql = format!("DELETE FROM \"{}\" {}", table, where_clause);
    Ok(SqlQuery { sql, args })
}

fn render_where(
    spec: &FilterSpec,
    args: &mut Vec<SqlArg>,
    starting_index: usize,
) -> Result<String, FilterError> {
    if spec.predicates().is_empty() {
        return Ok(String::new());
    }

    let mut index = starting_index;
    let mut conditions = vec![];

    for predicate in spec.predicates() {
        let condition = match predicate {
            Predicate::Eq { field, value } => {
                validate_identifier(field)?;
                let mut probe = Map::new();
                probe.insert(field.clone(), value.clone());
                args.push(SqlArg::Json(Value::Object(probe)));
                index += 1;
                format!("doc @> ${}", index)
            }
            Predicate::ContainsCi { field, pattern } => {
                validate_identifier(field)?;
                args.push(SqlArg::Text(format!("%{}%", escape_like(pattern))));
                index += 1;
                format!("doc->>'{}' ILIKE ${}", field, index)
            }
            Predicate::Id(id) => {
                args.push(SqlArg::Uuid(*id));
                index += 1;
                format!("id = ${}", index)
            }
        };
        conditions.push(condition);
    }

    Ok(format!("WHERE {}", conditions.join(" AND ")))
}

fn render_order(order: Option<&OrderSpec>) -> Result<String, FilterError> {
    let Some(order) = order else {
        return Ok(String::new());
    };

    let column = match &order.key {
        SortKey::CreatedAt => "created_at".to_string(),
        SortKey::Field(field) => {
            validate_identifier(field)?;
            format!("doc->>'{}'", field)
        }
    };

    Ok(format!("ORDER BY {} {}", column, order.direction.to_sql()))
}

fn render_limit(limit: Option<i64>, offset: Option<i64>) -> String {
    match (limit, offset) {
        (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
        (Some(l), None) => format!("LIMIT {}", l),
        (None, Some(o)) => format!("OFFSET {}", o),
        (None, None) => String::new(),
    }
}

fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidField(name.to_string()))
    }
}

/// Escapes LIKE metacharacters so user text matches literally.
fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
