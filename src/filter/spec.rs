use serde_json::Value;
use uuid::Uuid;

use super::types::{OrderSpec, Predicate};

/// Query specification for a document collection: AND-composed predicates,
/// an optional sort, and optional skip/limit.
///
/// Built by resource handlers from recognized query parameters. Absent
/// parameters never become predicates, so an empty spec selects the
/// collection's full (or implicitly restricted) set rather than nothing.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    predicates: Vec<Predicate>,
    order: Option<OrderSpec>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterSpec {
    /// Empty spec with the default newest-first sort.
    pub fn new() -> Self {
        Self {
            predicates: vec![],
            order: Some(OrderSpec::default()),
            limit: None,
            offset: None,
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Exact-match predicate, skipped entirely when the parameter is absent.
    pub fn eq_opt(self, field: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self,
        }
    }

    pub fn contains_ci(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.predicates.push(Predicate::ContainsCi {
            field: field.into(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn contains_ci_opt(self, field: impl Into<String>, pattern: Option<String>) -> Self {
        match pattern {
            Some(pattern) => self.contains_ci(field, pattern),
            None => self,
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.predicates.push(Predicate::Id(id));
        self
    }

    pub fn order(mut self, order: OrderSpec) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn paginate(mut self, pagination: &Pagination) -> Self {
        self.limit = Some(pagination.limit);
        self.offset = Some(pagination.skip());
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order_spec(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }
}

/// Page/limit pair parsed from raw query parameters.
///
/// Missing or non-numeric values fall back to page 1 and the configured
/// default page size instead of failing the request; the limit is capped by
/// the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let defaults = &crate::config::config().pagination;

        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(defaults.default_limit)
            .min(defaults.max_limit);

        Self { page, limit }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn has_more(&self, returned: usize, total: i64) -> bool {
        self.skip() + (returned as i64) < total
    }
}
