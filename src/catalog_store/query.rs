//! Piece listing queries: filters, sorting and pagination.
//!
//! A [`PieceQuery`] is validated when it is built, so the store only ever sees
//! bounded page sizes. The SQL fragments produced here all refer to the
//! `pieces` table through the alias `p`.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::CreditRole;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Case folding shared by the SQL `casefold` function and query arguments.
pub fn casefold(s: &str) -> String {
    s.to_lowercase()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("page must be a positive integer, got {0}")]
    InvalidPage(i64),

    #[error("limit must be between 1 and 100, got {0}")]
    InvalidLimit(i64),
}

// =============================================================================
// Pagination
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, QueryError> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p >= 1 && p <= u32::MAX as i64 => p as u32,
            Some(p) => return Err(QueryError::InvalidPage(p)),
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if l >= 1 && l <= MAX_LIMIT as i64 => l as u32,
            Some(l) => return Err(QueryError::InvalidLimit(l)),
        };
        Ok(Pagination { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn last_page(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

// =============================================================================
// Sorting
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Title,
    Genre,
    Year,
    Difficulty,
}

impl SortField {
    fn order_expression(&self) -> &'static str {
        match self {
            SortField::Title => "casefold(p.title)",
            SortField::Genre => "casefold(p.genre)",
            SortField::Year => "p.year",
            SortField::Difficulty => "casefold(p.difficulty)",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Sorting {
    /// Id is the tie breaker, so equal sort keys still page deterministically.
    pub(super) fn order_by_sql(&self) -> String {
        let direction = match self.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        format!(
            "ORDER BY {} {}, p.id ASC",
            self.sort_by.order_expression(),
            direction
        )
    }
}

// =============================================================================
// Filters
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digitized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arranger_name: Option<String>,
}

/// A WHERE clause together with its positional arguments.
#[derive(Debug, Default, PartialEq)]
pub(super) struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

impl SqlFilter {
    fn push_param(&mut self, value: Value) -> usize {
        self.params.push(value);
        self.params.len()
    }
}

impl PieceFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genre.is_none()
            && self.digitized.is_none()
            && self.composer_name.is_none()
            && self.arranger_name.is_none()
    }

    pub(super) fn to_sql(&self) -> SqlFilter {
        let mut filter = SqlFilter::default();
        let mut conditions: Vec<String> = Vec::new();

        if let Some(title) = &self.title {
            let n = filter.push_param(Value::Text(casefold(title)));
            conditions.push(format!("instr(casefold(p.title), ?{n}) > 0"));
        }
        if let Some(genre) = &self.genre {
            let n = filter.push_param(Value::Text(casefold(genre)));
            conditions.push(format!("casefold(p.genre) = ?{n}"));
        }
        if let Some(digitized) = self.digitized {
            let n = filter.push_param(Value::Integer(digitized as i64));
            conditions.push(format!("p.digitized = ?{n}"));
        }
        for (role, name) in [
            (CreditRole::Composer, &self.composer_name),
            (CreditRole::Arranger, &self.arranger_name),
        ] {
            if let Some(name) = name {
                let n = filter.push_param(Value::Text(casefold(name)));
                conditions.push(format!(
                    "EXISTS (SELECT 1 FROM {table} a JOIN persons pe ON pe.id = a.person_id \
                     WHERE a.piece_id = p.id \
                     AND (instr(casefold(pe.surname), ?{n}) > 0 OR instr(casefold(pe.given_name), ?{n}) > 0))",
                    table = role.table_name()
                ));
            }
        }

        if !conditions.is_empty() {
            filter.clause = format!("WHERE {}", conditions.join(" AND "));
        }
        filter
    }
}

// =============================================================================
// Query
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceQuery {
    pub filter: PieceFilter,
    pub sorting: Sorting,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let pagination = Pagination::new(None, None).unwrap();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), 10);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn pagination_rejects_out_of_range_values() {
        assert_eq!(
            Pagination::new(Some(0), None),
            Err(QueryError::InvalidPage(0))
        );
        assert_eq!(
            Pagination::new(Some(-3), None),
            Err(QueryError::InvalidPage(-3))
        );
        assert_eq!(
            Pagination::new(None, Some(101)),
            Err(QueryError::InvalidLimit(101))
        );
        assert_eq!(
            Pagination::new(None, Some(0)),
            Err(QueryError::InvalidLimit(0))
        );
        assert!(Pagination::new(Some(1), Some(100)).is_ok());
    }

    #[test]
    fn offset_and_last_page() {
        let pagination = Pagination::new(Some(3), Some(20)).unwrap();
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.last_page(0), 0);
        assert_eq!(pagination.last_page(20), 1);
        assert_eq!(pagination.last_page(21), 2);
    }

    #[test]
    fn default_sorting_is_title_ascending() {
        assert_eq!(
            Sorting::default().order_by_sql(),
            "ORDER BY casefold(p.title) ASC, p.id ASC"
        );
        let sorting = Sorting {
            sort_by: SortField::Year,
            sort_order: SortOrder::Desc,
        };
        assert_eq!(sorting.order_by_sql(), "ORDER BY p.year DESC, p.id ASC");
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let sql = PieceFilter::default().to_sql();
        assert!(sql.clause.is_empty());
        assert!(sql.params.is_empty());
    }

    #[test]
    fn filter_numbers_params_in_order() {
        let filter = PieceFilter {
            title: Some("Ave".to_string()),
            digitized: Some(true),
            composer_name: Some("MOZART".to_string()),
            ..Default::default()
        };
        let sql = filter.to_sql();

        assert_eq!(
            sql.params,
            vec![
                Value::Text("ave".to_string()),
                Value::Integer(1),
                Value::Text("mozart".to_string()),
            ]
        );
        assert!(sql.clause.starts_with("WHERE instr(casefold(p.title), ?1) > 0 AND p.digitized = ?2"));
        assert!(sql.clause.contains("FROM composed_by a"));
        assert!(sql.clause.contains("instr(casefold(pe.given_name), ?3)"));
        assert!(!sql.clause.contains("arranged_by"));
    }
}
