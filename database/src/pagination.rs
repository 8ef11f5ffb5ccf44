//! Keyset pagination over an ordered set of columns.
//!
//! A page is selected by comparing the ordering columns against the values taken from the node at
//! the cursor, i.e. `(created_at, id) > ($1, $2)`, rather than by offset. Backward pages are
//! fetched in reverse so the `LIMIT` applies to the rows closest to the cursor, which means a
//! store applying [`PaginationArgs`] returns backward pages nearest-first. Restoring the
//! connection order is up to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

/// The value of a single ordering column at some row
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CursorValue {
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl From<i32> for CursorValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for CursorValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for CursorValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CursorValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<DateTime<Utc>> for CursorValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// The columns that define a total order over a set of rows
///
/// Column names are interpolated directly into the query, so they are restricted to static
/// strings. The final column must be unique for the order to be total.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderBy(Vec<&'static str>);

impl OrderBy {
    /// Order by the given columns, most significant first
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        let columns = columns.into_iter().collect::<Vec<_>>();
        debug_assert!(!columns.is_empty(), "ordering requires at least one column");
        Self(columns)
    }

    /// The ordering columns
    pub fn columns(&self) -> &[&'static str] {
        &self.0
    }

    /// The ordering columns as owned strings
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|c| (*c).to_owned()).collect()
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self(vec!["id"])
    }
}

/// A row that can be positioned within an ordering
pub trait CursorSource {
    /// Get the row's value for an ordering column, if the row has it
    fn column_value(&self, column: &str) -> Option<CursorValue>;
}

/// Which rows to fetch for a page
///
/// `first` and `last` are the limits sent to the database as-is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaginationArgs {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub after: Option<Vec<CursorValue>>,
    pub before: Option<Vec<CursorValue>>,
    pub order_by: OrderBy,
    pub ascending: bool,
}

impl Default for PaginationArgs {
    fn default() -> Self {
        Self {
            first: None,
            last: None,
            after: None,
            before: None,
            order_by: OrderBy::default(),
            ascending: true,
        }
    }
}

impl PaginationArgs {
    /// Whether rows are being fetched backwards from the end or from a `before` cursor
    pub fn is_backward(&self) -> bool {
        self.last.is_some() || (self.before.is_some() && self.first.is_none())
    }

    /// The number of rows to fetch, if limited
    pub fn limit(&self) -> Option<i64> {
        if self.is_backward() {
            self.last
        } else {
            self.first
        }
    }

    /// Whether the rows are fetched in ascending order
    fn fetch_ascending(&self) -> bool {
        self.ascending != self.is_backward()
    }

    /// Add the cursor conditions to the query
    ///
    /// `has_where` indicates whether the query already contains a `WHERE` clause.
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>, has_where: bool) {
        let mut has_where = has_where;

        if let Some(after) = &self.after {
            let operator = if self.ascending { ">" } else { "<" };
            self.push_keyset(builder, &mut has_where, operator, after);
        }

        if let Some(before) = &self.before {
            let operator = if self.ascending { "<" } else { ">" };
            self.push_keyset(builder, &mut has_where, operator, before);
        }
    }

    /// Add the ordering and limit to the query
    pub fn push_order_and_limit(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let direction = if self.fetch_ascending() { "ASC" } else { "DESC" };

        builder.push(" ORDER BY ");
        let mut separated = builder.separated(", ");
        for column in self.order_by.columns() {
            separated.push(format!("{column} {direction}"));
        }

        if let Some(limit) = self.limit() {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
    }

    fn push_keyset(
        &self,
        builder: &mut QueryBuilder<'_, Postgres>,
        has_where: &mut bool,
        operator: &str,
        values: &[CursorValue],
    ) {
        builder.push(if *has_where { " AND (" } else { " WHERE (" });
        *has_where = true;

        builder.push(self.order_by.columns().join(", "));
        builder.push(") ");
        builder.push(operator);
        builder.push(" (");

        let mut separated = builder.separated(", ");
        for value in values {
            match value.clone() {
                CursorValue::Int(v) => separated.push_bind(v),
                CursorValue::Text(v) => separated.push_bind(v),
                CursorValue::Timestamp(v) => separated.push_bind(v),
            };
        }
        separated.push_unseparated(")");
    }
}

/// Build an `ILIKE` pattern matching values that contain `query` literally
///
/// Must be used with `ESCAPE '\'` so the escaped wildcards are matched as-is.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::{contains_pattern, CursorValue, OrderBy, PaginationArgs};
    use chrono::{TimeZone, Utc};
    use sqlx::{Postgres, QueryBuilder};

    fn sql(args: &PaginationArgs) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        args.push_conditions(&mut builder, false);
        args.push_order_and_limit(&mut builder);
        builder.sql().to_owned()
    }

    #[test]
    fn first_page() {
        let args = PaginationArgs {
            first: Some(3),
            ..Default::default()
        };
        assert_eq!(sql(&args), "SELECT * FROM users ORDER BY id ASC LIMIT $1");
    }

    #[test]
    fn forward_after_cursor() {
        let args = PaginationArgs {
            first: Some(3),
            after: Some(vec![CursorValue::Int(2)]),
            ..Default::default()
        };
        assert_eq!(
            sql(&args),
            "SELECT * FROM users WHERE (id) > ($1) ORDER BY id ASC LIMIT $2"
        );
    }

    #[test]
    fn forward_descending() {
        let args = PaginationArgs {
            first: Some(3),
            after: Some(vec![CursorValue::Int(2)]),
            ascending: false,
            ..Default::default()
        };
        assert_eq!(
            sql(&args),
            "SELECT * FROM users WHERE (id) < ($1) ORDER BY id DESC LIMIT $2"
        );
    }

    #[test]
    fn backward_fetches_nearest_rows_first() {
        let args = PaginationArgs {
            last: Some(3),
            before: Some(vec![CursorValue::Int(9)]),
            ..Default::default()
        };
        assert!(args.is_backward());
        assert_eq!(
            sql(&args),
            "SELECT * FROM users WHERE (id) < ($1) ORDER BY id DESC LIMIT $2"
        );
    }

    #[test]
    fn backward_descending() {
        let args = PaginationArgs {
            last: Some(3),
            before: Some(vec![CursorValue::Int(9)]),
            ascending: false,
            ..Default::default()
        };
        assert_eq!(
            sql(&args),
            "SELECT * FROM users WHERE (id) > ($1) ORDER BY id ASC LIMIT $2"
        );
    }

    #[test]
    fn last_page_without_cursor() {
        let args = PaginationArgs {
            last: Some(2),
            ..Default::default()
        };
        assert_eq!(sql(&args), "SELECT * FROM users ORDER BY id DESC LIMIT $1");
    }

    #[test]
    fn unlimited() {
        let args = PaginationArgs::default();
        assert!(!args.is_backward());
        assert_eq!(args.limit(), None);
        assert_eq!(sql(&args), "SELECT * FROM users ORDER BY id ASC");
    }

    #[test]
    fn multiple_columns_with_existing_where() {
        let args = PaginationArgs {
            first: Some(10),
            after: Some(vec![
                CursorValue::Text(String::from("alice")),
                CursorValue::Int(4),
            ]),
            order_by: OrderBy::new(["username", "id"]),
            ..Default::default()
        };

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE site_admin");
        args.push_conditions(&mut builder, true);
        args.push_order_and_limit(&mut builder);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM users WHERE site_admin AND (username, id) > ($1, $2) ORDER BY username ASC, id ASC LIMIT $3"
        );
    }

    #[test]
    fn cursor_values_are_tagged() {
        let at = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let values = vec![
            CursorValue::from(at),
            CursorValue::from(7),
            CursorValue::from("seven"),
        ];

        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json[0]["type"], "timestamp");
        assert_eq!(json[1], serde_json::json!({ "type": "int", "value": 7 }));
        assert_eq!(json[2], serde_json::json!({ "type": "text", "value": "seven" }));

        let decoded: Vec<CursorValue> = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("ali"), "%ali%");
        assert_eq!(contains_pattern("_"), r"%\_%");
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
