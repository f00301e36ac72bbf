//! Property search query builder.
//!
//! Builds the property search statement from a
//! [`PropertyFilter`]. Every filter value is passed as a bound parameter;
//! only fixed column names and operators are ever written into the SQL text.
//!
//! Predicates are emitted in a fixed order (city, owner, minimum price,
//! maximum price, minimum rating). The first predicate appended is prefixed
//! with `WHERE` and the rest with `AND`, decided by how many parameters have
//! been bound so far. The limit is always the last parameter.

use crate::types::PropertyFilter;

const SELECT_PROPERTIES: &str = "SELECT properties.*, \
CAST(avg(property_reviews.rating) AS DOUBLE PRECISION) AS average_rating
FROM properties
JOIN property_reviews ON properties.id = property_reviews.property_id";

/// Placeholder and operator flavour of the target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// `$N` placeholders, `ILIKE`.
    Postgres,
    /// `?N` placeholders, `LIKE` (case-insensitive for ASCII).
    Sqlite,
}

impl SqlDialect {
    /// Returns the placeholder for the `n`th (1-based) parameter.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", n),
            SqlDialect::Sqlite => format!("?{}", n),
        }
    }

    /// Returns the placeholder for an integer parameter.
    ///
    /// PostgreSQL infers `INTEGER` from the compared column, so 64-bit binds
    /// need an explicit cast.
    pub fn integer_placeholder(&self, n: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}::BIGINT", n),
            SqlDialect::Sqlite => format!("?{}", n),
        }
    }

    fn case_insensitive_like(&self) -> &'static str {
        match self {
            SqlDialect::Postgres => "ILIKE",
            SqlDialect::Sqlite => "LIKE",
        }
    }
}

/// A SQL fragment with associated parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// The SQL string with positional placeholders.
    pub sql: String,
    /// The parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A SQL parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl SqlFragment {
    /// Creates a new fragment with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Returns the 1-based index the next bound parameter will take.
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// Appends a predicate bound to `param`.
    ///
    /// `predicate` receives the placeholder index and returns the condition.
    /// The condition is prefixed with `WHERE` if nothing has been bound yet,
    /// otherwise with `AND`.
    pub fn push_predicate(&mut self, predicate: impl FnOnce(usize) -> String, param: SqlParam) {
        let prefix = if self.params.is_empty() { "WHERE" } else { "AND" };
        let condition = predicate(self.next_index());
        self.sql.push('\n');
        self.sql.push_str(prefix);
        self.sql.push(' ');
        self.sql.push_str(&condition);
        self.params.push(param);
    }
}

/// Builds property search statements for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct PropertyQueryBuilder {
    dialect: SqlDialect,
}

impl PropertyQueryBuilder {
    /// Creates a builder for the given dialect.
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Builds the search statement for `filter`, capped at `limit` rows.
    pub fn build_search_query(&self, filter: &PropertyFilter, limit: u32) -> SqlFragment {
        let dialect = self.dialect;
        let mut fragment = SqlFragment::new(SELECT_PROPERTIES);

        if let Some(pattern) = filter.city_pattern() {
            fragment.push_predicate(
                |n| {
                    format!(
                        "properties.city {} {} ESCAPE '\\'",
                        dialect.case_insensitive_like(),
                        dialect.placeholder(n)
                    )
                },
                SqlParam::Text(pattern),
            );
        }

        if let Some(owner_id) = filter.owner() {
            fragment.push_predicate(
                |n| format!("properties.owner_id = {}", dialect.integer_placeholder(n)),
                SqlParam::Integer(owner_id),
            );
        }

        if let Some(cost) = filter.minimum_cost() {
            fragment.push_predicate(
                |n| format!("properties.cost_per_night > {}", dialect.integer_placeholder(n)),
                SqlParam::Integer(cost),
            );
        }

        if let Some(cost) = filter.maximum_cost() {
            fragment.push_predicate(
                |n| format!("properties.cost_per_night < {}", dialect.integer_placeholder(n)),
                SqlParam::Integer(cost),
            );
        }

        if let Some(rating) = filter.rating_floor() {
            fragment.push_predicate(
                |n| format!("property_reviews.rating > {}", dialect.integer_placeholder(n)),
                SqlParam::Integer(rating),
            );
        }

        let limit_index = fragment.next_index();
        fragment.params.push(SqlParam::Integer(i64::from(limit)));
        fragment.sql.push_str(&format!(
            "\nGROUP BY properties.id\nORDER BY properties.cost_per_night\nLIMIT {}",
            dialect.integer_placeholder(limit_index)
        ));

        fragment
    }
}
