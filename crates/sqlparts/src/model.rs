//! Abstract query model.
//!
//! Plain values describing *what* to fetch: table, AND-joined predicates,
//! ordering, grouping and pagination. Nothing here knows about SQL dialects.
//! Construction never fails; compilers tolerate any shape (see
//! [`QueryArgs::validate`] for callers that want to reject bad input early).

use crate::error::{SqlError, SqlResult};
use crate::ident::check_ident;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the queried relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table(String);

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Table {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Table {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Column identifier, rendered verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Column(String);

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Column {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Column {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Comparison operator of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "IN", alias = "in")]
    In,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Lte => "<=",
            Op::Gte => ">=",
            Op::In => "IN",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Op {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.trim() {
            "=" => Ok(Op::Eq),
            "!=" | "<>" => Ok(Op::Ne),
            "<" => Ok(Op::Lt),
            ">" => Ok(Op::Gt),
            "<=" => Ok(Op::Lte),
            ">=" => Ok(Op::Gte),
            other if other.eq_ignore_ascii_case("in") => Ok(Op::In),
            other => Err(SqlError::validation(format!("unknown operator: {other}"))),
        }
    }
}

/// One `column op value` condition. Predicates of a query are AND-joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: Column,
    pub op: Op,
    #[serde(default)]
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<Column>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// A predicate is compiled only when it has a column and a non-empty value.
    pub fn is_compilable(&self) -> bool {
        !self.column.is_empty() && !self.value.is_empty()
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: Column,
    #[serde(default)]
    pub dir: SortDir,
}

impl OrderBy {
    pub fn asc(column: impl Into<Column>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(column: impl Into<Column>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Desc,
        }
    }
}

/// LIMIT/OFFSET pair. `limit <= 0` means unbounded (no LIMIT clause).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Page-number based pagination (1-based `page`).
    pub fn page(page: i64, per_page: i64) -> Self {
        let page = page.max(1);
        Self {
            limit: per_page,
            offset: (page - 1).saturating_mul(per_page.max(0)),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit <= 0
    }
}

/// Everything needed to compile a SELECT or aggregate statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryArgs {
    pub table: Table,
    /// Projection; empty means the orchestration's own column list.
    pub select: Vec<Column>,
    pub filters: Vec<Predicate>,
    pub group_by: Vec<Column>,
    pub order: Vec<OrderBy>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl QueryArgs {
    pub fn new(table: impl Into<Table>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, column: impl Into<Column>, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(Predicate::new(column, op, value));
        self
    }

    pub fn eq(self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.filter(column, Op::Eq, value)
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn order_by_asc(self, column: impl Into<Column>) -> Self {
        self.order_by(OrderBy::asc(column))
    }

    pub fn order_by_desc(self, column: impl Into<Column>) -> Self {
        self.order_by(OrderBy::desc(column))
    }

    pub fn group_by(mut self, column: impl Into<Column>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn select(mut self, column: impl Into<Column>) -> Self {
        self.select.push(column.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.pagination.limit = limit;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.pagination.offset = offset;
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Reject input the compilers would otherwise drop or render blindly.
    ///
    /// Checks identifiers (table, projection, filters, grouping, ordering),
    /// filter values and pagination bounds.
    pub fn validate(&self) -> SqlResult<()> {
        check_ident("table", self.table.as_str())?;
        for c in &self.select {
            check_ident("select column", c.as_str())?;
        }
        for p in &self.filters {
            check_ident("filter column", p.column.as_str())?;
            if p.value.is_empty() {
                return Err(SqlError::validation(format!(
                    "filter on '{}' has no value",
                    p.column
                )));
            }
            if p.op == Op::In && !matches!(p.value, Value::List(_)) {
                return Err(SqlError::validation(format!(
                    "IN filter on '{}' needs a list value",
                    p.column
                )));
            }
        }
        for c in &self.group_by {
            check_ident("group column", c.as_str())?;
        }
        for o in &self.order {
            check_ident("order column", o.column.as_str())?;
        }
        if self.pagination.limit < 0 {
            return Err(SqlError::validation("limit must not be negative"));
        }
        if self.pagination.offset < 0 {
            return Err(SqlError::validation("offset must not be negative"));
        }
        Ok(())
    }
}

/// Single-row INSERT description. Columns and values pair up by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertArgs {
    pub table: Table,
    pub columns: Vec<Column>,
    pub values: Vec<Value>,
}

impl InsertArgs {
    pub fn new(table: impl Into<Table>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn set(mut self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.columns.push(column.into());
        self.values.push(value.into());
        self
    }

    /// Column/value pairs that survive compilation (non-empty column).
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (&Column, &Value)> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .filter(|(c, _)| !c.is_empty())
    }
}
