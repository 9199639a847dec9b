//! Per-dialect fragment builders.
//!
//! A [`Dialect`] turns each clause kind of the query model into a
//! [`Fragment`] written with dialect-neutral markers. Every operation follows
//! the same contract:
//!
//! - empty input (no items, empty table name, `limit <= 0`) gives an empty
//!   fragment;
//! - otherwise `KEYWORD body`, one marker per consumed value, in input order;
//! - predicates with an empty column or empty value and order items with an
//!   empty column are skipped and consume nothing.
//!
//! Dialects only differ in how things are spelled (placeholders, `IN`
//! rendering, value adaptation), never in argument order. The clause
//! builders are provided methods; implementations override the hooks.

mod postgres;
mod sqlite;

#[cfg(test)]
mod tests;

pub use postgres::Postgres;
pub use sqlite::Sqlite;

use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::model::{Column, Op, OrderBy, Pagination, Predicate, Table};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Postgres,
    Sqlite,
}

impl DialectKind {
    /// Every accepted configuration name, canonical name first per dialect.
    pub const NAMES: &'static [&'static str] = &["postgres", "postgresql", "sqlite", "sqlite3"];

    pub fn name(self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
            DialectKind::Sqlite => "sqlite",
        }
    }

    /// The shared, stateless builder for this dialect.
    pub fn builder(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::Postgres => Arc::new(Postgres),
            DialectKind::Sqlite => Arc::new(Sqlite),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            _ => Err(SqlError::UnsupportedDialect(s.to_string())),
        }
    }
}

/// Resolve a dialect from its configuration name.
pub fn dialect(name: &str) -> SqlResult<Arc<dyn Dialect>> {
    Ok(name.parse::<DialectKind>()?.builder())
}

/// Fragment builder capability set of one SQL dialect.
pub trait Dialect: fmt::Debug + Send + Sync {
    fn kind(&self) -> DialectKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Final placeholder for the 1-based argument `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Adapt a value before it is bound.
    fn bind_value(&self, value: Value) -> Value {
        value
    }

    /// Write `column op <marker>` and bind `value`.
    ///
    /// Must push exactly one marker.
    fn push_comparison(&self, out: &mut Fragment, column: &Column, op: Op, value: Value) {
        out.push(column.as_str())
            .push(" ")
            .push(op.as_sql())
            .push(" ")
            .push_bind(self.bind_value(value));
    }

    /// `SELECT a, b`
    fn build_select(&self, columns: &[Column]) -> Fragment {
        push_list(Fragment::new("SELECT "), columns)
    }

    /// `FROM t`
    fn build_from(&self, table: &Table) -> Fragment {
        if table.is_empty() {
            return Fragment::empty();
        }
        Fragment::new(format!("FROM {table}"))
    }

    /// `WHERE a = ? AND b < ?`
    fn build_where(&self, predicates: &[Predicate]) -> Fragment {
        let kept: Vec<&Predicate> = predicates.iter().filter(|p| p.is_compilable()).collect();
        if kept.is_empty() {
            return Fragment::empty();
        }

        let mut out = Fragment::new("WHERE ");
        out.push_joined(kept, " AND ", |out, p| {
            self.push_comparison(out, &p.column, p.op, p.value.clone());
        });
        out
    }

    /// `GROUP BY a, b`
    fn build_group_by(&self, columns: &[Column]) -> Fragment {
        push_list(Fragment::new("GROUP BY "), columns)
    }

    /// `ORDER BY a ASC, b DESC`
    fn build_order_by(&self, order: &[OrderBy]) -> Fragment {
        let kept: Vec<&OrderBy> = order.iter().filter(|o| !o.column.is_empty()).collect();
        if kept.is_empty() {
            return Fragment::empty();
        }

        let mut out = Fragment::new("ORDER BY ");
        out.push_joined(kept, ", ", |out, o| {
            out.push(o.column.as_str()).push(" ").push(o.dir.as_sql());
        });
        out
    }

    /// `LIMIT ?` or `LIMIT ? OFFSET ?`
    fn build_limit(&self, pagination: &Pagination) -> Fragment {
        if pagination.limit <= 0 {
            return Fragment::empty();
        }

        let mut out = Fragment::new("LIMIT ");
        out.push_bind(pagination.limit);
        if pagination.offset > 0 {
            out.push(" OFFSET ").push_bind(pagination.offset);
        }
        out
    }

    /// `INSERT INTO t`
    fn build_insert_into(&self, table: &Table) -> Fragment {
        if table.is_empty() {
            return Fragment::empty();
        }
        Fragment::new(format!("INSERT INTO {table}"))
    }

    /// `(a, b)`
    fn build_insert_columns(&self, columns: &[Column]) -> Fragment {
        let kept: Vec<&Column> = columns.iter().filter(|c| !c.is_empty()).collect();
        if kept.is_empty() {
            return Fragment::empty();
        }

        let mut out = Fragment::new("(");
        out.push_joined(kept, ", ", |out, c| {
            out.push(c.as_str());
        })
        .push(")");
        out
    }

    /// `VALUES (?, ?)`
    fn build_values(&self, values: &[Value]) -> Fragment {
        if values.is_empty() {
            return Fragment::empty();
        }

        let mut out = Fragment::new("VALUES (");
        out.push_joined(values, ", ", |out, v| {
            out.push_bind(self.bind_value(v.clone()));
        })
        .push(")");
        out
    }
}

fn push_list(mut out: Fragment, columns: &[Column]) -> Fragment {
    let kept: Vec<&Column> = columns.iter().filter(|c| !c.is_empty()).collect();
    if kept.is_empty() {
        return Fragment::empty();
    }
    out.push_joined(kept, ", ", |out, c| {
        out.push(c.as_str());
    });
    out
}
