//! Statement orchestration.
//!
//! Combines the [`WhereCompiler`] output with the [`assemble`]d tail into one
//! statement and argument vector:
//!
//! ```text
//! SELECT * FROM <table> [WHERE (…) AND (…) ][ GROUP BY …][ ORDER BY …][ LIMIT $n[ OFFSET $n+1]]
//! SELECT <fn>(<column>) AS agg FROM <table> [WHERE (…) ]
//! INSERT INTO <table> (…) VALUES (…)[ RETURNING <column>]
//! ```
//!
//! `args[i]` always binds to placeholder `i + 1` (or the i-th `?`).

use crate::assemble::{ClausePart, assemble};
use crate::dialect::{Dialect, DialectKind};
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::model::{Column, InsertArgs, QueryArgs};
use crate::value::Value;
use crate::where_compiler::WhereCompiler;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Final SQL text plus the arguments for its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Compiled {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Compiled {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

impl fmt::Display for Compiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Aggregate function for [`Compiler::compile_aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFn {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggFn {
    pub fn as_sql(self) -> &'static str {
        match self {
            AggFn::Sum => "sum",
            AggFn::Count => "count",
            AggFn::Avg => "avg",
            AggFn::Min => "min",
            AggFn::Max => "max",
        }
    }
}

impl fmt::Display for AggFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for AggFn {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggFn::Sum),
            "count" => Ok(AggFn::Count),
            "avg" => Ok(AggFn::Avg),
            "min" => Ok(AggFn::Min),
            "max" => Ok(AggFn::Max),
            other => Err(SqlError::validation(format!("unknown aggregate function: {other}"))),
        }
    }
}

/// A dialect plus the WHERE rewrite rules, fixed at construction.
///
/// Cheap to clone and safe to share between tasks; every call only builds
/// local data.
#[derive(Debug, Clone)]
pub struct Compiler {
    dialect: Arc<dyn Dialect>,
    where_compiler: WhereCompiler,
}

impl Compiler {
    /// Compiler for the dialect named `dialect` (`"postgres"`, `"sqlite"`, ...).
    pub fn new(dialect: &str) -> SqlResult<Self> {
        Ok(Self::for_kind(dialect.parse()?))
    }

    pub fn for_kind(kind: DialectKind) -> Self {
        Self::with_dialect(kind.builder())
    }

    pub fn with_dialect(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            where_compiler: WhereCompiler::default(),
        }
    }

    /// Replace the WHERE rewrite rules.
    pub fn where_compiler(mut self, where_compiler: WhereCompiler) -> Self {
        self.where_compiler = where_compiler;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// `SELECT * FROM <table> ` + WHERE + GROUP BY/ORDER BY/LIMIT tail.
    pub fn compile_query(&self, args: &QueryArgs) -> Compiled {
        let filter = self.where_compiler.compile(self.dialect(), &args.filters);
        compose_query(self.dialect(), args, filter)
    }

    /// `SELECT <fn>(<column>) AS agg FROM <table> ` + WHERE.
    pub fn compile_aggregate(&self, column: &Column, agg: AggFn, args: &QueryArgs) -> Compiled {
        let filter = self.where_compiler.compile(self.dialect(), &args.filters);
        compose_aggregate(self.dialect(), column, agg, args, filter)
    }

    /// `INSERT INTO <table> (…) VALUES (…)`, optionally `RETURNING <column>`.
    pub fn compile_insert(&self, insert: &InsertArgs, returning: Option<&Column>) -> Compiled {
        let dialect = self.dialect();
        let mut compiled = assemble(dialect, ClausePart::INSERT, insert, 1);
        if let Some(column) = returning.filter(|c| !c.is_empty()) {
            compiled.sql.push_str(" RETURNING ");
            compiled.sql.push_str(column.as_str());
        }

        log_compiled("insert", dialect, &compiled.sql, compiled.args.len());
        compiled
    }

    /// Render a hand-built statement with placeholders numbered from 1.
    ///
    /// Bound values go through the dialect's value adaptation, like the
    /// ones the clause builders produce.
    pub fn compile_fragment(&self, kind: &'static str, fragment: Fragment) -> Compiled {
        let dialect = self.dialect();
        let (sql, args) = fragment.render(dialect, 1);
        let args: Vec<Value> = args.into_iter().map(|v| dialect.bind_value(v)).collect();

        log_compiled(kind, dialect, &sql, args.len());
        Compiled { sql, args }
    }
}

fn log_compiled(kind: &'static str, dialect: &dyn Dialect, sql: &str, arg_count: usize) {
    tracing::debug!(
        target: "sqlparts.sql",
        kind,
        dialect = dialect.name(),
        arg_count,
        sql = %sql,
        "compiled statement"
    );
}

/// Compile a row query with the default WHERE rules.
pub fn compile_query(args: &QueryArgs, dialect: &dyn Dialect) -> Compiled {
    let filter = WhereCompiler::default().compile(dialect, &args.filters);
    compose_query(dialect, args, filter)
}

/// Compile an aggregate query with the default WHERE rules.
pub fn compile_aggregate(
    column: &Column,
    agg: AggFn,
    args: &QueryArgs,
    dialect: &dyn Dialect,
) -> Compiled {
    let filter = WhereCompiler::default().compile(dialect, &args.filters);
    compose_aggregate(dialect, column, agg, args, filter)
}

fn compose_query(dialect: &dyn Dialect, args: &QueryArgs, filter: Compiled) -> Compiled {
    // The tail continues the numbering the WHERE clause left open.
    let tail = assemble(dialect, ClausePart::QUERY_TAIL, args, filter.args.len() + 1);

    let mut sql = format!("SELECT * FROM {} {}", args.table, filter.sql);
    if !tail.is_empty() {
        sql.push(' ');
        sql.push_str(&tail.sql);
    }

    let mut all_args = filter.args;
    all_args.extend(tail.args);
    log_compiled("query", dialect, &sql, all_args.len());
    Compiled { sql, args: all_args }
}

fn compose_aggregate(
    dialect: &dyn Dialect,
    column: &Column,
    agg: AggFn,
    args: &QueryArgs,
    filter: Compiled,
) -> Compiled {
    let sql = format!("SELECT {agg}({column}) AS agg FROM {} {}", args.table, filter.sql);
    log_compiled("aggregate", dialect, &sql, filter.args.len());
    Compiled {
        sql,
        args: filter.args,
    }
}

#[cfg(test)]
mod tests;
