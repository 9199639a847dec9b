//! WHERE clause compiler with null-aware rewrites.
//!
//! Unlike the generic [`Dialect::build_where`] path this emits final
//! placeholders directly (numbered from 1) and applies column-specific
//! rewrites. Today there is one rule: an upper-bound comparison (`<=`) on a
//! nullable end-of-validity column must not silently drop rows where the
//! column is NULL, so it is rendered as
//! `(end_date IS NOT NULL AND end_date <= $N)`.

use crate::compile::Compiled;
use crate::dialect::Dialect;
use crate::fragment::Fragment;
use crate::model::{Column, Op, Predicate};

/// Compiles AND-joined predicates into `WHERE (...) AND (...) `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereCompiler {
    nullable_upper_bounds: Vec<Column>,
}

impl Default for WhereCompiler {
    fn default() -> Self {
        Self {
            nullable_upper_bounds: vec![Column::new("end_date")],
        }
    }
}

impl WhereCompiler {
    /// Compiler with no rewrite rules.
    pub fn plain() -> Self {
        Self {
            nullable_upper_bounds: Vec::new(),
        }
    }

    /// Compiler that null-guards `<=` on each of `columns`.
    pub fn with_nullable_upper_bounds<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self {
            nullable_upper_bounds: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn nullable_upper_bounds(&self) -> &[Column] {
        &self.nullable_upper_bounds
    }

    fn is_nullable_upper_bound(&self, column: &Column) -> bool {
        self.nullable_upper_bounds.iter().any(|c| c == column)
    }

    /// Compile `predicates` for `dialect`.
    ///
    /// Returns an empty statement when no predicate survives. Otherwise the
    /// text is `WHERE (p1) AND (p2) ` (note the trailing space) and the
    /// arguments are numbered `1..=n` in predicate order. Predicates with an
    /// empty column or value are dropped and consume no number.
    pub fn compile(&self, dialect: &dyn Dialect, predicates: &[Predicate]) -> Compiled {
        let mut out = Fragment::empty();
        let mut emitted = 0usize;

        for p in predicates {
            if !p.is_compilable() {
                tracing::debug!(
                    target: "sqlparts.where",
                    column = %p.column,
                    op = %p.op,
                    "dropping predicate without column or value"
                );
                continue;
            }

            out.push(if emitted == 0 { "WHERE " } else { " AND " });
            out.push("(");
            if p.op == Op::Lte && self.is_nullable_upper_bound(&p.column) {
                out.push(p.column.as_str()).push(" IS NOT NULL AND ");
            }
            dialect.push_comparison(&mut out, &p.column, p.op, p.value.clone());
            out.push(")");
            emitted += 1;
        }

        if emitted == 0 {
            return Compiled::default();
        }

        out.push(" ");
        let (sql, args) = out.render(dialect, 1);
        Compiled { sql, args }
    }
}
