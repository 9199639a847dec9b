//! Part assembler and placeholder renumbering.
//!
//! Builds the requested clause kinds in order through a [`Dialect`], joins
//! the non-empty fragments with single spaces and renders the markers as the
//! dialect's placeholders, continuing from a caller-supplied start index.
//! The WHERE compiler numbers `1..=n`; the tail assembled after it starts at
//! `n + 1`.

use crate::compile::Compiled;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::model::{Column, InsertArgs, QueryArgs};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Clause kinds the assembler knows how to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClausePart {
    Select,
    From,
    Where,
    GroupBy,
    OrderBy,
    Limit,
    InsertInto,
    InsertColumns,
    Values,
}

impl ClausePart {
    /// Tail of a row query, after the custom WHERE clause.
    pub const QUERY_TAIL: &'static [ClausePart] =
        &[ClausePart::GroupBy, ClausePart::OrderBy, ClausePart::Limit];

    /// Single-row INSERT.
    pub const INSERT: &'static [ClausePart] = &[
        ClausePart::InsertInto,
        ClausePart::InsertColumns,
        ClausePart::Values,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClausePart::Select => "select",
            ClausePart::From => "from",
            ClausePart::Where => "where",
            ClausePart::GroupBy => "group_by",
            ClausePart::OrderBy => "order_by",
            ClausePart::Limit => "limit",
            ClausePart::InsertInto => "insert_into",
            ClausePart::InsertColumns => "insert_columns",
            ClausePart::Values => "values",
        }
    }
}

impl fmt::Display for ClausePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClausePart {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        Ok(match s {
            "select" => ClausePart::Select,
            "from" => ClausePart::From,
            "where" => ClausePart::Where,
            "group_by" => ClausePart::GroupBy,
            "order_by" => ClausePart::OrderBy,
            "limit" => ClausePart::Limit,
            "insert_into" => ClausePart::InsertInto,
            "insert_columns" => ClausePart::InsertColumns,
            "values" => ClausePart::Values,
            other => return Err(SqlError::validation(format!("unknown clause part: {other}"))),
        })
    }
}

/// Something the assembler can pull clause fragments from.
pub trait PartSource {
    /// Fragment for `part`; parts the source has no data for are empty.
    fn fragment(&self, dialect: &dyn Dialect, part: ClausePart) -> Fragment;
}

impl PartSource for QueryArgs {
    fn fragment(&self, dialect: &dyn Dialect, part: ClausePart) -> Fragment {
        match part {
            ClausePart::Select => dialect.build_select(&self.select),
            ClausePart::From => dialect.build_from(&self.table),
            ClausePart::Where => dialect.build_where(&self.filters),
            ClausePart::GroupBy => dialect.build_group_by(&self.group_by),
            ClausePart::OrderBy => dialect.build_order_by(&self.order),
            ClausePart::Limit => dialect.build_limit(&self.pagination),
            ClausePart::InsertInto | ClausePart::InsertColumns | ClausePart::Values => {
                Fragment::empty()
            }
        }
    }
}

impl PartSource for InsertArgs {
    fn fragment(&self, dialect: &dyn Dialect, part: ClausePart) -> Fragment {
        match part {
            ClausePart::InsertInto => dialect.build_insert_into(&self.table),
            ClausePart::InsertColumns => {
                let columns: Vec<Column> = self.pairs().map(|(c, _)| c.clone()).collect();
                dialect.build_insert_columns(&columns)
            }
            ClausePart::Values => {
                let values: Vec<Value> = self.pairs().map(|(_, v)| v.clone()).collect();
                dialect.build_values(&values)
            }
            _ => Fragment::empty(),
        }
    }
}

/// Build `parts` from `source` and render them numbered from `start_index`.
///
/// Empty fragments are skipped entirely, so there are no stray separators.
/// The resulting placeholders run `start_index..start_index + args.len()`.
pub fn assemble(
    dialect: &dyn Dialect,
    parts: &[ClausePart],
    source: &dyn PartSource,
    start_index: usize,
) -> Compiled {
    let mut joined = Fragment::empty();

    for &part in parts {
        let fragment = source.fragment(dialect, part);
        debug_assert_eq!(
            fragment.marker_count(),
            fragment.args().len(),
            "{part} fragment out of alignment"
        );
        if fragment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(" ");
        }
        joined.push_fragment(fragment);
    }

    let (sql, args) = joined.render(dialect, start_index);
    Compiled { sql, args }
}
