use super::{Dialect, DialectKind};
use crate::fragment::Fragment;
use crate::model::{Column, Op};
use crate::value::Value;

/// PostgreSQL: numbered `$n` placeholders, `IN` bound as one array.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn push_comparison(&self, out: &mut Fragment, column: &Column, op: Op, value: Value) {
        match op {
            // `col IN $1` is not valid Postgres; compare against the array instead.
            Op::In => {
                out.push(column.as_str())
                    .push(" = ANY(")
                    .push_bind(value)
                    .push(")");
            }
            _ => {
                out.push(column.as_str())
                    .push(" ")
                    .push(op.as_sql())
                    .push(" ")
                    .push_bind(value);
            }
        }
    }
}
