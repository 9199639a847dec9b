use super::{Dialect, DialectKind};
use crate::fragment::Fragment;
use crate::model::{Column, Op};
use crate::value::Value;

/// SQLite: positional `?` placeholders.
///
/// SQLite has no array or native date/uuid binding, so those values are sent
/// as text (lists as a JSON array unpacked with `json_each`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn bind_value(&self, value: Value) -> Value {
        match value {
            Value::Bool(b) => Value::Int(i64::from(b)),
            Value::Uuid(u) => Value::Text(u.to_string()),
            Value::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
            Value::Timestamp(ts) => Value::Text(ts.to_rfc3339()),
            Value::List(items) => Value::Text(
                serde_json::to_string(&items).expect("a list of values always serializes to JSON"),
            ),
            other => other,
        }
    }

    fn push_comparison(&self, out: &mut Fragment, column: &Column, op: Op, value: Value) {
        let value = self.bind_value(value);
        match op {
            Op::In => {
                out.push(column.as_str())
                    .push(" IN (SELECT value FROM json_each(")
                    .push_bind(value)
                    .push("))");
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
