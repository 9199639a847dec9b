//! PostgreSQL driver on top of `tokio-postgres`.

use crate::driver::Driver;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, WrongType, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encode `v` as `T`, refusing parameter types `T` has no wire format for.
fn encode<T: ToSql>(v: T, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if !T::accepts(ty) {
        return Err(Box::new(WrongType::new::<T>(ty.clone())));
    }
    v.to_sql(ty, out)
}

fn is_text(ty: &Type) -> bool {
    <&str as ToSql>::accepts(ty)
}

impl ToSql for Value {
    /// Binds by the parameter type the server inferred.
    ///
    /// Scalars sent to a text parameter are rendered as text; text sent to a
    /// numeric, boolean, uuid, date or timestamptz parameter is parsed. Any
    /// other mismatch is a [`WrongType`] error.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Text(s) => match *ty {
                Type::UUID => encode(Uuid::parse_str(s)?, ty, out),
                Type::DATE => encode(NaiveDate::parse_from_str(s, DATE_FORMAT)?, ty, out),
                Type::TIMESTAMPTZ => encode(
                    DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc),
                    ty,
                    out,
                ),
                Type::INT2 => encode(s.trim().parse::<i16>()?, ty, out),
                Type::INT4 => encode(s.trim().parse::<i32>()?, ty, out),
                Type::INT8 => encode(s.trim().parse::<i64>()?, ty, out),
                Type::FLOAT4 => encode(s.trim().parse::<f32>()?, ty, out),
                Type::FLOAT8 => encode(s.trim().parse::<f64>()?, ty, out),
                Type::BOOL => encode(s.trim().parse::<bool>()?, ty, out),
                _ => encode(s.as_str(), ty, out),
            },
            Value::List(items) => match ty.kind() {
                Kind::Array(_) => items.to_sql(ty, out),
                _ => Err(format!("cannot bind a list to a {ty} parameter").into()),
            },
            Value::Bool(v) if is_text(ty) => encode(v.to_string(), ty, out),
            Value::Int(v) if is_text(ty) => encode(v.to_string(), ty, out),
            Value::Float(v) if is_text(ty) => encode(v.to_string(), ty, out),
            Value::Uuid(v) if is_text(ty) => encode(v.to_string(), ty, out),
            Value::Date(v) if is_text(ty) => encode(v.format(DATE_FORMAT).to_string(), ty, out),
            Value::Timestamp(v) if is_text(ty) => encode(v.to_rfc3339(), ty, out),
            Value::Bool(v) => encode(*v, ty, out),
            // Integers arrive as i64; narrow to whatever the column wants.
            Value::Int(v) => match *ty {
                Type::INT2 => encode(i16::try_from(*v)?, ty, out),
                Type::INT4 => encode(i32::try_from(*v)?, ty, out),
                Type::FLOAT4 => encode(*v as f32, ty, out),
                Type::FLOAT8 => encode(*v as f64, ty, out),
                _ => encode(*v, ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => encode(*v as f32, ty, out),
                _ => encode(*v, ty, out),
            },
            Value::Uuid(v) => encode(*v, ty, out),
            Value::Date(v) => encode(*v, ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => encode(v.naive_utc(), ty, out),
                _ => encode(*v, ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Decode column `idx` of `row` into a [`Value`].
///
/// NUMERIC and other types without a lossless mapping are rejected; cast them
/// in the query (`sum(x)::bigint`, `avg(x)::float8`).
pub fn column_value(row: &Row, idx: usize) -> SqlResult<Value> {
    let column = row
        .columns()
        .get(idx)
        .ok_or_else(|| SqlError::decode(idx.to_string(), "column index out of range"))?;
    let name = column.name();
    let err = |e: tokio_postgres::Error| SqlError::decode(name, e.to_string());

    let value = match *column.type_() {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map_err(err)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map_err(err)?.into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map_err(err)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map_err(err)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map_err(err)?.into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map_err(err)?.into(),
        Type::TEXT | Type::VARCHAR | Type::NAME | Type::BPCHAR => {
            row.try_get::<_, Option<String>>(idx).map_err(err)?.into()
        }
        Type::UUID => row.try_get::<_, Option<Uuid>>(idx).map_err(err)?.into(),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx).map_err(err)?.into(),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(err)?
            .into(),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(err)?
            .map(|t| t.and_utc())
            .into(),
        ref other => {
            return Err(SqlError::decode(
                name,
                format!("unsupported column type {other}; cast it in the query"),
            ));
        }
    };
    Ok(value)
}

/// Decode every column of `row`.
pub fn row_values(row: &Row) -> SqlResult<Vec<Value>> {
    (0..row.len()).map(|idx| column_value(row, idx)).collect()
}

macro_rules! impl_driver {
    ($ty:ty) => {
        impl Driver for $ty {
            type Row = Row;

            async fn fetch_all(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>> {
                let params = params(args);
                <$ty>::query(self, sql, &params)
                    .await
                    .map_err(SqlError::from_db_error)
            }

            async fn fetch_scalar(&self, sql: &str, args: &[Value]) -> SqlResult<Option<Value>> {
                let rows = Driver::fetch_all(self, sql, args).await?;
                rows.first().map(|row| column_value(row, 0)).transpose()
            }

            async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
                let params = params(args);
                <$ty>::execute(self, sql, &params)
                    .await
                    .map_err(SqlError::from_db_error)
            }
        }
    };
}

impl_driver!(tokio_postgres::Client);
impl_driver!(tokio_postgres::Transaction<'_>);
