//! Driver boundary.
//!
//! A [`Driver`] executes compiled SQL with positional arguments: `args[i]`
//! binds to placeholder `i + 1` (`$i+1` or the i-th `?`). [`Executor`]
//! pairs a driver with a [`Compiler`] and adds the result semantics the
//! compilers leave to the caller, most notably mapping a NULL aggregate to
//! [`SqlError::NoData`].

use crate::compile::{AggFn, Compiled, Compiler};
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::model::{Column, InsertArgs, QueryArgs};
use crate::value::Value;

/// Something that can run compiled statements.
///
/// Implemented for `tokio_postgres::Client` and `Transaction` in [`crate::pg`].
pub trait Driver: Send + Sync {
    /// Row type produced by [`Driver::fetch_all`].
    type Row: Send;

    /// Execute a query and return all rows.
    fn fetch_all(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SqlResult<Vec<Self::Row>>> + Send;

    /// Execute a query and return the first column of the first row.
    ///
    /// `Ok(None)` when no row comes back; a SQL NULL is `Ok(Some(Value::Null))`.
    fn fetch_scalar(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SqlResult<Option<Value>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send;
}

/// Map one driver row into a domain type.
pub trait FromRow<R>: Sized {
    fn from_row(row: &R) -> SqlResult<Self>;
}

/// A [`Compiler`] bound to a driver.
pub struct Executor<'a, D> {
    compiler: Compiler,
    driver: &'a D,
}

impl<'a, D: Driver> Executor<'a, D> {
    pub fn new(compiler: Compiler, driver: &'a D) -> Self {
        Self { compiler, driver }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn driver(&self) -> &'a D {
        self.driver
    }

    /// Fetch every row matching `args`.
    pub async fn query_rows(&self, args: &QueryArgs) -> SqlResult<Vec<D::Row>> {
        let Compiled { sql, args } = self.compiler.compile_query(args);
        self.driver.fetch_all(&sql, &args).await
    }

    /// Fetch every row matching `args`, mapped through [`FromRow`].
    pub async fn query_as<T: FromRow<D::Row>>(&self, args: &QueryArgs) -> SqlResult<Vec<T>> {
        let rows = self.query_rows(args).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Aggregate `column` over the rows matching `args`.
    ///
    /// Returns [`SqlError::NoData`] when the aggregate is NULL, which is what
    /// `sum`/`avg`/`min`/`max` yield over zero rows. A real zero is `Ok`.
    pub async fn aggregate(&self, column: &Column, agg: AggFn, args: &QueryArgs) -> SqlResult<Value> {
        let Compiled { sql, args: binds } = self.compiler.compile_aggregate(column, agg, args);
        match self.driver.fetch_scalar(&sql, &binds).await? {
            None | Some(Value::Null) => {
                tracing::debug!(
                    target: "sqlparts.sql",
                    table = %args.table,
                    %column,
                    agg = agg.as_sql(),
                    "aggregate matched no data"
                );
                Err(SqlError::no_data(format!(
                    "{agg}({column}) over {} matched no rows",
                    args.table
                )))
            }
            Some(value) => Ok(value),
        }
    }

    /// Insert one row.
    pub async fn insert(&self, insert: &InsertArgs) -> SqlResult<u64> {
        let Compiled { sql, args } = self.compiler.compile_insert(insert, None);
        self.driver.execute(&sql, &args).await
    }

    /// Insert one row and return `column` of the inserted row.
    pub async fn insert_returning(&self, insert: &InsertArgs, column: &Column) -> SqlResult<Value> {
        let Compiled { sql, args } = self.compiler.compile_insert(insert, Some(column));
        self.driver
            .fetch_scalar(&sql, &args)
            .await?
            .ok_or_else(|| SqlError::no_data(format!("insert into {} returned no row", insert.table)))
    }

    /// Run a hand-built statement and return the number of affected rows.
    pub async fn execute(&self, kind: &'static str, statement: Fragment) -> SqlResult<u64> {
        let Compiled { sql, args } = self.compiler.compile_fragment(kind, statement);
        self.driver.execute(&sql, &args).await
    }
}

#[cfg(test)]
mod tests;
