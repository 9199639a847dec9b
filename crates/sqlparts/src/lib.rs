//! # sqlparts
//!
//! Compiles an abstract, backend-agnostic query description into
//! dialect-correct SQL with positional placeholders plus the matching ordered
//! argument vector.
//!
//! ## Features
//!
//! - **Abstract model**: `QueryArgs` holds the table, AND-joined predicates,
//!   ordering, grouping and pagination; nothing in it is SQL text
//! - **Dialects**: one `Dialect` per backend builds every clause kind
//!   (`$n` for Postgres, `?` for SQLite)
//! - **Null-aware WHERE**: `end_date <= $n` becomes
//!   `(end_date IS NOT NULL AND end_date <= $n)`
//! - **Single numbering**: independently built clauses share one placeholder
//!   sequence, `args[i]` binds to placeholder `i + 1`
//! - **Drivers**: `Driver` for `tokio_postgres::Client` and `Transaction`;
//!   NULL aggregates surface as `SqlError::NoData`
//!
//! ```ignore
//! use sqlparts::{Compiler, Op, QueryArgs};
//!
//! let compiler = Compiler::new("postgres")?;
//! let q = compiler.compile_query(
//!     &QueryArgs::new("subscriptions")
//!         .eq("user_id", user_id)
//!         .filter("end_date", Op::Lte, end)
//!         .order_by_asc("start_date")
//!         .limit(10),
//! );
//! // SELECT * FROM subscriptions WHERE (user_id = $1) AND
//! //   (end_date IS NOT NULL AND end_date <= $2)  ORDER BY start_date ASC LIMIT $3
//! let rows = client.fetch_all(&q.sql, &q.args).await?;
//! ```

pub mod assemble;
pub mod compile;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod fragment;
pub mod ident;
pub mod model;
pub mod pg;
pub mod subscription;
pub mod value;
pub mod where_compiler;

pub use assemble::{ClausePart, PartSource, assemble};
pub use compile::{AggFn, Compiled, Compiler, compile_aggregate, compile_query};
pub use dialect::{Dialect, DialectKind, Postgres, Sqlite, dialect};
pub use driver::{Driver, Executor, FromRow};
pub use error::{SqlError, SqlResult};
pub use fragment::Fragment;
pub use model::{
    Column, InsertArgs, Op, OrderBy, Pagination, Predicate, QueryArgs, SortDir, Table,
};
pub use subscription::{
    NewSubscription, SortColumn, SortRequest, Subscription, SubscriptionFilter,
    SubscriptionStore,
};
pub use value::Value;
pub use where_compiler::WhereCompiler;
