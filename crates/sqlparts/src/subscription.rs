//! Subscription store.
//!
//! Translates loosely typed caller filters into [`QueryArgs`] and runs them
//! through an [`Executor`]. Sort columns go through the [`SortColumn`]
//! allow-list; nothing else a caller sends ends up as an identifier.

use crate::compile::{AggFn, Compiler};
use crate::driver::{Driver, Executor, FromRow};
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::model::{Column, InsertArgs, Op, OrderBy, Pagination, QueryArgs, SortDir};
use crate::value::Value;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Relation holding subscriptions.
pub const SUBSCRIPTIONS: &str = "subscriptions";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One user's subscription to a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub id: i64,
    pub user_id: Uuid,
    pub service_name: String,
    pub monthly_price: i32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

fn get<T>(row: &tokio_postgres::Row, column: &str) -> SqlResult<T>
where
    T: for<'a> tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column)
        .map_err(|e| SqlError::decode(column, e.to_string()))
}

impl Subscription {
    /// Checks applied before an update. The owner is never rewritten.
    pub fn validate(&self) -> SqlResult<()> {
        if self.id <= 0 {
            return Err(SqlError::validation("subscription id is required"));
        }
        check_terms(
            &self.service_name,
            self.monthly_price,
            self.start_date,
            self.end_date,
        )
    }
}

fn check_terms(
    service_name: &str,
    monthly_price: i32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> SqlResult<()> {
    if service_name.trim().is_empty() {
        return Err(SqlError::validation("service_name is required"));
    }
    if monthly_price < 0 {
        return Err(SqlError::validation("monthly_price must not be negative"));
    }
    if end_date.is_some_and(|end| end < start_date) {
        return Err(SqlError::validation("end_date is before start_date"));
    }
    Ok(())
}

impl FromRow<tokio_postgres::Row> for Subscription {
    fn from_row(row: &tokio_postgres::Row) -> SqlResult<Self> {
        Ok(Self {
            id: get(row, "id")?,
            user_id: get(row, "user_id")?,
            service_name: get(row, "service_name")?,
            monthly_price: get(row, "monthly_price")?,
            start_date: get(row, "start_date")?,
            end_date: get(row, "end_date")?,
        })
    }
}

/// Subscription to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub service_name: String,
    pub monthly_price: i32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl NewSubscription {
    pub fn validate(&self) -> SqlResult<()> {
        if self.user_id.is_nil() {
            return Err(SqlError::validation("no user is provided or it is invalid"));
        }
        check_terms(
            &self.service_name,
            self.monthly_price,
            self.start_date,
            self.end_date,
        )
    }

    pub fn to_insert(&self) -> InsertArgs {
        InsertArgs::new(SUBSCRIPTIONS)
            .set("user_id", self.user_id)
            .set("service_name", self.service_name.as_str())
            .set("monthly_price", self.monthly_price)
            .set("start_date", self.start_date)
            .set("end_date", self.end_date)
    }
}

/// Columns callers may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    UserId,
    ServiceName,
    StartDate,
    EndDate,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::UserId,
        SortColumn::ServiceName,
        SortColumn::StartDate,
        SortColumn::EndDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::UserId => "user_id",
            SortColumn::ServiceName => "service_name",
            SortColumn::StartDate => "start_date",
            SortColumn::EndDate => "end_date",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SqlError::validation(format!("cannot sort by '{s}'")))
    }
}

/// A requested sort, as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortRequest {
    pub order_by: String,
    pub order: String,
}

impl SortRequest {
    pub fn new(order_by: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            order_by: order_by.into(),
            order: order.into(),
        }
    }

    /// `None` for columns outside the allow-list.
    pub fn resolve(&self) -> Option<OrderBy> {
        let column: SortColumn = self.order_by.parse().ok()?;
        let dir = if self.order.eq_ignore_ascii_case("DESC") {
            SortDir::Desc
        } else {
            SortDir::Asc
        };
        Some(OrderBy {
            column: Column::new(column.as_str()),
            dir,
        })
    }
}

/// Caller filter; empty strings mean "not filtered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionFilter {
    pub user_id: String,
    pub service_name: String,
    pub start_date: String,
    pub end_date: String,
    pub order: Vec<SortRequest>,
}

impl SubscriptionFilter {
    /// Translate into query arguments over [`SUBSCRIPTIONS`].
    ///
    /// `start_date` keeps subscriptions starting on or after the date,
    /// `end_date` those ending on or before it. Unknown sort columns are
    /// skipped.
    pub fn to_query_args(&self) -> SqlResult<QueryArgs> {
        let mut args = QueryArgs::new(SUBSCRIPTIONS);

        if !self.user_id.is_empty() {
            let user_id = Uuid::parse_str(&self.user_id)
                .ok()
                .filter(|id| !id.is_nil())
                .ok_or_else(|| SqlError::validation("no user is provided or it is invalid"))?;
            args = args.eq("user_id", user_id);
        }
        if !self.service_name.is_empty() {
            args = args.eq("service_name", self.service_name.as_str());
        }
        if !self.start_date.is_empty() {
            args = args.filter("start_date", Op::Gte, parse_date("start_date", &self.start_date)?);
        }
        if !self.end_date.is_empty() {
            args = args.filter("end_date", Op::Lte, parse_date("end_date", &self.end_date)?);
        }

        for sort in &self.order {
            match sort.resolve() {
                Some(order) => args = args.order_by(order),
                None => tracing::debug!(
                    target: "sqlparts.where",
                    order_by = %sort.order_by,
                    "skipping sort on a column outside the allow-list"
                ),
            }
        }
        Ok(args)
    }
}

fn parse_date(field: &str, s: &str) -> SqlResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| SqlError::validation(format!("{field}: expected YYYY-MM-DD, got '{s}': {e}")))
}

/// Subscription queries on top of any [`Driver`].
pub struct SubscriptionStore<'a, D> {
    exec: Executor<'a, D>,
}

impl<'a, D: Driver> SubscriptionStore<'a, D>
where
    Subscription: FromRow<D::Row>,
{
    pub fn new(compiler: Compiler, driver: &'a D) -> Self {
        Self {
            exec: Executor::new(compiler, driver),
        }
    }

    /// Subscriptions matching `filter`, one page at a time.
    pub async fn query(
        &self,
        filter: &SubscriptionFilter,
        pagination: Pagination,
    ) -> SqlResult<Vec<Subscription>> {
        let args = filter.to_query_args()?.paginate(pagination);
        self.exec.query_as(&args).await
    }

    pub async fn get_by_id(&self, id: i64) -> SqlResult<Subscription> {
        let args = QueryArgs::new(SUBSCRIPTIONS).eq("id", id).limit(1);
        self.exec
            .query_as(&args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SqlError::no_data(format!("no such subscription: {id}")))
    }

    /// Sum of `monthly_price` over the matching subscriptions.
    ///
    /// [`SqlError::NoData`] when nothing matches.
    pub async fn total_price(&self, filter: &SubscriptionFilter) -> SqlResult<i64> {
        let args = filter.to_query_args()?;
        let total = self
            .exec
            .aggregate(&Column::new("monthly_price"), AggFn::Sum, &args)
            .await?;
        total
            .as_i64()
            .ok_or_else(|| SqlError::decode("agg", format!("expected an integer sum, got {total:?}")))
    }

    /// Insert `sub` and return its id.
    ///
    /// A second subscription of the same user to the same service is a
    /// [`SqlError::UniqueViolation`].
    pub async fn create(&self, sub: &NewSubscription) -> SqlResult<i64> {
        sub.validate()?;
        let id = self
            .exec
            .insert_returning(&sub.to_insert(), &Column::new("id"))
            .await?;
        match id {
            Value::Int(id) => Ok(id),
            other => Err(SqlError::decode("id", format!("expected an integer id, got {other:?}"))),
        }
    }

    /// Rewrite the service, price and dates of subscription `sub.id`.
    ///
    /// Returns the number of rows changed; an unknown id changes none.
    pub async fn update(&self, sub: &Subscription) -> SqlResult<u64> {
        sub.validate()?;
        let mut stmt = Fragment::new(format!(
            "UPDATE {SUBSCRIPTIONS} SET (service_name, monthly_price, start_date, end_date) = ("
        ));
        stmt.push_bind(sub.service_name.as_str())
            .push(", ")
            .push_bind(sub.monthly_price)
            .push(", ")
            .push_bind(sub.start_date)
            .push(", ")
            .push_bind(sub.end_date)
            .push(") WHERE id = ")
            .push_bind(sub.id);
        self.exec.execute("update", stmt).await
    }

    /// Delete subscription `id`.
    ///
    /// [`SqlError::NoData`] when no such subscription exists.
    pub async fn delete_by_id(&self, id: i64) -> SqlResult<()> {
        let mut stmt = Fragment::new(format!("DELETE FROM {SUBSCRIPTIONS} WHERE id = "));
        stmt.push_bind(id);
        match self.exec.execute("delete", stmt).await? {
            0 => Err(SqlError::no_data(format!("no such subscription: {id}"))),
            _ => Ok(()),
        }
    }
}
