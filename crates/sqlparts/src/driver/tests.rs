use super::*;
use std::sync::Mutex;

/// Records every statement and replays canned results.
#[derive(Default)]
struct Recorder {
    rows: Vec<Vec<Value>>,
    scalar: Option<Value>,
    seen: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Recorder {
    fn with_scalar(scalar: Option<Value>) -> Self {
        Self {
            scalar,
            ..Self::default()
        }
    }

    fn record(&self, sql: &str, args: &[Value]) {
        self.seen
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
    }

    fn last(&self) -> (String, Vec<Value>) {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl Driver for Recorder {
    type Row = Vec<Value>;

    async fn fetch_all(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Vec<Value>>> {
        self.record(sql, args);
        Ok(self.rows.clone())
    }

    async fn fetch_scalar(&self, sql: &str, args: &[Value]) -> SqlResult<Option<Value>> {
        self.record(sql, args);
        Ok(self.scalar.clone())
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
        self.record(sql, args);
        Ok(1)
    }
}

#[derive(Debug, PartialEq)]
struct Named(String);

impl FromRow<Vec<Value>> for Named {
    fn from_row(row: &Vec<Value>) -> SqlResult<Self> {
        row.first()
            .and_then(Value::as_str)
            .map(|s| Named(s.to_string()))
            .ok_or_else(|| SqlError::decode("name", "expected text"))
    }
}

fn pg() -> Compiler {
    Compiler::new("postgres").unwrap()
}

fn price() -> Column {
    Column::new("monthly_price")
}

#[tokio::test]
async fn null_aggregate_is_no_data() {
    let driver = Recorder::with_scalar(Some(Value::Null));
    let exec = Executor::new(pg(), &driver);

    let err = exec
        .aggregate(&price(), AggFn::Sum, &QueryArgs::new("subscriptions"))
        .await
        .unwrap_err();
    assert!(err.is_no_data());
}

#[tokio::test]
async fn missing_row_is_no_data() {
    let driver = Recorder::with_scalar(None);
    let exec = Executor::new(pg(), &driver);

    let err = exec
        .aggregate(&price(), AggFn::Max, &QueryArgs::new("subscriptions"))
        .await
        .unwrap_err();
    assert!(err.is_no_data());
}

#[tokio::test]
async fn zero_aggregate_is_a_value() {
    let driver = Recorder::with_scalar(Some(Value::Int(0)));
    let exec = Executor::new(pg(), &driver);

    let total = exec
        .aggregate(&price(), AggFn::Sum, &QueryArgs::new("subscriptions"))
        .await
        .unwrap();
    assert_eq!(total, Value::Int(0));
}

#[tokio::test]
async fn aggregate_sends_compiled_statement() {
    let driver = Recorder::with_scalar(Some(Value::Int(1200)));
    let exec = Executor::new(pg(), &driver);
    let args = QueryArgs::new("subscriptions").eq("service_name", "Netflix");

    exec.aggregate(&price(), AggFn::Sum, &args).await.unwrap();

    let (sql, binds) = driver.last();
    assert_eq!(
        sql,
        "SELECT sum(monthly_price) AS agg FROM subscriptions WHERE (service_name = $1) "
    );
    assert_eq!(binds, vec![Value::from("Netflix")]);
}

#[tokio::test]
async fn query_as_maps_rows() {
    let driver = Recorder {
        rows: vec![vec![Value::from("Netflix")], vec![Value::from("Spotify")]],
        ..Recorder::default()
    };
    let exec = Executor::new(pg(), &driver);

    let names: Vec<Named> = exec
        .query_as(&QueryArgs::new("subscriptions").limit(2))
        .await
        .unwrap();
    assert_eq!(
        names,
        vec![Named("Netflix".to_string()), Named("Spotify".to_string())]
    );
    assert_eq!(driver.last().1, vec![Value::Int(2)]);
}

#[tokio::test]
async fn query_as_surfaces_decode_errors() {
    let driver = Recorder {
        rows: vec![vec![Value::Int(1)]],
        ..Recorder::default()
    };
    let exec = Executor::new(pg(), &driver);

    let err = exec
        .query_as::<Named>(&QueryArgs::new("subscriptions"))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlError::Decode { .. }));
}

#[tokio::test]
async fn insert_returning_needs_a_row() {
    let insert = InsertArgs::new("subscriptions").set("service_name", "Netflix");

    let driver = Recorder::with_scalar(Some(Value::Int(7)));
    let id = Executor::new(pg(), &driver)
        .insert_returning(&insert, &Column::new("id"))
        .await
        .unwrap();
    assert_eq!(id, Value::Int(7));
    assert_eq!(
        driver.last().0,
        "INSERT INTO subscriptions (service_name) VALUES ($1) RETURNING id"
    );

    let driver = Recorder::with_scalar(None);
    let err = Executor::new(pg(), &driver)
        .insert_returning(&insert, &Column::new("id"))
        .await
        .unwrap_err();
    assert!(err.is_no_data());
}

#[tokio::test]
async fn plain_insert_executes() {
    let driver = Recorder::default();
    let affected = Executor::new(pg(), &driver)
        .insert(&InsertArgs::new("subscriptions").set("monthly_price", 100))
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(
        driver.last().0,
        "INSERT INTO subscriptions (monthly_price) VALUES ($1)"
    );
}
