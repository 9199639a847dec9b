use super::*;
use crate::dialect::{Postgres, Sqlite};
use crate::model::Op;
use uuid::Uuid;

const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

fn user() -> Uuid {
    Uuid::parse_str(USER).unwrap()
}

fn pg() -> Compiler {
    Compiler::new("postgres").unwrap()
}

#[test]
fn empty_query_is_bare_select() {
    let c = compile_query(&QueryArgs::new("subscriptions"), &Postgres);
    assert_eq!(c.sql, "SELECT * FROM subscriptions ");
    assert!(c.args.is_empty());
}

#[test]
fn where_then_tail_numbering() {
    let args = QueryArgs::new("subscriptions")
        .eq("user_id", user())
        .order_by_asc("start_date")
        .limit(10);

    let c = compile_query(&args, &Postgres);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions WHERE (user_id = $1)  ORDER BY start_date ASC LIMIT $2"
    );
    assert_eq!(c.args, vec![Value::Uuid(user()), Value::Int(10)]);
}

#[test]
fn end_date_bound_in_full_query() {
    let args = QueryArgs::new("subscriptions")
        .eq("user_id", user())
        .filter("start_date", Op::Gte, "2025-01-01")
        .filter("end_date", Op::Lte, "2025-12-31");

    let c = pg().compile_query(&args);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions WHERE (user_id = $1) AND (start_date >= $2) AND (end_date IS NOT NULL AND end_date <= $3) "
    );
    assert_eq!(c.args.len(), 3);
}

#[test]
fn limit_and_offset_follow_filters() {
    let args = QueryArgs::new("subscriptions")
        .eq("service_name", "Netflix")
        .eq("monthly_price", 400)
        .limit(20)
        .offset(40);

    let c = pg().compile_query(&args);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions WHERE (service_name = $1) AND (monthly_price = $2)  LIMIT $3 OFFSET $4"
    );
    assert_eq!(
        c.args,
        vec![
            Value::from("Netflix"),
            Value::Int(400),
            Value::Int(20),
            Value::Int(40)
        ]
    );
}

#[test]
fn tail_without_filters_starts_at_one() {
    let args = QueryArgs::new("subscriptions")
        .order_by_desc("start_date")
        .limit(5)
        .offset(5);

    let c = pg().compile_query(&args);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions  ORDER BY start_date DESC LIMIT $1 OFFSET $2"
    );
}

#[test]
fn group_by_sits_before_order_by() {
    let args = QueryArgs::new("subscriptions")
        .group_by("service_name")
        .order_by_asc("service_name");

    let c = pg().compile_query(&args);
    assert!(c.sql.ends_with(" GROUP BY service_name ORDER BY service_name ASC"));
    assert!(c.args.is_empty());
}

#[test]
fn dropped_predicates_leave_no_gap() {
    let args = QueryArgs::new("subscriptions")
        .eq("service_name", "")
        .eq("", "orphan")
        .eq("user_id", user())
        .limit(1);

    let c = pg().compile_query(&args);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions WHERE (user_id = $1)  LIMIT $2"
    );
    assert_eq!(c.args.len(), 2);
}

#[test]
fn aggregate_uses_where_only() {
    let args = QueryArgs::new("subscriptions")
        .eq("user_id", user())
        .filter("end_date", Op::Lte, "2025-12-31")
        .order_by_asc("start_date")
        .limit(10);

    let c = compile_aggregate(&Column::new("monthly_price"), AggFn::Sum, &args, &Postgres);
    assert_eq!(
        c.sql,
        "SELECT sum(monthly_price) AS agg FROM subscriptions WHERE (user_id = $1) AND (end_date IS NOT NULL AND end_date <= $2) "
    );
    assert_eq!(c.args.len(), 2);
}

#[test]
fn aggregate_without_filters() {
    let c = pg().compile_aggregate(
        &Column::new("id"),
        AggFn::Count,
        &QueryArgs::new("subscriptions"),
    );
    assert_eq!(c.sql, "SELECT count(id) AS agg FROM subscriptions ");
    assert!(c.args.is_empty());
}

#[test]
fn agg_fn_parses_any_case() {
    assert_eq!("SUM".parse::<AggFn>().unwrap(), AggFn::Sum);
    assert_eq!(" avg ".parse::<AggFn>().unwrap(), AggFn::Avg);
    assert!("median".parse::<AggFn>().unwrap_err().is_validation());
}

#[test]
fn insert_with_returning() {
    let insert = InsertArgs::new("subscriptions")
        .set("user_id", user())
        .set("service_name", "Yandex Plus")
        .set("monthly_price", 400);

    let c = pg().compile_insert(&insert, Some(&Column::new("id")));
    assert_eq!(
        c.sql,
        "INSERT INTO subscriptions (user_id, service_name, monthly_price) VALUES ($1, $2, $3) RETURNING id"
    );
    assert_eq!(c.args.len(), 3);

    let c = pg().compile_insert(&insert, None);
    assert!(!c.sql.contains("RETURNING"));
}

#[test]
fn sqlite_keeps_argument_order() {
    let args = QueryArgs::new("subscriptions")
        .eq("user_id", user())
        .filter("end_date", Op::Lte, "2025-12-31")
        .order_by_asc("start_date")
        .limit(10)
        .offset(10);

    let lite = Compiler::new("sqlite").unwrap().compile_query(&args);
    assert_eq!(
        lite.sql,
        "SELECT * FROM subscriptions WHERE (user_id = ?) AND (end_date IS NOT NULL AND end_date <= ?)  ORDER BY start_date ASC LIMIT ? OFFSET ?"
    );

    let pg = pg().compile_query(&args);
    assert_eq!(lite.args.len(), pg.args.len());
    // Only the uuid is adapted to text; the rest binds identically.
    assert_eq!(lite.args[0], Value::Text(USER.to_string()));
    assert_eq!(lite.args[1..], pg.args[1..]);
}

#[test]
fn sqlite_in_binds_one_json_array() {
    let args = QueryArgs::new("subscriptions").filter(
        "service_name",
        Op::In,
        vec!["Netflix", "Spotify"],
    );

    let c = compile_query(&args, &Sqlite);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions WHERE (service_name IN (SELECT value FROM json_each(?))) "
    );
    assert_eq!(c.args, vec![Value::from(r#"["Netflix","Spotify"]"#)]);
}

#[test]
fn postgres_in_binds_one_array() {
    let args = QueryArgs::new("subscriptions")
        .filter("monthly_price", Op::In, vec![100, 200])
        .limit(3);

    let c = pg().compile_query(&args);
    assert_eq!(
        c.sql,
        "SELECT * FROM subscriptions WHERE (monthly_price = ANY($1))  LIMIT $2"
    );
    assert_eq!(
        c.args,
        vec![Value::from(vec![100, 200]), Value::Int(3)]
    );
}

#[test]
fn unknown_dialect_is_rejected() {
    let err = Compiler::new("oracle").unwrap_err();
    assert!(matches!(err, SqlError::UnsupportedDialect(ref name) if name == "oracle"));
}

#[test]
fn custom_where_rules() {
    let compiler = pg().where_compiler(WhereCompiler::plain());
    let args = QueryArgs::new("subscriptions").filter("end_date", Op::Lte, "2025-12-31");
    assert_eq!(
        compiler.compile_query(&args).sql,
        "SELECT * FROM subscriptions WHERE (end_date <= $1) "
    );
}

#[test]
fn compilation_is_deterministic() {
    let args = QueryArgs::new("subscriptions")
        .eq("user_id", user())
        .filter("end_date", Op::Lte, "2025-12-31")
        .order_by_desc("end_date")
        .limit(7)
        .offset(14);

    let compiler = pg();
    let first = compiler.compile_query(&args);
    for _ in 0..10 {
        assert_eq!(compiler.compile_query(&args), first);
    }
}

#[test]
fn compiler_is_shareable_across_threads() {
    let compiler = pg();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiler = compiler.clone();
            std::thread::spawn(move || {
                compiler
                    .compile_query(&QueryArgs::new("subscriptions").limit(i + 1))
                    .sql
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().unwrap().ends_with("LIMIT $1"));
    }
}
