use super::*;
use chrono::NaiveDate;
use uuid::Uuid;

fn both() -> [Arc<dyn Dialect>; 2] {
    [DialectKind::Postgres.builder(), DialectKind::Sqlite.builder()]
}

#[test]
fn names_resolve() {
    for name in DialectKind::NAMES {
        assert!(dialect(name).is_ok(), "{name}");
    }
    assert_eq!(dialect("PostgreSQL").unwrap().kind(), DialectKind::Postgres);
    assert_eq!(dialect("sqlite3").unwrap().name(), "sqlite");
    assert!(matches!(
        dialect("mssql").unwrap_err(),
        SqlError::UnsupportedDialect(_)
    ));
}

#[test]
fn empty_inputs_give_empty_fragments() {
    for d in both() {
        assert!(d.build_select(&[]).is_empty());
        assert!(d.build_from(&Table::default()).is_empty());
        assert!(d.build_where(&[]).is_empty());
        assert!(d.build_group_by(&[]).is_empty());
        assert!(d.build_order_by(&[]).is_empty());
        assert!(d.build_limit(&Pagination::default()).is_empty());
        assert!(d.build_limit(&Pagination::new(-1, 10)).is_empty());
        assert!(d.build_insert_into(&Table::default()).is_empty());
        assert!(d.build_insert_columns(&[]).is_empty());
        assert!(d.build_values(&[]).is_empty());
    }
}

#[test]
fn keyword_and_body() {
    let d = Postgres;
    let cols = [Column::new("a"), Column::new("b")];

    assert_eq!(d.build_select(&cols).text(), "SELECT a, b");
    assert_eq!(d.build_from(&Table::new("t")).text(), "FROM t");
    assert_eq!(d.build_group_by(&cols).text(), "GROUP BY a, b");
    assert_eq!(d.build_insert_into(&Table::new("t")).text(), "INSERT INTO t");
    assert_eq!(d.build_insert_columns(&cols).text(), "(a, b)");

    let values = d.build_values(&[Value::Int(1), Value::from("x")]);
    assert_eq!(values.text(), "VALUES (?, ?)");
    assert_eq!(values.args(), &[Value::Int(1), Value::from("x")]);
}

#[test]
fn where_joins_with_and_and_skips_empty() {
    let preds = [
        Predicate::new("a", Op::Eq, 1),
        Predicate::new("", Op::Eq, 2),
        Predicate::new("b", Op::Ne, ""),
        Predicate::new("c", Op::Lt, 3),
    ];

    for d in both() {
        let f = d.build_where(&preds);
        assert_eq!(f.text(), "WHERE a = ? AND c < ?");
        assert_eq!(f.args(), &[Value::Int(1), Value::Int(3)]);
    }
}

#[test]
fn order_by_skips_empty_columns() {
    let order = [
        OrderBy::asc("start_date"),
        OrderBy::desc(""),
        OrderBy::desc("service_name"),
    ];
    let f = Postgres.build_order_by(&order);
    assert_eq!(f.text(), "ORDER BY start_date ASC, service_name DESC");
    assert!(f.args().is_empty());

    assert!(Postgres.build_order_by(&[OrderBy::asc("")]).is_empty());
}

#[test]
fn limit_with_and_without_offset() {
    let f = Postgres.build_limit(&Pagination::new(10, 0));
    assert_eq!(f.text(), "LIMIT ?");
    assert_eq!(f.args(), &[Value::Int(10)]);

    let f = Postgres.build_limit(&Pagination::new(10, 30));
    assert_eq!(f.text(), "LIMIT ? OFFSET ?");
    assert_eq!(f.args(), &[Value::Int(10), Value::Int(30)]);
}

#[test]
fn identifiers_are_never_bound() {
    for d in both() {
        assert!(d.build_from(&Table::new("subscriptions")).args().is_empty());
        assert!(d.build_group_by(&[Column::new("user_id")]).args().is_empty());
        assert!(
            d.build_insert_columns(&[Column::new("user_id")])
                .args()
                .is_empty()
        );
    }
}

#[test]
fn in_consumes_one_marker_per_dialect() {
    let preds = [Predicate::new("id", Op::In, vec![1, 2, 3])];

    let f = Postgres.build_where(&preds);
    assert_eq!(f.text(), "WHERE id = ANY(?)");
    assert_eq!(f.args(), &[Value::from(vec![1, 2, 3])]);

    let f = Sqlite.build_where(&preds);
    assert_eq!(f.text(), "WHERE id IN (SELECT value FROM json_each(?))");
    assert_eq!(f.args(), &[Value::from("[1,2,3]")]);
}

#[test]
fn placeholders() {
    assert_eq!(Postgres.placeholder(1), "$1");
    assert_eq!(Postgres.placeholder(12), "$12");
    assert_eq!(Sqlite.placeholder(1), "?");
    assert_eq!(Sqlite.placeholder(12), "?");
}

#[test]
fn sqlite_adapts_values_postgres_does_not() {
    let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let id = Uuid::nil();

    assert_eq!(Sqlite.bind_value(Value::Date(day)), Value::from("2025-07-01"));
    assert_eq!(Sqlite.bind_value(Value::Uuid(id)), Value::from(id.to_string()));
    assert_eq!(Sqlite.bind_value(Value::Bool(true)), Value::Int(1));
    assert_eq!(Sqlite.bind_value(Value::Int(5)), Value::Int(5));

    assert_eq!(Postgres.bind_value(Value::Date(day)), Value::Date(day));
}

#[test]
fn sqlite_lists_bind_as_json_text() {
    let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let list = Value::List(vec![Value::from("x"), Value::Int(2), Value::Date(day)]);
    assert_eq!(Sqlite.bind_value(list), Value::from(r#"["x",2,"2025-07-01"]"#));
    assert_eq!(Sqlite.bind_value(Value::List(Vec::new())), Value::from("[]"));
}

#[test]
fn marker_count_matches_args() {
    let preds = [
        Predicate::new("a", Op::Eq, 1),
        Predicate::new("b", Op::In, vec!["x", "y"]),
        Predicate::new("c", Op::Gte, 2.5),
    ];
    for d in both() {
        let f = d.build_where(&preds);
        assert_eq!(f.marker_count(), f.args().len());
        let f = d.build_values(&[Value::Null, Value::Int(1)]);
        assert_eq!(f.marker_count(), 2);
        assert_eq!(f.args().len(), 2);
    }
}
