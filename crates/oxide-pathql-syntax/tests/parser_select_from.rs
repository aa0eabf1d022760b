//! Tests for the FROM clause: table references, aliases, object paths,
//! derived tables, comma lists and all JOIN types.

mod common;
use common::*;

use oxide_pathql_syntax::ast::{JoinType, TableRef};

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| String::from(*s)).collect()
}

#[test]
fn from_simple_table() {
    let s = parse_select("SELECT * FROM users");
    assert_eq!(s.from.len(), 1);
    assert!(matches!(
        &s.from[0].table,
        TableRef::Table { path: p, alias: None } if p == &path(&["users"])
    ));
    round_trip("SELECT * FROM users");
}

#[test]
fn from_table_with_bare_alias() {
    let s = parse_select("SELECT * FROM users u");
    assert!(matches!(
        &s.from[0].table,
        TableRef::Table { alias: Some(a), .. } if a == "u"
    ));
    prints_as("SELECT * FROM users u", "SELECT * FROM users AS u");
}

#[test]
fn from_object_path_with_alias() {
    let s = parse_select("SELECT 1 FROM users.address.country country");
    assert!(matches!(
        &s.from[0].table,
        TableRef::Table { path: p, alias: Some(a) }
            if p == &path(&["users", "address", "country"]) && a == "country"
    ));
    round_trip("SELECT 1 FROM users.address.country AS country");
}

#[test]
fn from_reverse_path_with_markers() {
    let s = parse_select("SELECT 1 FROM users.\\seller.buyer.address customer_address");
    assert!(matches!(
        &s.from[0].table,
        TableRef::Table { path: p, .. } if p == &path(&["users", "\\seller", "buyer", "address"])
    ));
    prints_as(
        "SELECT 1 FROM `users`.`\\seller`.buyer.address customer_address",
        "SELECT 1 FROM users.\"\\seller\".buyer.address AS customer_address",
    );
}

#[test]
fn from_comma_separated() {
    let s = parse_select("SELECT * FROM users u, addresses a WHERE u.address_id = a.id");
    assert_eq!(s.from.len(), 2);
    assert!(s.from.iter().all(|item| item.join.is_none()));
    round_trip("SELECT * FROM users AS u, addresses AS a WHERE u.address_id = a.id");
}

#[test]
fn from_subquery_with_where() {
    let s = parse_select("SELECT t.id FROM (SELECT id FROM users WHERE active = 1) AS t");
    let TableRef::Subquery { query, alias } = &s.from[0].table else {
        panic!("Expected subquery");
    };
    assert_eq!(alias, "t");
    assert!(query.where_clause.is_some());
    round_trip("SELECT t.id FROM (SELECT id FROM users WHERE active = 1) AS t");
}

#[test]
fn join_types() {
    for (sql, expected) in [
        ("SELECT * FROM a JOIN b ON a.id = b.a_id", JoinType::Inner),
        ("SELECT * FROM a INNER JOIN b ON a.id = b.a_id", JoinType::Inner),
        ("SELECT * FROM a LEFT JOIN b ON a.id = b.a_id", JoinType::Left),
        ("SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.a_id", JoinType::Left),
        ("SELECT * FROM a RIGHT OUTER JOIN b ON a.id = b.a_id", JoinType::Right),
        ("SELECT * FROM a FULL JOIN b ON a.id = b.a_id", JoinType::Full),
        ("SELECT * FROM a CROSS JOIN b", JoinType::Cross),
    ] {
        let s = parse_select(sql);
        let join = s.from[1].join.as_ref().expect("joined item");
        assert_eq!(join.join_type, expected, "{sql}");
        round_trip(sql);
    }
}

#[test]
fn join_without_condition() {
    prints_as(
        "SELECT * FROM users user1 JOIN users user2",
        "SELECT * FROM users AS user1 INNER JOIN users AS user2",
    );
}

#[test]
fn join_using_multiple_columns() {
    let s = parse_select("SELECT * FROM a JOIN b USING (id, name)");
    let join = s.from[1].join.as_ref().expect("joined item");
    assert!(join.on.is_none());
    assert_eq!(join.using, vec!["id", "name"]);
    round_trip("SELECT * FROM a INNER JOIN b USING (id, name)");
}

#[test]
fn join_auto_path_with_extra_condition() {
    let s = parse_select(
        "SELECT users.* FROM users JOIN users.address.country ON users.address.country.code != 'IT'",
    );
    assert_eq!(s.from.len(), 2);
    assert!(matches!(
        &s.from[1].table,
        TableRef::Table { path: p, alias: None } if p.len() == 3
    ));
    round_trip(
        "SELECT users.* FROM users INNER JOIN users.address.country ON users.address.country.code != 'IT'",
    );
}

#[test]
fn join_chained_three_tables() {
    let s = parse_select(
        "SELECT * FROM a \
         JOIN b ON a.id = b.a_id \
         LEFT JOIN c ON b.id = c.b_id",
    );
    assert_eq!(s.from.len(), 3);
    assert_eq!(
        s.from[2].join.as_ref().map(|j| j.join_type),
        Some(JoinType::Left)
    );
}
