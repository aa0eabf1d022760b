//! Tests for subqueries: each one is compiled in a scope of its own.

mod common;
use common::*;

use oxide_pathql::CompileError;

#[test]
fn subquery_does_not_reuse_outer_joins() {
    compiles_to(
        "SELECT users.address.city FROM users \
         WHERE users.id IN (SELECT users.id FROM users WHERE users.address.number = 66)",
        "SELECT __anon__0.city FROM users \
         INNER JOIN addresses AS __anon__0 ON users.address_id = __anon__0.id \
         WHERE users.id IN (SELECT users.id FROM users \
         INNER JOIN addresses AS __anon__1 ON users.address_id = __anon__1.id \
         WHERE __anon__1.number = 66)",
    );
}

#[test]
fn not_in_subquery() {
    compiles_to(
        "SELECT users.* FROM users \
         WHERE users.id NOT IN (SELECT users.id FROM users WHERE users.address.number = 66)",
        "SELECT users.* FROM users \
         WHERE users.id NOT IN (SELECT users.id FROM users \
         INNER JOIN addresses AS __anon__0 ON users.address_id = __anon__0.id \
         WHERE __anon__0.number = 66)",
    );
}

#[test]
fn exists_subquery() {
    compiles_to(
        "SELECT companies.name \
         WHERE EXISTS (SELECT 1 FROM goods WHERE goods.producer.address.city = 'Lyon')",
        "SELECT companies.name FROM companies \
         WHERE EXISTS (SELECT 1 FROM goods \
         INNER JOIN companies AS __anon__0 ON goods.producer_id = __anon__0.id \
         INNER JOIN addresses AS __anon__1 ON __anon__0.address_id = __anon__1.id \
         WHERE __anon__1.city = 'Lyon')",
    );
}

#[test]
fn scalar_subquery() {
    compiles_to(
        "SELECT users.first_name, \
         (SELECT COUNT(*) FROM transactions WHERE transactions.buyer.address.city = 'Paris') \
         FROM users",
        "SELECT users.first_name, \
         (SELECT COUNT(*) FROM transactions \
         INNER JOIN users AS __anon__0 ON transactions.buyer_id = __anon__0.id \
         INNER JOIN addresses AS __anon__1 ON __anon__0.address_id = __anon__1.id \
         WHERE __anon__1.city = 'Paris') \
         FROM users",
    );
}

#[test]
fn derived_table() {
    compiles_to(
        "SELECT t.total FROM (SELECT transactions.buyer.id AS buyer, COUNT(*) AS total \
         FROM transactions GROUP BY transactions.buyer.id) t",
        "SELECT t.total FROM (SELECT __anon__0.id AS buyer, COUNT(*) AS total \
         FROM transactions \
         INNER JOIN users AS __anon__0 ON transactions.buyer_id = __anon__0.id \
         GROUP BY __anon__0.id) AS t",
    );
}

#[test]
fn derived_table_has_no_properties() {
    let err = compile_err("SELECT t.buyer.id FROM (SELECT * FROM transactions) t");
    assert_eq!(
        err,
        CompileError::UnresolvableProperty {
            segment: String::from("buyer"),
            path: String::from("t.buyer"),
        }
    );
}

#[test]
fn outer_alias_is_not_visible_in_subquery() {
    let err = compile_err(
        "SELECT u.id FROM users u WHERE EXISTS (SELECT 1 FROM transactions WHERE u.id = transactions.seller_id)",
    );
    assert!(matches!(
        err,
        CompileError::UnknownIdentifier { ref segment, .. } if segment == "u"
    ));
}
