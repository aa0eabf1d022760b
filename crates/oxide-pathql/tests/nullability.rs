//! Tests for nullable segments (`?name`) and LEFT JOIN propagation.

mod common;
use common::*;

#[test]
fn nullable_segment_is_left_joined() {
    compiles_to(
        "SELECT persons.* FROM persons WHERE persons.?parent_1.id IS NULL",
        "SELECT persons.* FROM persons \
         LEFT JOIN persons AS __anon__0 ON persons.parent_1_id = __anon__0.id \
         WHERE __anon__0.id IS NULL",
    );
}

#[test]
fn nullable_reverse_segment() {
    compiles_to(
        "SELECT * WHERE countries.\\?country.addresses.id IS NULL",
        "SELECT * FROM countries \
         LEFT JOIN addresses AS __anon__0 ON countries.id = __anon__0.country_id \
         WHERE __anon__0.id IS NULL",
    );
}

#[test]
fn nullability_propagates_to_later_segments() {
    compiles_to(
        "SELECT users.?address.country.code",
        "SELECT __anon__1.code FROM users \
         LEFT JOIN addresses AS __anon__0 ON users.address_id = __anon__0.id \
         LEFT JOIN countries AS __anon__1 ON __anon__0.country_id = __anon__1.id",
    );
}

#[test]
fn segments_before_the_nullable_one_stay_inner() {
    compiles_to(
        "SELECT users.employer.?address.country.code",
        "SELECT __anon__2.code FROM users \
         INNER JOIN companies AS __anon__0 ON users.employer_id = __anon__0.id \
         LEFT JOIN addresses AS __anon__1 ON __anon__0.address_id = __anon__1.id \
         LEFT JOIN countries AS __anon__2 ON __anon__1.country_id = __anon__2.id",
    );
}

#[test]
fn nullable_and_required_paths_are_joined_separately() {
    compiles_to(
        "SELECT users.?address.city, users.address.city",
        "SELECT __anon__0.city, __anon__1.city FROM users \
         LEFT JOIN addresses AS __anon__0 ON users.address_id = __anon__0.id \
         INNER JOIN addresses AS __anon__1 ON users.address_id = __anon__1.id",
    );
}

#[test]
fn path_from_nullable_alias_stays_left() {
    compiles_to(
        "SELECT a.country.code FROM users LEFT JOIN users.address a",
        "SELECT __anon__1.code FROM users \
         LEFT JOIN addresses AS a ON users.address_id = a.id \
         LEFT JOIN countries AS __anon__1 ON a.country_id = __anon__1.id",
    );
}

#[test]
fn nullable_marker_in_quoted_identifier() {
    compiles_to(
        "SELECT persons.\"?parent_1\".first_name",
        "SELECT __anon__0.first_name FROM persons \
         LEFT JOIN persons AS __anon__0 ON persons.parent_1_id = __anon__0.id",
    );
}

#[test]
fn path_from_outer_joined_table_stays_left() {
    compiles_to(
        "SELECT a.country.code FROM users u LEFT JOIN addresses a ON u.address_id = a.id",
        "SELECT __anon__0.code FROM users AS u \
         LEFT JOIN addresses AS a ON u.address_id = a.id \
         LEFT JOIN countries AS __anon__0 ON a.country_id = __anon__0.id",
    );
}

#[test]
fn full_join_makes_both_sides_left() {
    compiles_to(
        "SELECT u.address.city, c.address.city FROM users u FULL JOIN companies c ON c.id = u.employer_id",
        "SELECT __anon__0.city, __anon__1.city FROM users AS u \
         FULL JOIN companies AS c ON c.id = u.employer_id \
         LEFT JOIN addresses AS __anon__0 ON u.address_id = __anon__0.id \
         LEFT JOIN addresses AS __anon__1 ON c.address_id = __anon__1.id",
    );
}
