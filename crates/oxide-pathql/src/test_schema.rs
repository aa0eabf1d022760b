use crate::schema::{DatabaseSchema, TableSchema};

/// Countries, addresses, companies, users, goods, transactions and a
/// self-referencing persons table.
pub fn shop() -> DatabaseSchema {
    DatabaseSchema::new()
        .table(TableSchema::new("countries").columns(["id", "name", "code"]))
        .table(
            TableSchema::new("addresses")
                .column("id")
                .references("country_id", "countries")
                .columns(["city", "zip_code", "street", "number"]),
        )
        .table(
            TableSchema::new("companies")
                .column("id")
                .references("address_id", "addresses")
                .columns(["name", "website"]),
        )
        .table(
            TableSchema::new("users")
                .column("id")
                .references("address_id", "addresses")
                .references("employer_id", "companies")
                .columns(["first_name", "last_name"]),
        )
        .table(
            TableSchema::new("goods")
                .column("id")
                .references("producer_id", "companies")
                .columns(["name", "description", "price"]),
        )
        .table(
            TableSchema::new("transactions")
                .column("id")
                .references("seller_id", "users")
                .references("buyer_id", "users")
                .references("good_id", "goods")
                .column("date"),
        )
        .table(
            TableSchema::new("persons")
                .column("id")
                .references("parent_1_id", "persons")
                .references("parent_2_id", "persons")
                .columns(["first_name", "last_name"]),
        )
}
