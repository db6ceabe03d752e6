//! `CREATE TABLE` rendering, shared by every target engine through
//! `sql_migration_connector::render_create_table`.

mod create_table;

pub use create_table::CreateTable;
