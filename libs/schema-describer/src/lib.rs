//! The data-model half of the Inspector component: `TableSchema` and the
//! per-engine introspection queries that populate it.
//! Type mapping and DDL rendering live in `sql-migration-connector`, which
//! depends on this crate for the schema it renders.

mod describe;
mod getters;
mod model;
mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sample;

pub use describe::inspect_table;
pub use model::{Column, Index, TableSchema};
pub use sample::sample;
