//! The Migrator: table-by-table copy job orchestration on a bounded worker
//! pool, built on the Connector (`db-connector`) and the
//! Inspector (`schema-describer` + `sql-migration-connector`).

mod bulk_load;
mod commands;
mod job;
mod migrator;
mod progress;
mod registry;
mod table_copy;

pub use commands::{
    CancelCommand, CancelInput, CancelOutput, MigrationCommand, StartMigrationCommand, StartMigrationInput,
    StartMigrationOutput,
};
pub use job::{FailedTable, JobReport, JobStatus, MigrationJob};
pub use migrator::{Migrator, StartedJob};
pub use progress::ProgressSink;
