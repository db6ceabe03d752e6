//! Shared foundation for every crate in the workspace: the engine enum, the
//! endpoint configuration type, the error model, and the engine-agnostic row
//! representation. Nothing in here talks to a database; it exists so that
//! `db-connector`, `schema-describer`, `sql-migration-connector` and
//! `migration-core` agree on one vocabulary instead of each rolling its own.

mod engine;
mod error;
mod value;

pub use engine::{ConnectionId, EndpointConfig, EngineKind, JobId};
pub use error::{render_error_chain, ConnectOutcome, ConnectorError, ConnectorResult};
pub use value::{DbRow, DbValue};
