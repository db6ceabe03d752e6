//! The Connector component: owns per-endpoint database handles keyed by an
//! opaque connection id, constructs engine-specific
//! connection strings, probes connectivity, and enumerates
//! databases/schemas and tables. The only crate in the workspace that knows
//! driver-level specifics for connect/close.

mod dsn;
mod handle;
mod registry;

pub use dsn::{mssql_jdbc_url, oracle_connect_string, quaint_url};
pub use handle::DbHandle;
pub use registry::Connector;
