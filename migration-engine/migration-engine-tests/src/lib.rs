//! Test harness for the Connector/Inspector/Migrator trio. Mirrors the
//! upstream engine's `TestApi`: one place that knows how to stand up real
//! endpoints from environment configuration and drive the public commands
//! against them, so individual test functions stay short.
//!
//! Every test that opens a real connection is `#[ignore]`d — this harness
//! assumes a reachable MySQL/Postgres/SQL Server/Oracle instance and is
//! meant to be run explicitly (`cargo test -- --ignored`) against a docker
//! compose stack, not in a default `cargo test` pass.

pub mod assertions;
pub mod helpers;
pub mod progress;

pub use helpers::{endpoint_from_env, MigrationTestApi};
pub use progress::ProgressCollector;
