use db_connector::Connector;
use migration_connector::{ConnectionId, ConnectOutcome, EndpointConfig, EngineKind};
use migration_core::{Migrator, StartedJob};
use std::env;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_port(key: &str, default: u16) -> u16 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Builds an [`EndpointConfig`] for `engine` from `TEST_<PREFIX>_*`
/// environment variables, falling back to the conventional default port and
/// a `test`/`test` credential pair used by the project's docker compose
/// stack. `prefix` disambiguates source vs. target when both endpoints are
/// the same engine kind (e.g. a Postgres-to-Postgres scenario).
pub fn endpoint_from_env(engine: EngineKind, prefix: &str) -> EndpointConfig {
    let default_port = match engine {
        EngineKind::Mysql => 3306,
        EngineKind::Postgres => 5432,
        EngineKind::SqlServer => 1433,
        EngineKind::Oracle => 1521,
    };

    let host = env_or(&format!("TEST_{}_HOST", prefix), "127.0.0.1");
    let port = env_port(&format!("TEST_{}_PORT", prefix), default_port);
    let username = env_or(&format!("TEST_{}_USER", prefix), "test");
    let password = env_or(&format!("TEST_{}_PASSWORD", prefix), "test");
    let service_name = if engine == EngineKind::Oracle {
        Some(env_or(&format!("TEST_{}_SERVICE_NAME", prefix), "ORCLPDB1"))
    } else {
        None
    };

    EndpointConfig::new(engine, host, port, username, password, service_name)
        .expect("TEST_* environment configuration must be valid for its engine kind")
}

/// Wraps a `Connector` and a `Migrator` pointed at a source/target pair,
/// registered under the fixed ids `"source"`/`"target"`. Mirrors the
/// upstream engine's `TestApi`, scaled down to this crate's three
/// components.
pub struct MigrationTestApi {
    pub connector: Connector,
    pub migrator: Migrator,
    pub source_engine: EngineKind,
    pub target_engine: EngineKind,
    pub source_db: String,
    pub target_db: String,
}

impl MigrationTestApi {
    pub const SOURCE: &'static str = "source";
    pub const TARGET: &'static str = "target";

    /// Connects both endpoints and registers them under fixed connection
    /// ids. Panics (via `expect`) on a failed probe — callers are
    /// `#[ignore]`d integration tests that assume a reachable database.
    pub async fn connect(
        source_engine: EngineKind,
        source: EndpointConfig,
        source_db: impl Into<String>,
        target_engine: EngineKind,
        target: EndpointConfig,
        target_db: impl Into<String>,
    ) -> Self {
        let connector = Connector::new();

        let source_outcome = connector
            .connect(source_engine, source, ConnectionId::from(Self::SOURCE))
            .await
            .expect("source connect call failed");
        assert_connected(&source_outcome, "source");

        let target_outcome = connector
            .connect(target_engine, target, ConnectionId::from(Self::TARGET))
            .await
            .expect("target connect call failed");
        assert_connected(&target_outcome, "target");

        MigrationTestApi {
            migrator: Migrator::new(connector.clone()),
            connector,
            source_engine,
            target_engine,
            source_db: source_db.into(),
            target_db: target_db.into(),
        }
    }

    pub async fn source_tables(&self) -> Vec<String> {
        self.connector
            .list_tables(&ConnectionId::from(Self::SOURCE), &self.source_db)
            .await
            .expect("list_tables on source failed")
    }

    pub async fn target_tables(&self) -> Vec<String> {
        self.connector
            .list_tables(&ConnectionId::from(Self::TARGET), &self.target_db)
            .await
            .expect("list_tables on target failed")
    }

    pub async fn start_migration(
        &self,
        job_id: impl Into<migration_connector::JobId>,
        tables: Vec<String>,
        progress_sink: migration_core::ProgressSink,
    ) -> StartedJob {
        let job = migration_core::MigrationJob {
            job_id: job_id.into(),
            source_conn: ConnectionId::from(Self::SOURCE),
            target_conn: ConnectionId::from(Self::TARGET),
            source_db: self.source_db.clone(),
            target_db: self.target_db.clone(),
            tables,
        };

        self.migrator
            .start_migration(job, progress_sink)
            .await
            .expect("start_migration failed")
    }
}

fn assert_connected(outcome: &ConnectOutcome, label: &str) {
    match outcome {
        ConnectOutcome::Connected { .. } => {}
        ConnectOutcome::ProbeFailed { message } => {
            panic!("{label} endpoint failed its connectivity probe: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_env_defaults_when_unset() {
        let config = endpoint_from_env(EngineKind::Postgres, "UNSET_PREFIX_DOES_NOT_EXIST");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5432);
        assert!(config.service_name.is_none());
    }

    #[test]
    fn endpoint_from_env_fills_oracle_service_name() {
        let config = endpoint_from_env(EngineKind::Oracle, "UNSET_PREFIX_DOES_NOT_EXIST_2");
        assert_eq!(config.port, 1521);
        assert_eq!(config.service_name.as_deref(), Some("ORCLPDB1"));
    }
}
