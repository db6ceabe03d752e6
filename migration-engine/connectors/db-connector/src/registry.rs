use crate::dsn;
use crate::handle::DbHandle;
use migration_connector::{ConnectOutcome, ConnectorError, ConnectorResult, ConnectionId, EndpointConfig, EngineKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct RegisteredConnection {
    engine_kind: EngineKind,
    endpoint_config: EndpointConfig,
    handle: Arc<DbHandle>,
}

/// The Connector component. Owns every live handle behind one lock-guarded
/// registry, keyed by the caller's opaque connection id — mutation
/// (`connect`/`disconnect`) is serialized with reads over this shared
/// state.
#[derive(Default, Clone)]
pub struct Connector {
    connections: Arc<RwLock<HashMap<ConnectionId, RegisteredConnection>>>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, endpoint_config))]
    pub async fn connect(
        &self,
        engine_kind: EngineKind,
        endpoint_config: EndpointConfig,
        connection_id: ConnectionId,
    ) -> ConnectorResult<ConnectOutcome> {
        endpoint_config.validate(engine_kind)?;

        let handle = match open_handle(engine_kind, &endpoint_config, None).await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(%connection_id, error = %err, "failed to open connection");
                return Ok(ConnectOutcome::ProbeFailed {
                    message: migration_connector::render_error_chain(&err),
                });
            }
        };

        if let Err(err) = handle.probe().await {
            tracing::warn!(%connection_id, error = %err, "connectivity probe failed");
            return Ok(ConnectOutcome::ProbeFailed {
                message: migration_connector::render_error_chain(&err),
            });
        }

        let handle = Arc::new(handle);
        let databases = list_databases(&handle, engine_kind).await?;

        // Replace any prior registration with the same id, disposing the old
        // handle.
        let mut connections = self.connections.write().await;
        connections.insert(
            connection_id,
            RegisteredConnection {
                engine_kind,
                endpoint_config,
                handle,
            },
        );

        Ok(ConnectOutcome::Connected { databases })
    }

    pub async fn list_databases(&self, connection_id: &ConnectionId) -> ConnectorResult<Vec<String>> {
        let (handle, engine_kind) = self.lookup(connection_id).await?;
        list_databases(&handle, engine_kind).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_tables(&self, connection_id: &ConnectionId, database: &str) -> ConnectorResult<Vec<String>> {
        let (_, engine_kind) = self.lookup(connection_id).await?;
        let handle = self.scoped_handle(connection_id, database).await?;

        let rows = match engine_kind {
            EngineKind::Mysql => {
                handle
                    .query_raw(
                        "SELECT table_name FROM information_schema.tables WHERE table_schema = ?",
                        &[database.to_owned().into()],
                    )
                    .await?
            }
            EngineKind::Postgres => {
                handle
                    .query_raw(
                        "SELECT table_name FROM information_schema.tables WHERE table_schema = 'public'",
                        &[],
                    )
                    .await?
            }
            EngineKind::Oracle => {
                let owner = database.to_ascii_uppercase();
                handle
                    .query_raw(
                        "SELECT table_name FROM all_tables WHERE owner = :1",
                        &[owner.into()],
                    )
                    .await?
            }
            EngineKind::SqlServer => {
                handle
                    .query_raw(
                        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE'",
                        &[],
                    )
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter_map(|(_, value)| match value {
                migration_connector::DbValue::Text(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id);
    }

    pub(crate) async fn lookup(&self, connection_id: &ConnectionId) -> ConnectorResult<(Arc<DbHandle>, EngineKind)> {
        let connections = self.connections.read().await;
        connections
            .get(connection_id)
            .map(|registered| (registered.handle.clone(), registered.engine_kind))
            .ok_or_else(|| ConnectorError::NoSuchConnection(connection_id.to_string()))
    }

    /// Used by components that need a *fresh* handle scoped to a specific
    /// database (MySQL/Postgres/SQL Server reopen against `database`;
    /// Oracle reuses the schema-level handle), so a long-lived job gets its
    /// own connection rather than sharing the registry's.
    pub async fn scoped_handle(&self, connection_id: &ConnectionId, database: &str) -> ConnectorResult<Arc<DbHandle>> {
        let connections = self.connections.read().await;
        let registered = connections
            .get(connection_id)
            .ok_or_else(|| ConnectorError::NoSuchConnection(connection_id.to_string()))?;

        if registered.engine_kind == EngineKind::Oracle {
            return Ok(registered.handle.clone());
        }

        let handle = open_handle(registered.engine_kind, &registered.endpoint_config, Some(database)).await?;
        Ok(Arc::new(handle))
    }
}

async fn open_handle(
    engine_kind: EngineKind,
    endpoint_config: &EndpointConfig,
    database: Option<&str>,
) -> ConnectorResult<DbHandle> {
    match engine_kind {
        EngineKind::Mysql => {
            let url = dsn::quaint_url("mysql", endpoint_config, database)?;
            let quaint = quaint::single::Quaint::new(&url)
                .await
                .map_err(ConnectorError::query_failed)?;
            Ok(DbHandle::Sql(quaint))
        }
        EngineKind::Postgres => {
            let url = dsn::quaint_url("postgresql", endpoint_config, database)?;
            let quaint = quaint::single::Quaint::new(&url)
                .await
                .map_err(ConnectorError::query_failed)?;
            Ok(DbHandle::Sql(quaint))
        }
        EngineKind::SqlServer => {
            let url = dsn::mssql_jdbc_url(endpoint_config, database)?;
            let quaint = quaint::single::Quaint::new(&url)
                .await
                .map_err(ConnectorError::query_failed)?;
            Ok(DbHandle::Sql(quaint))
        }
        EngineKind::Oracle => {
            let connect_string = dsn::oracle_connect_string(endpoint_config)?;
            let username = endpoint_config.username.clone();
            let password = endpoint_config.password.clone();
            let conn = tokio::task::spawn_blocking(move || {
                oracle::Connection::connect(&username, &password, &connect_string)
            })
            .await
            .map_err(|e| ConnectorError::generic(anyhow::anyhow!(e)))?
            .map_err(ConnectorError::query_failed)?;
            Ok(DbHandle::Oracle(Arc::new(tokio::sync::Mutex::new(conn))))
        }
    }
}

/// The per-engine database/schema enumeration queries.
async fn list_databases(handle: &DbHandle, engine_kind: EngineKind) -> ConnectorResult<Vec<String>> {
    let sql = match engine_kind {
        EngineKind::Mysql => "SHOW DATABASES",
        EngineKind::Postgres => "SELECT datname FROM pg_database WHERE datistemplate = false",
        EngineKind::Oracle => "SELECT username FROM all_users ORDER BY username",
        EngineKind::SqlServer => "SELECT name FROM sys.databases WHERE name NOT IN ('master','tempdb','model','msdb')",
    };

    let rows = handle.query_raw(sql, &[]).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter_map(|(_, value)| match value {
            migration_connector::DbValue::Text(s) => Some(s),
            _ => None,
        })
        .collect())
}
