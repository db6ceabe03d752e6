use std::fmt;

/// The error type shared by every connector in the workspace. `Connector`,
/// `Inspector` and `Migrator` operations all resolve to `ConnectorResult`.
///
/// This mirrors the role `migration_connector::ConnectorError` plays in the
/// upstream engine: a single structured error type that every flavour-specific
/// driver error gets folded into at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("unsupported engine kind: {0}")]
    UnsupportedEngine(String),

    #[error("no connection registered with id `{0}`")]
    NoSuchConnection(String),

    #[error("a migration job with id `{0}` is already running")]
    JobExists(String),

    #[error("no migration job registered with id `{0}`")]
    NoSuchJob(String),

    #[error("endpoint configuration is invalid: {0}")]
    InvalidEndpointConfig(String),

    #[error("query failed: {0}")]
    QueryFailed(#[source] anyhow::Error),

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl ConnectorError {
    pub fn query_failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ConnectorError::QueryFailed(anyhow::Error::new(err))
    }

    pub fn generic(err: impl Into<anyhow::Error>) -> Self {
        ConnectorError::Generic(err.into())
    }

    /// A short, stable tag for the error kind, independent of the message —
    /// used when folding an error into `JobReport.tables_failed`.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            ConnectorError::UnsupportedEngine(_) => "unsupported_engine",
            ConnectorError::NoSuchConnection(_) => "no_such_connection",
            ConnectorError::JobExists(_) => "job_exists",
            ConnectorError::NoSuchJob(_) => "no_such_job",
            ConnectorError::InvalidEndpointConfig(_) => "invalid_endpoint_config",
            ConnectorError::QueryFailed(_) => "query_failed",
            ConnectorError::Generic(_) => "generic",
        }
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// A human-readable rendering used for `tables_failed[].error_msg` and for
/// the CLI's top-level error printer. Kept separate from `Display` so the
/// job report can stay a plain `String` field (serializable, no source
/// chain) while the CLI can still print the full `anyhow`-style chain.
pub fn render_error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}

impl fmt::Display for ConnectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectOutcome::Connected { databases } => write!(f, "connected ({} databases)", databases.len()),
            ConnectOutcome::ProbeFailed { message } => write!(f, "probe failed: {}", message),
        }
    }
}

/// The result of `Connector::connect`. A failed connectivity probe is
/// reported as data (`ProbeFailed`), not as an `Err(ConnectorError)`: the
/// probe failing is an expected outcome, not an exceptional one.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectOutcome {
    Connected { databases: Vec<String> },
    ProbeFailed { message: String },
}
