use crate::error::{ConnectorError, ConnectorResult};
use std::fmt;
use std::str::FromStr;

/// One of the four engines this workspace knows how to speak to. A fixed
/// set by design: adding a fifth engine is a new variant plus a new
/// `Flavour` impl in every crate that matches on it, never an open registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Mysql,
    Postgres,
    Oracle,
    SqlServer,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Mysql,
        EngineKind::Postgres,
        EngineKind::Oracle,
        EngineKind::SqlServer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Mysql => "mysql",
            EngineKind::Postgres => "postgres",
            EngineKind::Oracle => "oracle",
            EngineKind::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> ConnectorResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(EngineKind::Mysql),
            "postgres" | "postgresql" => Ok(EngineKind::Postgres),
            "oracle" => Ok(EngineKind::Oracle),
            "sqlserver" | "mssql" => Ok(EngineKind::SqlServer),
            other => Err(ConnectorError::UnsupportedEngine(other.to_owned())),
        }
    }
}

/// `{host, port, username, password, service_name?}`. `service_name` is
/// required for Oracle and forbidden for every other
/// engine; the invariant is enforced once, at construction, rather than
/// re-checked by every caller.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub service_name: Option<String>,
}

impl EndpointConfig {
    pub fn new(
        engine_kind: EngineKind,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        service_name: Option<String>,
    ) -> ConnectorResult<Self> {
        let config = EndpointConfig {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            service_name,
        };
        config.validate(engine_kind)?;
        Ok(config)
    }

    pub fn validate(&self, engine_kind: EngineKind) -> ConnectorResult<()> {
        match (engine_kind, &self.service_name) {
            (EngineKind::Oracle, None) => Err(ConnectorError::InvalidEndpointConfig(
                "service_name is required for oracle endpoints".to_owned(),
            )),
            (EngineKind::Oracle, Some(_)) => Ok(()),
            (_, None) => Ok(()),
            (other, Some(_)) => Err(ConnectorError::InvalidEndpointConfig(format!(
                "service_name is not valid for {} endpoints",
                other
            ))),
        }
    }
}

/// Caller-chosen opaque identifier for a live connection handle. A thin
/// newtype rather than a bare `String` so connection, job and table
/// identifiers can't be swapped by accident at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<T: Into<String>> From<T> for ConnectionId {
    fn from(s: T) -> Self {
        ConnectionId(s.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<T: Into<String>> From<T> for JobId {
    fn from(s: T) -> Self {
        JobId(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_requires_service_name() {
        let err = EndpointConfig::new(EngineKind::Oracle, "h", 1521, "u", "p", None).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidEndpointConfig(_)));
    }

    #[test]
    fn non_oracle_forbids_service_name() {
        let err = EndpointConfig::new(
            EngineKind::Postgres,
            "h",
            5432,
            "u",
            "p",
            Some("orcl".to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidEndpointConfig(_)));
    }

    #[test]
    fn engine_kind_roundtrips_through_str() {
        for engine in EngineKind::ALL {
            assert_eq!(engine.as_str().parse::<EngineKind>().unwrap(), engine);
        }
    }
}
