use connection_string::JdbcString;
use migration_connector::{ConnectorError, ConnectorResult, EndpointConfig};
use std::str::FromStr;
use url::Url;

/// Build a `quaint` connection URL for MySQL or Postgres using a structured
/// `url::Url` rather than `format!` string concatenation, so a password
/// containing `@`, `/` or `:` is percent-encoded instead of corrupting the
/// URL.
pub fn quaint_url(scheme: &str, config: &EndpointConfig, database: Option<&str>) -> ConnectorResult<String> {
    let mut url = Url::parse(&format!("{scheme}://placeholder", scheme = scheme))
        .map_err(|e| ConnectorError::generic(anyhow::anyhow!(e)))?;

    url.set_host(Some(&config.host))
        .map_err(|e| ConnectorError::generic(anyhow::anyhow!(e)))?;
    url.set_port(Some(config.port))
        .map_err(|_| ConnectorError::generic(anyhow::anyhow!("invalid port")))?;
    url.set_username(&config.username)
        .map_err(|_| ConnectorError::generic(anyhow::anyhow!("invalid username")))?;
    url.set_password(Some(&config.password))
        .map_err(|_| ConnectorError::generic(anyhow::anyhow!("invalid password")))?;

    if let Some(db) = database {
        url.set_path(db);
    }

    Ok(url.to_string())
}

/// Build a SQL Server JDBC connection string via `connection_string`'s typed
/// `JdbcString` builder instead of hand-assembling `;`-separated
/// properties.
pub fn mssql_jdbc_url(config: &EndpointConfig, database: Option<&str>) -> ConnectorResult<String> {
    let base = format!("jdbc:sqlserver://{}:{}", config.host, config.port);
    let mut jdbc = JdbcString::from_str(&base).map_err(|e| ConnectorError::generic(anyhow::Error::new(e)))?;

    let props = jdbc.properties_mut();
    props.insert("user".into(), config.username.clone());
    props.insert("password".into(), config.password.clone());
    if let Some(db) = database {
        props.insert("database".into(), db.to_owned());
    }

    Ok(jdbc.to_string())
}

/// Oracle's `Connection::connect` takes username/password/connect-string as
/// three separate arguments, so there is no interpolation hazard to design
/// away — the "easy connect" TNS form is all that's needed here.
pub fn oracle_connect_string(config: &EndpointConfig) -> ConnectorResult<String> {
    let service_name = config.service_name.as_deref().ok_or_else(|| {
        ConnectorError::InvalidEndpointConfig("oracle endpoint is missing service_name".to_owned())
    })?;
    Ok(format!("{}:{}/{}", config.host, config.port, service_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration_connector::EngineKind;

    fn config(service_name: Option<&str>) -> EndpointConfig {
        EndpointConfig::new(
            EngineKind::Postgres,
            "db.example.com",
            5432,
            "ro-user",
            "p@ss/w:rd",
            service_name.map(str::to_owned),
        )
        .unwrap()
    }

    #[test]
    fn password_with_reserved_characters_is_percent_encoded() {
        let url = quaint_url("postgresql", &config(None), Some("analytics")).unwrap();
        assert!(url.contains("p%40ss%2Fw%3Ard"));
        assert!(!url.contains("p@ss/w:rd"));
    }

    #[test]
    fn oracle_connect_string_uses_easy_connect_syntax() {
        let mut cfg = config(Some("ORCLPDB1"));
        cfg.host = "oracle.example.com".to_owned();
        cfg.port = 1521;
        assert_eq!(oracle_connect_string(&cfg).unwrap(), "oracle.example.com:1521/ORCLPDB1");
    }
}
