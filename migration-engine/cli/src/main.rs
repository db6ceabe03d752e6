//! A thin command-line front end over the Connector, Inspector and
//! Migrator, in the spirit of the workspace's own `test-cli`: enough
//! plumbing to drive a real migration by hand, not a polished product
//! surface.

use anyhow::Context;
use colored::*;
use db_connector::Connector;
use migration_connector::{ConnectOutcome, ConnectionId, EndpointConfig, EngineKind, JobId};
use migration_core::{JobReport, JobStatus, MigrationJob, Migrator};
use structopt::StructOpt;

#[derive(StructOpt)]
struct EndpointArgs {
    #[structopt(long, possible_values = &["mysql", "postgres", "oracle", "sqlserver"])]
    engine: String,

    #[structopt(long)]
    host: String,

    #[structopt(long)]
    port: u16,

    #[structopt(long)]
    username: String,

    #[structopt(long, env = "MIGRATION_CLI_PASSWORD", hide_env_values = true)]
    password: String,

    /// Required for --engine oracle, rejected for every other engine.
    #[structopt(long)]
    service_name: Option<String>,
}

impl EndpointArgs {
    fn engine_kind(&self) -> anyhow::Result<EngineKind> {
        self.engine.parse().map_err(|e: migration_connector::ConnectorError| anyhow::anyhow!(e))
    }

    fn endpoint_config(&self) -> anyhow::Result<EndpointConfig> {
        let engine = self.engine_kind()?;
        Ok(EndpointConfig::new(
            engine,
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
            self.service_name.clone(),
        )?)
    }
}

#[derive(StructOpt)]
enum Command {
    /// Probe an endpoint and list its databases/schemas.
    ListDatabases {
        #[structopt(flatten)]
        endpoint: EndpointArgs,
    },
    /// Probe an endpoint and list the tables in one database/schema.
    ListTables {
        #[structopt(flatten)]
        endpoint: EndpointArgs,
        #[structopt(long)]
        database: String,
    },
    /// Run a migration job to completion, printing progress as it goes.
    /// Ctrl-C requests cancellation of the running job.
    Migrate {
        #[structopt(flatten)]
        source: SourceEndpointArgs,
        #[structopt(flatten)]
        target: TargetEndpointArgs,
        #[structopt(long)]
        source_db: String,
        #[structopt(long)]
        target_db: String,
        #[structopt(long = "table")]
        tables: Vec<String>,
        #[structopt(long, default_value = "cli-job")]
        job_id: String,
    },
}

// `StructOpt`'s `flatten` needs distinct field names between the source and
// target endpoint, so these two newtypes just relabel the CLI flags with
// `source-`/`target-` prefixes rather than duplicating `EndpointArgs`.
#[derive(StructOpt)]
struct SourceEndpointArgs {
    #[structopt(long = "source-engine", possible_values = &["mysql", "postgres", "oracle", "sqlserver"])]
    engine: String,
    #[structopt(long = "source-host")]
    host: String,
    #[structopt(long = "source-port")]
    port: u16,
    #[structopt(long = "source-username")]
    username: String,
    #[structopt(long = "source-password", env = "MIGRATION_CLI_SOURCE_PASSWORD", hide_env_values = true)]
    password: String,
    #[structopt(long = "source-service-name")]
    service_name: Option<String>,
}

#[derive(StructOpt)]
struct TargetEndpointArgs {
    #[structopt(long = "target-engine", possible_values = &["mysql", "postgres", "oracle", "sqlserver"])]
    engine: String,
    #[structopt(long = "target-host")]
    host: String,
    #[structopt(long = "target-port")]
    port: u16,
    #[structopt(long = "target-username")]
    username: String,
    #[structopt(long = "target-password", env = "MIGRATION_CLI_TARGET_PASSWORD", hide_env_values = true)]
    password: String,
    #[structopt(long = "target-service-name")]
    service_name: Option<String>,
}

impl From<&SourceEndpointArgs> for EndpointArgs {
    fn from(s: &SourceEndpointArgs) -> Self {
        EndpointArgs {
            engine: s.engine.clone(),
            host: s.host.clone(),
            port: s.port,
            username: s.username.clone(),
            password: s.password.clone(),
            service_name: s.service_name.clone(),
        }
    }
}

impl From<&TargetEndpointArgs> for EndpointArgs {
    fn from(t: &TargetEndpointArgs) -> Self {
        EndpointArgs {
            engine: t.engine.clone(),
            host: t.host.clone(),
            port: t.port,
            username: t.username.clone(),
            password: t.password.clone(),
            service_name: t.service_name.clone(),
        }
    }
}

#[derive(StructOpt)]
#[structopt(name = "migration-cli")]
struct Opt {
    #[structopt(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    match opt.command {
        Command::ListDatabases { endpoint } => list_databases(endpoint).await,
        Command::ListTables { endpoint, database } => list_tables(endpoint, database).await,
        Command::Migrate {
            source,
            target,
            source_db,
            target_db,
            tables,
            job_id,
        } => migrate(source, target, source_db, target_db, tables, job_id).await,
    }
}

async fn list_databases(endpoint: EndpointArgs) -> anyhow::Result<()> {
    let engine = endpoint.engine_kind()?;
    let config = endpoint.endpoint_config()?;
    let connector = Connector::new();
    let connection_id = ConnectionId::from("cli");

    match connector.connect(engine, config, connection_id.clone()).await? {
        ConnectOutcome::Connected { databases } => {
            for db in databases {
                println!("{db}");
            }
            Ok(())
        }
        ConnectOutcome::ProbeFailed { message } => Err(anyhow::anyhow!("connectivity probe failed: {message}")),
    }
}

async fn list_tables(endpoint: EndpointArgs, database: String) -> anyhow::Result<()> {
    let engine = endpoint.engine_kind()?;
    let config = endpoint.endpoint_config()?;
    let connector = Connector::new();
    let connection_id = ConnectionId::from("cli");

    match connector.connect(engine, config, connection_id.clone()).await? {
        ConnectOutcome::Connected { .. } => {
            let tables = connector.list_tables(&connection_id, &database).await?;
            for table in tables {
                println!("{table}");
            }
            Ok(())
        }
        ConnectOutcome::ProbeFailed { message } => Err(anyhow::anyhow!("connectivity probe failed: {message}")),
    }
}

async fn migrate(
    source: SourceEndpointArgs,
    target: TargetEndpointArgs,
    source_db: String,
    target_db: String,
    tables: Vec<String>,
    job_id: String,
) -> anyhow::Result<()> {
    if tables.is_empty() {
        anyhow::bail!("at least one --table is required");
    }

    let job_id = JobId::from(job_id);

    let source_endpoint = EndpointArgs::from(&source);
    let target_endpoint = EndpointArgs::from(&target);
    let source_engine = source_endpoint.engine_kind()?;
    let target_engine = target_endpoint.engine_kind()?;

    let connector = Connector::new();
    let source_conn = ConnectionId::from("cli-source");
    let target_conn = ConnectionId::from("cli-target");

    connect_or_bail(&connector, source_engine, source_endpoint.endpoint_config()?, source_conn.clone(), "source").await?;
    connect_or_bail(&connector, target_engine, target_endpoint.endpoint_config()?, target_conn.clone(), "target").await?;

    let migrator = Migrator::new(connector);

    let (report_tx, mut report_rx) = tokio::sync::mpsc::unbounded_channel::<JobReport>();
    let sink: migration_core::ProgressSink = std::sync::Arc::new(move |report| {
        let _ = report_tx.send(report);
    });

    let job = MigrationJob {
        job_id: job_id.clone(),
        source_conn,
        target_conn,
        source_db,
        target_db,
        tables,
    };

    migrator
        .start_migration(job, sink)
        .await
        .context("failed to start migration job")?;

    let mut cancel_requested = false;

    loop {
        tokio::select! {
            report = report_rx.recv() => {
                match report {
                    Some(report) => {
                        print_report(&report);
                        if report.status.is_terminal() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                cancel_requested = true;
                eprintln!("{}", "cancellation requested, waiting for the job to stop...".yellow());
                migrator.cancel(&job_id).await;
            }
        }
    }

    Ok(())
}

async fn connect_or_bail(
    connector: &Connector,
    engine: EngineKind,
    config: EndpointConfig,
    connection_id: ConnectionId,
    label: &str,
) -> anyhow::Result<()> {
    match connector.connect(engine, config, connection_id).await? {
        ConnectOutcome::Connected { .. } => Ok(()),
        ConnectOutcome::ProbeFailed { message } => {
            anyhow::bail!("{label} endpoint failed its connectivity probe: {message}")
        }
    }
}

fn print_report(report: &JobReport) {
    let status = match report.status {
        JobStatus::Started => "started".normal(),
        JobStatus::InProgress => "in_progress".cyan(),
        JobStatus::Completed => "completed".green().bold(),
        JobStatus::Cancelled => "cancelled".yellow().bold(),
        JobStatus::Error => "error".red().bold(),
    };

    println!(
        "[{status}] tables {}/{} rows {}/{} table={}",
        report.tables_completed,
        report.total_tables,
        report.current_rows,
        report.total_rows,
        report.current_table.as_deref().unwrap_or("-"),
    );

    for failed in &report.tables_failed {
        eprintln!("  {} {}: {}", "failed".red(), failed.table, failed.error_msg);
    }

    if !report.message.is_empty() {
        println!("  {}", report.message);
    }
}
