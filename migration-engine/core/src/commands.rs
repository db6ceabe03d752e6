use crate::job::MigrationJob;
use crate::migrator::Migrator;
use crate::progress::ProgressSink;
use migration_connector::{ConnectorResult, JobId};
use serde::{Deserialize, Serialize};

/// A typed `Input`/`Output` pair an external transport (an HTTP/WebSocket
/// surface, say) can drive without knowing anything about the Migrator's
/// internals.
#[async_trait::async_trait]
pub trait MigrationCommand {
    type Input;
    type Output;

    async fn execute(input: Self::Input, migrator: &Migrator, progress_sink: ProgressSink) -> ConnectorResult<Self::Output>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMigrationInput {
    pub source_conn: String,
    pub target_conn: String,
    pub source_db: String,
    pub target_db: String,
    pub tables: Vec<String>,
    pub job_id: JobId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMigrationOutput {
    pub started: bool,
    pub job_id: JobId,
}

/// `start_migration` as a command.
#[derive(Debug)]
pub struct StartMigrationCommand;

#[async_trait::async_trait]
impl MigrationCommand for StartMigrationCommand {
    type Input = StartMigrationInput;
    type Output = StartMigrationOutput;

    async fn execute(input: Self::Input, migrator: &Migrator, progress_sink: ProgressSink) -> ConnectorResult<Self::Output> {
        let job = MigrationJob {
            job_id: input.job_id.clone(),
            source_conn: input.source_conn.into(),
            target_conn: input.target_conn.into(),
            source_db: input.source_db,
            target_db: input.target_db,
            tables: input.tables,
        };

        let started = migrator.start_migration(job, progress_sink).await?;
        Ok(StartMigrationOutput { started: true, job_id: started.job_id })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelInput {
    pub job_id: JobId,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CancelOutput {
    Cancelling,
    Error { message: String },
}

/// `cancel` as a command.
#[derive(Debug)]
pub struct CancelCommand;

#[async_trait::async_trait]
impl MigrationCommand for CancelCommand {
    type Input = CancelInput;
    type Output = CancelOutput;

    async fn execute(input: Self::Input, migrator: &Migrator, _progress_sink: ProgressSink) -> ConnectorResult<Self::Output> {
        if migrator.cancel(&input.job_id).await {
            Ok(CancelOutput::Cancelling)
        } else {
            Ok(CancelOutput::Error { message: "not found".to_owned() })
        }
    }
}
