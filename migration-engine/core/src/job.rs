use migration_connector::JobId;
use serde::Serialize;

/// `JobReport.status`. Terminal states (`Completed`, `Cancelled`, `Error`)
/// are absorbing: once reached, no further status transitions occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    Started,
    InProgress,
    Completed,
    Cancelled,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled | JobStatus::Error)
    }
}

/// One failed table, recorded rather than aborting the job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedTable {
    pub table: String,
    pub error_msg: String,
}

/// The running aggregate snapshot handed to the `progress_sink`.
/// `#[serde(rename_all = "camelCase")]` matches this workspace's command
/// input/output convention so a snapshot can be forwarded verbatim across a
/// caller's own transport.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_id: JobId,
    pub status: JobStatus,
    pub current_table: Option<String>,
    pub tables_completed: u32,
    pub tables_failed: Vec<FailedTable>,
    pub total_tables: u32,
    pub current_rows: u64,
    pub total_rows: u64,
    pub elapsed_seconds: f64,
    pub message: String,
}

impl JobReport {
    pub fn started(job_id: impl Into<JobId>, total_tables: u32) -> Self {
        JobReport {
            job_id: job_id.into(),
            status: JobStatus::Started,
            current_table: None,
            tables_completed: 0,
            tables_failed: Vec::new(),
            total_tables,
            current_rows: 0,
            total_rows: 0,
            elapsed_seconds: 0.0,
            message: String::new(),
        }
    }
}

/// Everything the worker task needs to run one migration, owned by the
/// worker and never shared — the job's public face is exclusively the
/// `progress_sink` stream of [`JobReport`] snapshots. References but does
/// not own its source/target connections.
pub struct MigrationJob {
    pub job_id: JobId,
    pub source_conn: migration_connector::ConnectionId,
    pub target_conn: migration_connector::ConnectionId,
    pub source_db: String,
    pub target_db: String,
    pub tables: Vec<String>,
}
