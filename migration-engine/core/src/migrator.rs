use crate::job::{FailedTable, JobReport, JobStatus, MigrationJob};
use crate::progress::{self, ProgressSink};
use crate::registry::JobRegistry;
use crate::table_copy::{self, TableCopyContext};
use db_connector::Connector;
use migration_connector::{ConnectorResult, EngineKind, JobId};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Result of admitting a job: whether it started, and under what id.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StartedJob {
    pub job_id: JobId,
}

/// The Migrator: orchestrates table-by-table copy jobs on a bounded worker
/// pool, backed by the Connector for opening source and
/// target handles. Cheaply `Clone`, in the same spirit as
/// `db_connector::Connector` — every clone shares the same job registry and
/// worker-pool semaphore.
#[derive(Clone)]
pub struct Migrator {
    connector: Connector,
    jobs: Arc<JobRegistry>,
}

impl Migrator {
    pub fn new(connector: Connector) -> Self {
        Migrator {
            connector,
            jobs: Arc::new(JobRegistry::default()),
        }
    }

    /// Admits the job to the worker pool and returns immediately; the copy
    /// itself runs on a spawned task.
    #[tracing::instrument(skip(self, job, progress_sink), fields(job_id = %job.job_id))]
    pub async fn start_migration(&self, job: MigrationJob, progress_sink: ProgressSink) -> ConnectorResult<StartedJob> {
        let cancel_flag = self.jobs.register(&job.job_id).await?;
        let job_id = job.job_id.clone();

        let connector = self.connector.clone();
        let jobs = self.jobs.clone();
        let permits = self.jobs.worker_permits();

        let returned_job_id = job_id.clone();
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.expect("worker semaphore is never closed");
            run_job(&connector, job, &cancel_flag, &progress_sink).await;
            jobs.retire(&job_id).await;
        });

        Ok(StartedJob { job_id: returned_job_id })
    }

    /// Sets the job's cancel flag. An unknown `job_id` is reported to the
    /// caller as `false` rather than an error.
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        self.jobs.request_cancel(job_id).await
    }
}

async fn run_job(connector: &Connector, job: MigrationJob, cancel_flag: &AtomicBool, progress_sink: &ProgressSink) {
    let total_tables = job.tables.len() as u32;
    let mut report = JobReport::started(job.job_id.clone(), total_tables);
    let start = Instant::now();
    report.status = JobStatus::InProgress;
    progress::emit(progress_sink, report.clone());

    let opened = open_endpoints(connector, &job).await;

    let (source_handle, target_handle, source_engine, target_engine) = match opened {
        Ok(opened) => opened,
        Err(err) => {
            report.status = JobStatus::Error;
            report.message = migration_connector::render_error_chain(&err);
            report.elapsed_seconds = start.elapsed().as_secs_f64();
            progress::emit(progress_sink, report);
            return;
        }
    };

    let ctx = TableCopyContext {
        source: source_handle.as_ref(),
        target: target_handle.as_ref(),
        source_engine,
        target_engine,
        source_db: &job.source_db,
        target_db: &job.target_db,
    };

    let mut cancelled = false;

    for table in &job.tables {
        if cancel_flag.load(std::sync::atomic::Ordering::SeqCst) {
            cancelled = true;
            break;
        }

        report.current_table = Some(table.clone());
        progress::emit(progress_sink, with_elapsed(&report, &start));

        let table = table.clone();
        let result = table_copy::copy_table(&ctx, &table, cancel_flag, |chunk_rows, total_rows| {
            report.current_rows = total_rows;
            report.total_rows = report.total_rows.max(total_rows);
            report.elapsed_seconds = start.elapsed().as_secs_f64();
            let _ = chunk_rows;
            progress::emit(progress_sink, report.clone());
        })
        .await;

        match result {
            Ok(outcome) => {
                report.tables_completed += 1;
                report.total_rows = report.total_rows.max(outcome.total_rows_estimate).max(outcome.rows_copied);
                if let Some(note) = outcome.truncate_note {
                    if report.message.is_empty() {
                        report.message = note.to_owned();
                    }
                }
            }
            Err(err) => {
                report.tables_failed.push(FailedTable {
                    table: table.clone(),
                    error_msg: migration_connector::render_error_chain(&err),
                });
            }
        }

        report.elapsed_seconds = start.elapsed().as_secs_f64();
        progress::emit(progress_sink, with_elapsed(&report, &start));

        if cancel_flag.load(std::sync::atomic::Ordering::SeqCst) {
            cancelled = true;
            break;
        }
    }

    report.current_table = None;
    report.status = if cancelled { JobStatus::Cancelled } else { JobStatus::Completed };
    report.elapsed_seconds = start.elapsed().as_secs_f64();
    progress::emit(progress_sink, report);
}

fn with_elapsed(report: &JobReport, start: &Instant) -> JobReport {
    let mut report = report.clone();
    report.elapsed_seconds = start.elapsed().as_secs_f64();
    report
}

async fn open_endpoints(
    connector: &Connector,
    job: &MigrationJob,
) -> ConnectorResult<(Arc<db_connector::DbHandle>, Arc<db_connector::DbHandle>, EngineKind, EngineKind)> {
    let (_, source_engine) = connector.lookup(&job.source_conn).await?;
    let (_, target_engine) = connector.lookup(&job.target_conn).await?;

    let source_handle = connector.scoped_handle(&job.source_conn, &job.source_db).await?;
    let target_handle = connector.scoped_handle(&job.target_conn, &job.target_db).await?;

    Ok((source_handle, target_handle, source_engine, target_engine))
}
