use migration_connector::JobId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};

/// Per-job state the registry needs to reach into from outside the worker
/// task: the cancel flag `cancel` polls, and whether the job is still live.
struct JobEntry {
    cancel_flag: Arc<AtomicBool>,
}

/// Process-wide job bookkeeping, the Migrator's analogue of
/// `db-connector::Connector`'s connection registry. Holds the semaphore
/// that bounds concurrent running jobs and the map of live jobs' cancel
/// flags.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobEntry>>,
    worker_permits: Arc<Semaphore>,
}

impl JobRegistry {
    pub fn new(capacity: usize) -> Self {
        JobRegistry {
            jobs: RwLock::new(HashMap::new()),
            worker_permits: Arc::new(Semaphore::new(capacity)),
        }
    }

    pub fn worker_permits(&self) -> Arc<Semaphore> {
        self.worker_permits.clone()
    }

    /// Registers `job_id` as live, returning its cancel flag. Fails with
    /// `JobExists` if the id already names a live job.
    pub async fn register(&self, job_id: &JobId) -> migration_connector::ConnectorResult<Arc<AtomicBool>> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(job_id) {
            return Err(migration_connector::ConnectorError::JobExists(job_id.to_string()));
        }
        let cancel_flag = Arc::new(AtomicBool::new(false));
        jobs.insert(job_id.clone(), JobEntry { cancel_flag: cancel_flag.clone() });
        Ok(cancel_flag)
    }

    /// Sets the cancel flag for a live job. An unknown `job_id` returns
    /// `false` rather than an error.
    pub async fn request_cancel(&self, job_id: &JobId) -> bool {
        let jobs = self.jobs.read().await;
        match jobs.get(job_id) {
            Some(entry) => {
                entry.cancel_flag.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Removes a job once it reaches a terminal state, so its id becomes
    /// available for reuse.
    pub async fn retire(&self, job_id: &JobId) {
        let mut jobs = self.jobs.write().await;
        jobs.remove(job_id);
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        // Default process-wide bounded worker pool capacity.
        JobRegistry::new(5)
    }
}
