use crate::job::JobReport;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// A caller-supplied consumer of `JobReport` snapshots. `Arc` rather than a
/// bare `Box` because the same
/// sink is shared between the job-admitting caller and the spawned worker
/// task.
pub type ProgressSink = Arc<dyn Fn(JobReport) + Send + Sync>;

/// Invokes `sink` and swallows a panicking sink rather than letting it abort
/// the copy. A panic here is logged, not propagated.
pub(crate) fn emit(sink: &ProgressSink, report: JobReport) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| sink(report)));
    if let Err(panic) = result {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        tracing::error!(panic = %message, "progress_sink panicked; continuing the copy");
    }
}
