use migration_core::JobReport;
use std::sync::{Arc, Mutex};

/// Captures every `JobReport` snapshot handed to a `progress_sink`, in
/// arrival order, so a test can assert on the shape of the whole run rather
/// than just its final state.
#[derive(Clone, Default)]
pub struct ProgressCollector {
    reports: Arc<Mutex<Vec<JobReport>>>,
}

impl ProgressCollector {
    pub fn new() -> Self {
        ProgressCollector::default()
    }

    pub fn sink(&self) -> migration_core::ProgressSink {
        let reports = self.reports.clone();
        Arc::new(move |report: JobReport| {
            reports.lock().unwrap().push(report);
        })
    }

    pub fn reports(&self) -> Vec<JobReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<JobReport> {
        self.reports.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration_core::JobStatus;

    #[test]
    fn collector_preserves_arrival_order() {
        let collector = ProgressCollector::new();
        let sink = collector.sink();

        sink(JobReport::started("job-1".into(), 2));
        let mut second = JobReport::started("job-1".into(), 2);
        second.status = JobStatus::InProgress;
        second.tables_completed = 1;
        sink(second);

        let reports = collector.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, JobStatus::Started);
        assert_eq!(reports[1].status, JobStatus::InProgress);
        assert_eq!(reports[1].tables_completed, 1);
    }

    #[test]
    fn last_reflects_most_recent_report_only() {
        let collector = ProgressCollector::new();
        let sink = collector.sink();

        assert!(collector.last().is_none());

        sink(JobReport::started("job-1".into(), 1));
        let mut completed = JobReport::started("job-1".into(), 1);
        completed.status = JobStatus::Completed;
        sink(completed);

        assert_eq!(collector.last().unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn a_panicking_sink_consumer_does_not_poison_the_collector() {
        // The Migrator itself is what guards against a panicking sink
        // (`migration_core::progress::emit`); this only checks that the
        // collector's own `Mutex` isn't left poisoned by a panic that
        // happens *after* a report was pushed, e.g. in a test assertion.
        let collector = ProgressCollector::new();
        let sink = collector.sink();
        sink(JobReport::started("job-1".into(), 1));

        let result = std::panic::catch_unwind(|| {
            let reports = collector.reports();
            assert_eq!(reports.len(), 99, "deliberately wrong, to panic");
        });
        assert!(result.is_err());

        assert_eq!(collector.reports().len(), 1);
    }
}
