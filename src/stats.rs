//! Outcome counters shared by all workers of a run.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::reporter::Reporter;

/// Final (or intermediate) outcome counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub skipped: usize,
    pub non_image_files_excluded: usize,
}

impl Stats {
    /// Jobs that reached a terminal outcome.
    pub fn finished(&self) -> usize {
        self.success + self.errors + self.skipped
    }

    /// Whether every job has been accounted for.
    pub fn is_complete(&self) -> bool {
        self.finished() == self.total
    }

    /// Percentage of attempted jobs (skips excluded) that succeeded.
    pub fn success_rate(&self) -> Option<f64> {
        let attempted = self.success + self.errors;
        if attempted == 0 {
            None
        } else {
            Some(self.success as f64 / attempted as f64 * 100.0)
        }
    }
}

/// Lock-free aggregator updated concurrently by the worker pool.
///
/// Each counter is independent, so `Relaxed` ordering is enough; the pool's join
/// barrier orders every update before [`StatsAggregator::snapshot`] is read.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    total: usize,
    success: AtomicUsize,
    errors: AtomicUsize,
    skipped: AtomicUsize,
    non_image_files_excluded: AtomicUsize,
}

impl StatsAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_success(&self, excluded_count: usize) {
        self.non_image_files_excluded
            .fetch_add(excluded_count, Ordering::Relaxed);
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Stats {
        Stats {
            total: self.total,
            success: self.success.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            non_image_files_excluded: self.non_image_files_excluded.load(Ordering::Relaxed),
        }
    }
}

/// Emits the end-of-run summary.
pub fn report_summary(stats: &Stats, reporter: &dyn Reporter) {
    reporter.info("Conversion completed");
    reporter.info(&format!("Total folders:     {}", stats.total));
    reporter.success(&format!("Successful:        {}", stats.success));

    if stats.skipped > 0 {
        reporter.warn(&format!("Skipped:           {}", stats.skipped));
    }
    if stats.errors > 0 {
        reporter.error(&format!("Errors:            {}", stats.errors));
    }
    if stats.non_image_files_excluded > 0 {
        reporter.info(&format!(
            "Files excluded:    {} (smart filtering)",
            stats.non_image_files_excluded
        ));
    }
    if let Some(rate) = stats.success_rate() {
        reporter.info(&format!("Success rate:      {:.1}%", rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{Level, MemoryReporter};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_updates_are_conserved() {
        let aggregator = Arc::new(StatsAggregator::new(800));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    for i in 0..100 {
                        match (worker + i) % 3 {
                            0 => aggregator.record_success(2),
                            1 => aggregator.record_error(),
                            _ => aggregator.record_skip(),
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = aggregator.snapshot();
        assert_eq!(stats.total, 800);
        assert!(stats.is_complete());
        assert_eq!(stats.non_image_files_excluded, stats.success * 2);
    }

    #[test]
    fn success_rate_ignores_skips() {
        let stats = Stats {
            total: 5,
            success: 3,
            errors: 1,
            skipped: 1,
            non_image_files_excluded: 0,
        };
        assert_eq!(stats.success_rate(), Some(75.0));
        assert_eq!(Stats::default().success_rate(), None);
    }

    #[test]
    fn summary_only_mentions_nonzero_counters() {
        let reporter = MemoryReporter::new();
        let stats = Stats {
            total: 2,
            success: 2,
            ..Default::default()
        };
        report_summary(&stats, &reporter);

        assert!(reporter.messages(Level::Warning).is_empty());
        assert!(reporter.messages(Level::Error).is_empty());
        assert_eq!(
            reporter.messages(Level::Success),
            vec!["Successful:        2".to_string()]
        );
        assert!(
            reporter
                .messages(Level::Info)
                .contains(&"Success rate:      100.0%".to_string())
        );
    }
}
