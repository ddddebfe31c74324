//! Fixed-size worker pool that runs conversion jobs.
//!
//! A single feeder task pushes every job into a bounded queue and then drops
//! its sender, closing the queue. `concurrency` workers share the receiving end
//! and exit once the queue is closed and drained. [`WorkerPool::run`] returns
//! only after every worker has exited, so the [`StatsAggregator`] can be read
//! without racing any update.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::fs;
use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, spawn_blocking};
use tokio::time::sleep;

use crate::classifier;
use crate::error::Result;
use crate::generator::{build_archive, cbz::Cbz};
use crate::path_utils::{get_file_name_lossy, truncate_display};
use crate::reporter::Reporter;
use crate::stats::StatsAggregator;
use crate::types::Job;

/// Pause each worker takes between two jobs.
pub const DEFAULT_JOB_DELAY: Duration = Duration::from_millis(5);
/// Job names longer than this are shortened in progress messages.
const MAX_DISPLAY_NAME: usize = 60;

/// Clamps a requested worker count to `[1, 2 * parallelism]`.
///
/// # Returns
///
/// * `(usize, bool)` - The effective count and whether the ceiling was applied
pub fn clamp_concurrency(requested: usize, parallelism: usize) -> (usize, bool) {
    let ceiling = parallelism.max(1) * 2;
    if requested < 1 {
        (1, false)
    } else if requested > ceiling {
        (ceiling, true)
    } else {
        (requested, false)
    }
}

/// Runs jobs on a fixed number of concurrent workers.
pub struct WorkerPool {
    concurrency: usize,
    job_delay: Duration,
    reporter: Arc<dyn Reporter>,
}

impl WorkerPool {
    /// Creates a pool with `concurrency` workers, clamped against the number of CPUs.
    pub fn new(concurrency: usize, reporter: Arc<dyn Reporter>) -> Self {
        let (concurrency, limited) = clamp_concurrency(concurrency, num_cpus::get());
        if limited {
            reporter.info(&format!(
                "Thread count limited to {} (2x CPU cores)",
                concurrency
            ));
        }

        Self {
            concurrency,
            job_delay: DEFAULT_JOB_DELAY,
            reporter,
        }
    }

    /// Sets the pause between two jobs of the same worker. Zero disables it.
    pub fn with_job_delay(mut self, job_delay: Duration) -> Self {
        self.job_delay = job_delay;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Processes every job and waits for all workers to finish.
    ///
    /// Individual job failures are recorded in `stats` and never abort the pool.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every job reached an outcome
    /// * `Err(Error::Join)` - A worker task panicked; returned only once every
    ///   other worker has exited
    pub async fn run(&self, jobs: Vec<Job>, stats: &Arc<StatsAggregator>) -> Result<()> {
        let (sender, receiver) = mpsc::channel::<Job>(self.concurrency);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(self.concurrency);
        for worker_id in 1..=self.concurrency {
            let receiver = Arc::clone(&receiver);
            let stats = Arc::clone(stats);
            let reporter = Arc::clone(&self.reporter);
            let job_delay = self.job_delay;

            workers.push(tokio::spawn(async move {
                loop {
                    let next = receiver.lock().await.recv().await;
                    let Some(job) = next else {
                        break;
                    };

                    process_job(worker_id, job, &stats, &reporter).await;

                    if !job_delay.is_zero() {
                        sleep(job_delay).await;
                    }
                }
            }));
        }

        let feeder = tokio::spawn(async move {
            for job in jobs {
                if sender.send(job).await.is_err() {
                    break;
                }
            }
            // `sender` is dropped here, which closes the queue.
        });

        // Wait for every worker before surfacing a panic, so none is left detached.
        let feeder_result = feeder.await;
        for result in join_all(workers).await {
            result?;
        }
        feeder_result?;

        Ok(())
    }
}

/// Runs one job to an outcome and records it.
async fn process_job(
    worker_id: usize,
    job: Job,
    stats: &StatsAggregator,
    reporter: &Arc<dyn Reporter>,
) {
    let prefix = format!("[WORKER {}]", worker_id);
    let archive_name = get_file_name_lossy(&job.output_path);

    reporter.info(&format!(
        "{} Processing: {}",
        prefix,
        truncate_display(&job.name, MAX_DISPLAY_NAME)
    ));

    if fs::try_exists(&job.output_path).await.unwrap_or(false) {
        reporter.warn(&format!(
            "{} CBZ already exists, skipping: {}",
            prefix, archive_name
        ));
        stats.record_skip();
        return;
    }

    match convert(job, Arc::clone(reporter)).await {
        Ok(excluded_count) => {
            stats.record_success(excluded_count);
            reporter.success(&format!("{} Created: {}", prefix, archive_name));
            if excluded_count > 0 {
                reporter.warn(&format!(
                    "{} Found {} non-image files (excluded from CBZ)",
                    prefix, excluded_count
                ));
            }
        }
        Err(e) if e.is_skip() => {
            reporter.warn(&format!(
                "{} CBZ already exists, skipping: {}",
                prefix, archive_name
            ));
            stats.record_skip();
        }
        Err(e) => {
            reporter.error(&format!("{} Conversion failed: {}", prefix, e));
            stats.record_error();
        }
    }
}

/// Classifies the job's source directory and writes its archive.
///
/// # Returns
///
/// * `Ok(usize)` - Number of distinct file names excluded by classification
async fn convert(job: Job, reporter: Arc<dyn Reporter>) -> Result<usize> {
    let source_path = job.source_path.clone();
    let filter_mode = job.filter_mode;

    let content = spawn_blocking(move || {
        classifier::classify(&source_path, filter_mode, reporter.as_ref())
    })
    .await??;

    let files: Vec<PathBuf> = content.absolute_paths();
    build_archive::<Cbz>(&job.source_path, &files, &job.output_path).await?;

    Ok(content.excluded_count)
}
