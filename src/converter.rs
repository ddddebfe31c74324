use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;

use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::path_utils::path_to_string_lossy;
use crate::pool::{DEFAULT_JOB_DELAY, WorkerPool};
use crate::reporter::{LogReporter, Reporter};
use crate::stats::{Stats, StatsAggregator, report_summary};
use crate::types::{CollectionMode, FilterMode, Job};

/// The batch conversion configuration, built declaratively using the builder pattern.
///
/// This struct holds everything a run needs: where to look for source folders,
/// where to put the archives, how to turn inputs into jobs, how to filter files,
/// and how many workers to use. Once configured, [`run`](ConverterConfig::run)
/// executes the whole batch.
///
/// ## Builder Pattern
///
/// Use [`ConverterConfig::builder()`](ConverterConfig::builder) to create a new configuration:
///
/// ```rust,no_run
/// # use tabane::prelude::*;
/// let config = ConverterConfig::builder()
///     .input_roots(vec![PathBuf::from("./mangas")])
///     .output_dir(PathBuf::from("./cbz"))
///     .collection_mode(CollectionMode::Recursive)
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ConverterConfig {
    /// Directories to convert (direct mode) or to scan for folders (recursive mode).
    ///
    /// At least one is required and none may be empty. Missing or non-directory
    /// entries are skipped with a warning at collection time.
    #[builder(setter(into))]
    pub input_roots: Vec<PathBuf>,

    /// Directory receiving the `.cbz` files. Created if it does not exist.
    #[builder(setter(into))]
    pub output_dir: PathBuf,

    /// How input roots are turned into jobs.
    ///
    /// - [`CollectionMode::Direct`]: each input root becomes one archive
    /// - [`CollectionMode::Recursive`]: each immediate subdirectory of an input root becomes one archive
    #[builder(default)]
    pub collection_mode: CollectionMode,

    /// Which files end up in the archives.
    ///
    /// - [`FilterMode::Smart`]: images, text and video only; system, VCS and editor files dropped
    /// - [`FilterMode::Dumb`]: every file
    #[builder(default)]
    pub filter_mode: FilterMode,

    /// Number of concurrent workers. Clamped to `[1, 2 x CPU cores]` when the run starts.
    #[builder(default = "4")]
    pub concurrency: usize,

    /// Pause each worker takes between two jobs. Zero disables it.
    #[builder(default = "DEFAULT_JOB_DELAY")]
    pub job_delay: Duration,

    /// Receiver of all progress, warning and error events. Defaults to the `log` facade.
    #[builder(default = "Arc::new(LogReporter) as Arc<dyn Reporter>")]
    pub reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("input_roots", &self.input_roots)
            .field("output_dir", &self.output_dir)
            .field("collection_mode", &self.collection_mode)
            .field("filter_mode", &self.filter_mode)
            .field("concurrency", &self.concurrency)
            .field("job_delay", &self.job_delay)
            // Skip the reporter, it carries no configuration
            .finish()
    }
}

impl ConverterConfig {
    /// Creates a new builder for configuring `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }

    /// Performs validation checks on the configuration without touching the filesystem.
    ///
    /// [`run`](ConverterConfig::run) calls this automatically; the builder already
    /// enforces the same rules, so this only fails for configs whose public fields
    /// were modified after building.
    ///
    /// # Returns
    ///
    /// * `Ok(&self)` - Configuration is valid
    /// * `Err(Error::Config)` - A required value is missing or empty
    pub fn preflight_check(&self) -> Result<&Self> {
        if self.input_roots.is_empty() {
            return Err(Error::Config(
                "At least one input directory is required".to_string(),
            ));
        }
        if self.input_roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err(Error::Config(
                "Input directory paths must not be empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("Output directory is required".to_string()));
        }
        Ok(self)
    }

    /// Discovers the jobs of this configuration without converting anything.
    pub async fn collect_jobs(&self) -> Vec<Job> {
        Collector::new(
            &self.output_dir,
            self.collection_mode,
            self.filter_mode,
            self.reporter.as_ref(),
        )
        .collect(&self.input_roots)
        .await
    }

    /// Runs the whole batch: creates the output directory, collects jobs,
    /// converts them concurrently and reports a summary.
    ///
    /// Individual job failures do not make this fail; they are counted in the
    /// returned [`Stats`]. Finding nothing to convert is not an error either.
    ///
    /// # Returns
    ///
    /// * `Ok(Stats)` - Final counts after every job finished
    /// * `Err(Error)` - Invalid configuration, or the output directory could not be created
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use tabane::prelude::*;
    /// # #[tokio::main]
    /// # async fn main() -> tabane::error::Result<()> {
    /// let config = ConverterConfig::builder()
    ///     .input_roots(vec![PathBuf::from("./raw/chapter 1")])
    ///     .output_dir(PathBuf::from("./archives"))
    ///     .filter_mode(FilterMode::Dumb)
    ///     .build()?;
    ///
    /// let stats = config.run().await?;
    /// println!("{} of {} archives created", stats.success, stats.total);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self) -> Result<Stats> {
        self.preflight_check()?;
        let reporter = self.reporter.as_ref();

        let pool = WorkerPool::new(self.concurrency, Arc::clone(&self.reporter))
            .with_job_delay(self.job_delay);

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::OutputDirectory(self.output_dir.clone(), e))?;

        reporter.info(&format!(
            "Starting CBZ conversion with {} threads",
            pool.concurrency()
        ));
        reporter.info(&format!(
            "Output: {}",
            path_to_string_lossy(&self.output_dir)
        ));
        reporter.info(match self.filter_mode {
            FilterMode::Dumb => "Mode: DUMB - archiving all files without filtering",
            FilterMode::Smart => "Mode: SMART - filtering files intelligently",
        });
        reporter.info(match self.collection_mode {
            CollectionMode::Recursive => "Mode: RECURSIVE - processing subdirectories",
            CollectionMode::Direct => "Mode: DIRECT - converting specified directories only",
        });

        let jobs = self.collect_jobs().await;
        if jobs.is_empty() {
            reporter.warn("No folders found to process");
            return Ok(Stats::default());
        }

        reporter.info(&format!("Found {} folders to process", jobs.len()));

        let stats = Arc::new(StatsAggregator::new(jobs.len()));
        pool.run(jobs, &stats).await?;

        let snapshot = stats.snapshot();
        report_summary(&snapshot, reporter);

        Ok(snapshot)
    }
}

impl ConverterConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(roots) = &self.input_roots {
            if roots.is_empty() {
                return Err("At least one input directory is required".to_string());
            }
            if roots.iter().any(|root| root.as_os_str().is_empty()) {
                return Err("Input directory paths must not be empty".to_string());
            }
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.as_os_str().is_empty() {
                return Err("Output directory is required".to_string());
            }
        }

        Ok(())
    }
}
