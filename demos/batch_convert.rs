//! Example converting a whole manga library into CBZ archives.
//!
//! Every subdirectory of the library folder becomes one archive. Events are
//! printed to the terminal by a small custom [`Reporter`], and a preview of the
//! discovered jobs is shown before anything is written.
//!
//! Usage: `cargo run --example batch_convert -- <library> <output> [threads] [--dumb]`

use tabane::prelude::*;

/// Prints events with a short level tag.
struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn report(&self, level: Level, message: &str) {
        let tag = match level {
            Level::Info => "[INFO]",
            Level::Success => "[ OK ]",
            Level::Warning => "[WARN]",
            Level::Error => "[FAIL]",
        };
        println!("{} {}", tag, message);
    }
}

#[tokio::main]
async fn main() -> tabane::error::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let dumb = args.iter().any(|arg| arg == "--dumb");
    let positional: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();

    let library = PathBuf::from(positional.first().map(|s| s.as_str()).unwrap_or("./library"));
    let output = PathBuf::from(positional.get(1).map(|s| s.as_str()).unwrap_or("./cbz"));
    let threads = positional
        .get(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(4);

    println!("=== Tabane {} Batch Conversion Demo ===\n", tabane::VERSION);

    let config = ConverterConfig::builder()
        .input_roots(vec![library])
        .output_dir(output)
        .collection_mode(CollectionMode::Recursive)
        .filter_mode(if dumb { FilterMode::Dumb } else { FilterMode::Smart })
        .concurrency(threads)
        .reporter(Arc::new(TerminalReporter))
        .build()?;

    // Preview what would be converted
    let jobs = config.collect_jobs().await;
    println!("\n{} folder(s) queued:", jobs.len());
    for job in &jobs {
        println!("   {} -> {}", job.name, job.output_path.display());
    }
    println!();

    let stats = config.run().await?;

    println!(
        "\nDone: {} created, {} failed, {} skipped ({} files left out)",
        stats.success, stats.errors, stats.skipped, stats.non_image_files_excluded
    );

    Ok(())
}
