use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use pdf_squash::cli::Args;
use pdf_squash::config::Settings;
use pdf_squash::files::remove_if_exists;
use pdf_squash::model::{format_size, BudgetCheck, CollisionPolicy, CompressionRequest, JobResult};
use pdf_squash::pdf::{check_budget, persist_parts, split_into_equal_parts, SizeBoundedSplitter};
use pdf_squash::{CancelToken, JobController, SplitPart};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    let settings = Settings::from_args(&args);
    let output_path = args.output_path();
    let (dpi, quality) = args.resolution();

    let request = CompressionRequest::new(&args.input, &output_path, dpi, quality)
        .with_context(|| format!("Invalid request for {}", args.input.display()))?;
    log::info!("Compressing at {} dpi (quality {})", dpi, quality);

    // Ctrl-C cancels the running job; with no job running it exits at once
    let running: Arc<Mutex<Option<CancelToken>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&running);
    ctrlc::set_handler(move || {
        let cancelled = slot.lock().as_ref().is_some_and(|token| token.cancel());
        if cancelled {
            eprintln!("\nCancelling...");
        } else {
            std::process::exit(130);
        }
    })
    .context("Failed to install Ctrl-C handler")?;

    let mut controller = JobController::new(settings.clone());
    let token = controller
        .start(request)
        .context("Failed to start compression job")?
        .canceller();
    *running.lock() = Some(token);

    let result = controller
        .wait(|progress| {
            eprint!("\r{}", progress);
            let _ = std::io::stderr().flush();
        })
        .context("Failed to run compression job")?;
    eprintln!();

    match result {
        JobResult::Success => {}
        JobResult::Failure(detail) => anyhow::bail!("Compression failed: {}", detail),
        JobResult::Cancelled => anyhow::bail!("Compression cancelled"),
    }

    let report = controller.report()?;
    println!("Original size:   {}", format_size(report.original_bytes));
    println!("Compressed size: {}", format_size(report.compressed_bytes));
    println!("Reduction:       {:.1}%", report.reduction_percent());
    let output_path = controller.accept(None)?;
    println!("Successfully wrote PDF to {}", output_path.display());

    let policy = if args.force {
        CollisionPolicy::Overwrite
    } else {
        CollisionPolicy::Fail
    };

    let parts = if let Some(budget) = args.split_size {
        match check_budget(&output_path, budget)? {
            BudgetCheck::AlreadyFits { byte_size } if !args.split_anyway => {
                println!(
                    "Compressed file ({}) already fits within {}; not splitting (use --split-anyway, or --parts N for equal parts)",
                    format_size(byte_size),
                    format_size(budget)
                );
                return Ok(());
            }
            _ => SizeBoundedSplitter::new(budget)
                .split(&output_path, &settings.work_dir)
                .context("Failed to split compressed PDF")?,
        }
    } else if let Some(count) = args.parts {
        split_into_equal_parts(&output_path, count, &settings.work_dir)
            .context("Failed to split compressed PDF")?
    } else {
        return Ok(());
    };

    report_parts(&parts, &output_path, policy)
}

fn report_parts(parts: &[SplitPart], base: &Path, policy: CollisionPolicy) -> Result<()> {
    let persisted = match persist_parts(parts, base, policy) {
        Ok(persisted) => persisted,
        Err(e) => {
            for part in parts {
                if let Err(e) = remove_if_exists(&part.path) {
                    log::warn!("Could not remove {}: {}", part.path.display(), e);
                }
            }
            return Err(e).context("Failed to save split parts");
        }
    };

    for part in &persisted {
        println!(
            "{} (pages {}-{}, {})",
            part.path.display(),
            part.page_range_start,
            part.page_range_end,
            format_size(part.byte_size)
        );
    }
    Ok(())
}
