//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the tracing subscriber
//! - runs the analysis pipeline or the batch driver
//! - prints tables and writes optional exports

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::batch::{BatchOutcome, BatchUnit, CancelToken, Dataset, run_batch};
use crate::cli::{AnalyzeArgs, BatchArgs, Command, ShowArgs};
use crate::error::AppError;
use crate::io::{build_result_file, read_result_json, write_result_json, write_results_csv};

pub mod pipeline;

/// Entry point for the `stab` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    let cli = crate::cli::Cli::parse();
    crate::logging::configure_tracing(cli.verbose);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Batch(args) => handle_batch(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let dataset = args.name.clone().unwrap_or_else(|| pipeline::dataset_name(&args.file));
    let run = pipeline::run_analysis(&args.file, &dataset, &args.engine)?;
    let config = pipeline::engine_config(&args.engine);

    print!(
        "{}",
        crate::report::format_run_summary(&run.dataset, &run.phase, args.engine.data_type, &config)
    );
    if !run.loaded.row_errors.is_empty() {
        println!(
            "Skipped rows: {} of {}",
            run.loaded.row_errors.len(),
            run.loaded.rows_read
        );
    }
    for result in &run.results {
        println!();
        print!("{}", crate::report::format_result_table(result));
    }

    if let Some(path) = &args.json {
        let doc = build_result_file(
            &run.dataset,
            &run.phase,
            args.engine.data_type,
            config.error_model,
            &run.results,
        );
        write_result_json(path, &doc)?;
        info!(path = %path.display(), "wrote result document");
    }
    if let Some(path) = &args.csv {
        write_results_csv(path, &run.results)?;
        info!(path = %path.display(), "wrote CSV export");
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = pipeline::engine_config(&args.engine);
    config.validate()?;
    std::fs::create_dir_all(&args.out_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output directory '{}': {e}", args.out_dir.display()),
        )
    })?;

    let spec = pipeline::tau_spec(&args.engine);
    let mut loaded = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match pipeline::load_phase(path, &args.engine) {
            Ok((_, phase)) => loaded.push((pipeline::dataset_name(path), phase)),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping input"),
        }
    }
    if loaded.is_empty() {
        return Err(AppError::new(3, "No batch input could be loaded."));
    }

    let (names, phases): (Vec<String>, Vec<_>) = loaded.into_iter().unzip();
    let datasets: Vec<Dataset> = unique_names(names)
        .into_iter()
        .zip(phases)
        .map(|(name, phase)| Dataset {
            name,
            phase,
            taus: spec.clone(),
        })
        .collect();

    let cancel = deadline_token(args.deadline)?;
    let units = run_batch(&datasets, &args.engine.estimators, &config, &cancel);
    print!("{}", crate::report::format_batch_summary(&units));

    for (idx, dataset) in datasets.iter().enumerate() {
        let results: Vec<_> = units
            .iter()
            .filter(|u| u.index == idx)
            .filter_map(BatchUnit::result)
            .cloned()
            .collect();
        if results.is_empty() {
            continue;
        }
        let doc = build_result_file(
            &dataset.name,
            &dataset.phase,
            args.engine.data_type,
            config.error_model,
            &results,
        );
        write_result_json(&output_path(&args.out_dir, &dataset.name), &doc)?;
    }

    let failed = units
        .iter()
        .filter(|u| matches!(u.outcome, BatchOutcome::Failed(_)))
        .count();
    if failed > 0 {
        return Err(AppError::new(2, format!("{failed} batch unit(s) failed.")));
    }
    Ok(())
}

/// A token that cancels itself `deadline` seconds from now.
fn deadline_token(deadline: Option<f64>) -> Result<CancelToken, AppError> {
    let cancel = CancelToken::new();
    if let Some(secs) = deadline {
        let delay = Duration::try_from_secs_f64(secs)
            .map_err(|e| AppError::new(2, format!("Invalid --deadline {secs}: {e}")))?;
        let token = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            token.cancel();
        });
    }
    Ok(cancel)
}

/// Suffix repeated dataset names (`clock`, `clock-2`, ...) so every input
/// gets its own output document.
fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut k = 2;
            while taken.contains(&candidate) {
                candidate = format!("{name}-{k}");
                k += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let doc = read_result_json(&args.json)?;
    print!("{}", crate::report::format_result_file(&doc));
    Ok(())
}

fn output_path(dir: &Path, dataset: &str) -> PathBuf {
    dir.join(format!("{dataset}.json"))
}
