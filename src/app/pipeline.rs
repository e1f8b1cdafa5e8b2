//! Shared analysis pipeline used by the `analyze` and `batch` commands.
//!
//! load text -> phase series -> tau set -> estimators
//!
//! The commands can then focus on presentation and output files.

use std::path::Path;

use tracing::info;

use crate::cli::{EngineArgs, TauStrategy};
use crate::domain::{DeviationResult, EngineConfig, ErrorModel, ErrorModelKind};
use crate::error::AppError;
use crate::estimators::compute;
use crate::io::ingest::{LoadedSeries, load_series};
use crate::series::{PhaseSeries, input_to_phase};
use crate::tau::{self, TauSpec};

/// All computed outputs of a single `stab analyze` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: String,
    pub loaded: LoadedSeries,
    pub phase: PhaseSeries,
    pub results: Vec<DeviationResult>,
}

/// Load a file and turn it into a phase series per the engine options.
pub fn load_phase(path: &Path, engine: &EngineArgs) -> Result<(LoadedSeries, PhaseSeries), AppError> {
    let loaded = load_series(path, engine.column)?;
    let phase = input_to_phase(&loaded.values, engine.data_type, engine.rate)
        .map_err(|e| AppError::new(3, format!("{}: {e}", path.display())))?;
    Ok((loaded, phase))
}

/// Execute the full analysis pipeline for one file.
pub fn run_analysis(path: &Path, dataset: &str, engine: &EngineArgs) -> Result<RunOutput, AppError> {
    let config = engine_config(engine);
    config.validate()?;

    let (loaded, phase) = load_phase(path, engine)?;
    let taus = tau::generate(phase.len(), phase.tau0(), &tau_spec(engine), config.tau_fraction)?;
    info!(dataset, n = phase.len(), taus = taus.len(), estimators = engine.estimators.len(), "analyzing");

    let results = engine
        .estimators
        .iter()
        .map(|&kind| compute(kind, &phase, &taus, &config))
        .collect();

    Ok(RunOutput {
        dataset: dataset.to_string(),
        loaded,
        phase,
        results,
    })
}

pub fn engine_config(engine: &EngineArgs) -> EngineConfig {
    let error_model = match engine.error_model {
        ErrorModelKind::Naive => ErrorModel::Naive,
        ErrorModelKind::Edf => ErrorModel::Edf(engine.noise),
    };
    EngineConfig {
        tau_fraction: engine.fraction,
        error_model,
        parallel: !engine.serial,
    }
}

pub fn tau_spec(engine: &EngineArgs) -> TauSpec {
    if let Some(ms) = &engine.tau_list {
        return TauSpec::Ms(ms.clone());
    }
    if let Some(taus) = &engine.tau_seconds {
        return TauSpec::Taus(taus.clone());
    }
    match engine.taus {
        TauStrategy::All => TauSpec::All,
        TauStrategy::Octave => TauSpec::Octave,
        TauStrategy::Decade => TauSpec::Decade,
        TauStrategy::Log => TauSpec::Log {
            points: engine.log_points,
        },
    }
}

/// Dataset name for an input path: the file name without `.gz` and one more
/// extension.
pub fn dataset_name(path: &Path) -> String {
    let mut stem = path.file_stem().map(Path::new);
    let gz = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    if gz {
        stem = stem.map(|s| s.file_stem().map(Path::new).unwrap_or(s));
    }
    stem.and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("series")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::domain::{EstimatorKind, NoiseType};
    use clap::Parser;

    fn engine(extra: &[&str]) -> EngineArgs {
        let mut argv = vec!["stab", "analyze", "in.txt"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Analyze(args) => args.engine,
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn engine_options_map_to_config() {
        let config = engine_config(&engine(&["--noise", "ffm", "--serial", "--fraction", "0.1"]));
        assert_eq!(config.error_model, ErrorModel::Edf(NoiseType::Ffm));
        assert!(!config.parallel);
        assert_eq!(config.tau_fraction, 0.1);

        let naive = engine_config(&engine(&["--error-model", "naive", "--noise", "ffm"]));
        assert_eq!(naive.error_model, ErrorModel::Naive);
    }

    #[test]
    fn explicit_lists_override_the_strategy() {
        assert_eq!(tau_spec(&engine(&["--taus", "decade"])), TauSpec::Decade);
        assert_eq!(tau_spec(&engine(&["--taus", "log", "--log-points", "12"])), TauSpec::Log { points: 12 });
        assert_eq!(tau_spec(&engine(&["--taus", "all", "--tau-list", "3,5"])), TauSpec::Ms(vec![3, 5]));
        assert_eq!(tau_spec(&engine(&["--tau-seconds", "0.5,2"])), TauSpec::Taus(vec![0.5, 2.0]));
    }

    #[test]
    fn dataset_names_drop_extensions() {
        assert_eq!(dataset_name(Path::new("/data/maser-a.txt")), "maser-a");
        assert_eq!(dataset_name(Path::new("/data/maser-a.txt.gz")), "maser-a");
        assert_eq!(dataset_name(Path::new("hm3")), "hm3");
    }

    #[test]
    fn run_analysis_end_to_end() {
        let path = std::env::temp_dir().join(format!("stab-pipeline-{}.txt", std::process::id()));
        let text: String = (0..512).map(|i| format!("{i} {:e}\n", 1e-9 * ((i as f64) * 0.9).sin())).collect();
        std::fs::write(&path, text).unwrap();

        let out = run_analysis(&path, "ramp", &engine(&["--estimators", "adev,mdev", "--rate", "2"]));
        std::fs::remove_file(&path).ok();
        let out = out.unwrap();

        assert_eq!(out.phase.len(), 512);
        assert_eq!(out.phase.tau0(), 0.5);
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.results[0].kind, EstimatorKind::Adev);
        assert_eq!(out.results[0].points[0].tau, 0.5);
        assert!(out.results.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn bad_fraction_is_a_usage_error() {
        let err = run_analysis(Path::new("unused.txt"), "x", &engine(&["--fraction", "0.9"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
