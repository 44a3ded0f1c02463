//! GridGuard Trainer - offline batch training entry point
//!
//! Reads the whole data store, fits the forest, prints the classification
//! report and confusion matrix, and writes the model artifact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use gridguard_core::constants::{
    self, APP_NAME, APP_VERSION, DEFAULT_N_ESTIMATORS, DEFAULT_SEED, DEFAULT_TEST_SIZE,
};
use gridguard_core::logic::model::{
    ClassWeight, ClassificationReport, LabelPolicy, PowerThreshold, Trainer, TrainingConfig,
};
use gridguard_core::CsvStore;

#[derive(Parser, Debug)]
#[command(name = "gridguard-train", version, about = "Train the electricity-theft classifier")]
struct Cli {
    /// Training data CSV
    #[arg(long, default_value_t = constants::get_data_file())]
    data: String,

    /// Output model artifact
    #[arg(long, default_value_t = constants::get_model_path())]
    model: String,

    /// Number of trees
    #[arg(long, default_value_t = DEFAULT_N_ESTIMATORS)]
    estimators: usize,

    /// Held-out fraction
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    test_size: f64,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Plain shuffle split instead of stratified
    #[arg(long)]
    no_stratify: bool,

    /// balanced | none
    #[arg(long, default_value_t = ClassWeight::Balanced)]
    class_weight: ClassWeight,

    /// supplied | threshold | prefer-supplied
    #[arg(long, default_value_t = LabelPolicy::PreferSupplied)]
    label_policy: LabelPolicy,

    /// Power at or below which rows are labeled normal
    #[arg(long, default_value_t = constants::get_power_threshold())]
    power_threshold: f64,

    /// Also write the evaluation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct TrainingSummary<'a> {
    model_path: &'a str,
    train_rows: usize,
    test_rows: usize,
    config: &'a TrainingConfig,
    report: &'a ClassificationReport,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("{} trainer v{}", APP_NAME, APP_VERSION);

    let config = TrainingConfig {
        n_estimators: cli.estimators,
        test_size: cli.test_size,
        stratify: !cli.no_stratify,
        seed: cli.seed,
        class_weight: cli.class_weight,
        label_policy: cli.label_policy,
        power_threshold: PowerThreshold::new(cli.power_threshold),
    };

    let store = CsvStore::existing(&cli.data)
        .with_context(|| format!("cannot open data store {}", cli.data))?;

    let outcome = Trainer::new(config)
        .train_and_persist(&store, Path::new(&cli.model))
        .context("training failed")?;

    println!("{}", outcome.report);

    if let Some(path) = &cli.report {
        let summary = TrainingSummary {
            model_path: &cli.model,
            train_rows: outcome.train_rows,
            test_rows: outcome.test_rows,
            config: &config,
            report: &outcome.report,
        };
        fs::write(path, serde_json::to_vec_pretty(&summary)?)
            .with_context(|| format!("cannot write report {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    log::info!(
        "Model saved to {} ({} trees, {} training rows)",
        cli.model,
        outcome.artifact.forest.n_trees(),
        outcome.train_rows
    );
    Ok(())
}
