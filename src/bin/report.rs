use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use imbalance_tree::data::dataset::Dataset;
use imbalance_tree::data::reader::read_csv;
use imbalance_tree::data::synthetic::{make_imbalanced, SyntheticParams};
use imbalance_tree::evaluation::{run_experiments, EvaluationResult, ExperimentConfig};
use imbalance_tree::metrics::threshold::ThresholdScore;

#[derive(Parser)]
#[command(name = "imbalance-report")]
#[command(about = "Compare baseline, class-weighted and oversampled decision trees on imbalanced data")]
#[command(version)]
struct Cli {
    /// Path to a headed CSV file; synthetic data is generated when absent or missing
    #[arg(long)]
    data: Option<PathBuf>,

    /// Name of the 0/1 label column
    #[arg(long, default_value = "Class")]
    label_column: String,

    /// Columns to drop before training
    #[arg(long, default_value = "Time")]
    drop: Vec<String>,

    /// Columns to standardize to zero mean and unit variance
    #[arg(long, default_value = "Amount")]
    scale: Vec<String>,

    /// Number of synthetic samples
    #[arg(long, default_value_t = 20_000)]
    samples: usize,

    /// Number of synthetic features
    #[arg(long, default_value_t = 20)]
    features: usize,

    /// Number of synthetic features that separate the classes
    #[arg(long, default_value_t = 3)]
    informative: usize,

    /// Fraction of synthetic samples in the positive class
    #[arg(long, default_value_t = 0.002)]
    positive_fraction: f64,

    /// Fraction of each class held out for testing
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// Maximum tree depth (0 = unbounded)
    #[arg(long, default_value_t = 6)]
    max_depth: u16,

    /// Minimum number of samples required to split a node
    #[arg(long, default_value_t = 10)]
    min_samples_split: u16,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Decision thresholds for the tuning table
    #[arg(long, value_delimiter = ',', default_value = "0.1,0.2,0.3,0.4,0.5")]
    thresholds: Vec<f64>,

    /// Directory to write ROC / PR curve points as CSV
    #[arg(long)]
    curves_dir: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

fn load_dataset(cli: &Cli) -> Result<Dataset<f64>> {
    match cli.data.as_deref().filter(|path| path.exists()) {
        Some(path) => {
            info!(path = %path.display(), "loading dataset");
            let (mut dataset, names) = read_csv(path, &cli.label_column, &cli.drop)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let columns: Vec<usize> = cli
                .scale
                .iter()
                .filter_map(|name| {
                    let index = names.iter().position(|n| n == name);
                    if index.is_none() {
                        warn!(column = %name, "column to scale not found");
                    }
                    index
                })
                .collect();
            dataset.standardize_columns(&columns);
            Ok(dataset)
        }
        None => {
            if let Some(path) = &cli.data {
                warn!(path = %path.display(), "data file not found; generating synthetic dataset");
            } else {
                info!("no data file given; generating synthetic dataset");
            }
            let params = SyntheticParams {
                n_samples: cli.samples,
                n_features: cli.features,
                n_informative: cli.informative,
                positive_fraction: cli.positive_fraction,
                seed: Some(cli.seed),
                ..SyntheticParams::default()
            };
            make_imbalanced(&params).context("failed to generate synthetic dataset")
        }
    }
}

fn print_result(result: &EvaluationResult) {
    let auc = |value: Option<f64>| value.map_or_else(|| "undefined".to_string(), |v| format!("{v:.6}"));
    println!("\n{} metrics:", result.name);
    println!("Accuracy:  {:.6}", result.accuracy);
    println!("Precision: {:.6}", result.precision);
    println!("Recall:    {:.6}", result.recall);
    println!("F1-score:  {:.6}", result.f1);
    println!("ROC-AUC:   {}", auc(result.roc_auc));
    println!("PR-AUC:    {}", auc(result.pr_auc));
    println!("Confusion Matrix:\n{}", result.confusion_matrix);
}

fn print_summary(results: &[&EvaluationResult]) {
    println!("\nSummary of model performance:");
    println!(
        "{:<18} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Model", "Accuracy", "Precision", "Recall", "F1", "ROC-AUC"
    );
    for result in results {
        let roc_auc = result
            .roc_auc
            .map_or_else(|| "-".to_string(), |v| format!("{v:.6}"));
        println!(
            "{:<18} {:>10.6} {:>10.6} {:>10.6} {:>10.6} {:>10}",
            result.name, result.accuracy, result.precision, result.recall, result.f1, roc_auc
        );
    }
}

fn print_sweep(scores: &[ThresholdScore]) {
    println!("\nThreshold tuning (upsampled model):");
    for score in scores {
        println!(
            "Threshold={:.2}  Precision={:.4}  Recall={:.4}  F1={:.4}",
            score.threshold, score.precision, score.recall, score.f1
        );
    }
}

fn export_curves(dir: &Path, results: &[&EvaluationResult], test: &Dataset<f64>) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for result in results {
        if result.roc_auc.is_none() {
            continue;
        }
        let stem = result.name.to_lowercase().replace(' ', "_");
        let roc_path = dir.join(format!("{stem}_roc.csv"));
        result
            .roc_curve(test.y())?
            .write_csv(&roc_path, "fpr", "tpr")
            .with_context(|| format!("failed to write {}", roc_path.display()))?;
        let pr_path = dir.join(format!("{stem}_pr.csv"));
        result
            .pr_curve(test.y())?
            .write_csv(&pr_path, "recall", "precision")
            .with_context(|| format!("failed to write {}", pr_path.display()))?;
        info!(model = %result.name, dir = %dir.display(), "curves written");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let dataset = load_dataset(&cli)?;
    let [negatives, positives] = dataset.class_counts();
    info!(negatives, positives, n_features = dataset.ncols(), "class distribution");

    let (train, test) = dataset
        .stratified_train_test_split(cli.test_size, Some(cli.seed))
        .context("failed to split dataset")?;
    info!(train = ?train.class_counts(), test = ?test.class_counts(), "stratified split");

    let max_depth = (cli.max_depth > 0).then_some(cli.max_depth);
    let mut config = ExperimentConfig::new(max_depth, cli.min_samples_split)
        .context("invalid tree parameters")?;
    config.random_seed = Some(cli.seed);
    config.thresholds = cli.thresholds.clone();

    let report = run_experiments(&train, &test, &config).context("experiments failed")?;
    let results = report.results();

    for result in &results {
        print_result(result);
    }
    print_summary(&results);
    if let Some(scores) = &report.threshold_sweep {
        print_sweep(scores);
    }

    if let Some(dir) = &cli.curves_dir {
        export_curves(dir, &results, &test)?;
    }

    Ok(())
}
