//! CLI command implementation

use std::path::PathBuf;

use clap::Parser;

use crate::cli::logging::{log, LogLevel};
use crate::config::{DatasetMode, ModelKind, TrainSpec};
use crate::data::{builder_for, load_fold};
use crate::error::TrainError;
use crate::seeded_rng;
use crate::train::{EpochRecord, Trainer};

/// Train a rumor classifier on one cross-validation fold
#[derive(Parser, Debug, Clone)]
#[command(name = "arbol", version, about)]
pub struct Cli {
    /// Dataset name (keys the fold directory and the result file)
    pub dataset: String,

    /// Fold index within the 5-fold split
    #[arg(short, long, default_value_t = 0)]
    pub fold: usize,

    /// Model architecture
    #[arg(short, long, default_value = "gat-bert")]
    pub model: ModelKind,

    /// Dataset construction mode
    #[arg(long, default_value = "combined")]
    pub mode: DatasetMode,

    /// Random seed for shuffling and weight initialization
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data directory holding fold files and graph examples
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Directory for the append-only result log
    #[arg(long, default_value = "./result")]
    pub result_dir: PathBuf,

    /// Directory for best-model checkpoints
    #[arg(long, default_value = "./checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Learning rate for the base parameters
    #[arg(long, default_value_t = 5e-5)]
    pub lr: f32,

    /// Learning rate for the graph-encoder stages
    #[arg(long, default_value_t = 1e-5)]
    pub graph_lr: f32,

    /// L2 weight decay
    #[arg(long, default_value_t = 0.0)]
    pub weight_decay: f32,

    /// Epochs without validation-loss improvement before stopping
    #[arg(long, default_value_t = 10)]
    pub patience: usize,

    /// Epoch budget
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Examples per batch
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// Number of target classes
    #[arg(long, default_value_t = 4)]
    pub n_classes: usize,

    /// Dropout probability on the pooled graph representation
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f32,

    /// Maximum nodes kept per tree
    #[arg(long, default_value_t = 1000)]
    pub max_tree_len: usize,

    /// Node feature dimensionality
    #[arg(long, default_value_t = 768)]
    pub feature_dim: usize,

    /// Hidden dimensionality of the graph-encoder stages
    #[arg(long, default_value_t = 64)]
    pub hidden_dim: usize,

    /// Loader worker count, accepted for interface parity; loading is
    /// always in-process
    #[arg(long, default_value_t = 0)]
    pub workers: usize,

    /// Suppress all output
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output with per-class metric lines
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Cli {
    pub fn into_spec(self) -> TrainSpec {
        TrainSpec {
            seed: self.seed,
            model: self.model,
            mode: self.mode,
            dataset: self.dataset,
            fold: self.fold,
            base_dir: self.base_dir,
            result_dir: self.result_dir,
            checkpoint_dir: self.checkpoint_dir,
            lr: self.lr,
            graph_lr: self.graph_lr,
            weight_decay: self.weight_decay,
            patience: self.patience,
            epochs: self.epochs,
            batch_size: self.batch_size,
            n_classes: self.n_classes,
            dropout: self.dropout,
            max_tree_len: self.max_tree_len,
            feature_dim: self.feature_dim,
            hidden_dim: self.hidden_dim,
            workers: self.workers,
        }
    }
}

/// Execute one training run from parsed arguments.
pub fn run_command(cli: Cli) -> Result<(), TrainError> {
    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    let spec = cli.into_spec();
    spec.validate()?;

    log(
        log_level,
        LogLevel::Normal,
        &format!(
            "Training {} on {} fold {} (seed {})",
            spec.model, spec.dataset, spec.fold, spec.seed
        ),
    );

    let fold = load_fold(&spec.base_dir, &spec.dataset, spec.fold)?;
    let builder = builder_for(spec.mode);
    let train = builder.build(&spec, &fold.train_ids, &spec.base_dir)?;
    let test = builder.build(&spec, &fold.test_ids, &spec.base_dir)?;
    log(
        log_level,
        LogLevel::Normal,
        &format!("Loaded {} train / {} test examples", train.len(), test.len()),
    );

    let mut trainer = Trainer::new(spec.clone())?;
    let mut rng = seeded_rng(spec.seed);
    let summary = trainer.run(&train, &test, &mut rng, |record| {
        report_epoch(log_level, record);
    })?;

    log(
        log_level,
        LogLevel::Normal,
        &format!(
            "Best epoch {} | Val_Loss {:.4} | Acc {:.4} | macroF {:.4}{}",
            summary.best.epoch,
            summary.best.val_loss,
            summary.best.metrics.accuracy,
            summary.best.metrics.macro_f1,
            if summary.stopped_early { " (early stop)" } else { "" },
        ),
    );
    log(
        log_level,
        LogLevel::Normal,
        &format!("Results appended to {}", summary.report_path.display()),
    );
    Ok(())
}

fn report_epoch(log_level: LogLevel, record: &EpochRecord) {
    log(
        log_level,
        LogLevel::Normal,
        &format!(
            "Epoch {} | Train_Loss {:.4} | Train_Acc {:.4} | Val_Loss {:.4} | Val_Acc {:.4}",
            record.epoch,
            record.train_loss,
            record.train_accuracy,
            record.val_loss,
            record.val_metrics.accuracy,
        ),
    );
    if record.skipped_batches > 0 {
        log(
            log_level,
            LogLevel::Normal,
            &format!(
                "  Warning: {} batch(es) skipped for non-finite loss",
                record.skipped_batches
            ),
        );
    }
    for (i, c) in record.val_metrics.per_class.iter().enumerate() {
        log(
            log_level,
            LogLevel::Verbose,
            &format!(
                "  C{} Acc {:.4} Prec {:.4} Recll {:.4} F {:.4}",
                i + 1,
                c.accuracy,
                c.precision,
                c.recall,
                c.f1,
            ),
        );
    }
}
