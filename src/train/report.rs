//! Tab-separated result log
//!
//! One file per dataset under the result directory, one row per completed
//! run. The header is written only when the file is first created, so rows
//! from successive folds and sweeps accumulate under a single header.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::TrainSpec;
use crate::error::TrainError;
use crate::eval::{ClassMetrics, EpochMetrics};

/// Class-metric blocks in the header, independent of the configured class
/// count. Runs with fewer classes zero-fill the trailing blocks so every
/// row has the same shape.
const REPORT_CLASSES: usize = 4;

fn header() -> String {
    let mut cols = vec![
        "Fold".to_string(),
        "lr".to_string(),
        "glr".to_string(),
        "dropout".to_string(),
        "Acc.".to_string(),
        "macroF".to_string(),
    ];
    for n in 1..=REPORT_CLASSES {
        cols.push(format!("Acc{n}"));
        cols.push(format!("Prec{n}"));
        cols.push(format!("Recll{n}"));
        cols.push(format!("F{n}"));
    }
    cols.join("\t")
}

/// Result-log path for a dataset.
pub fn report_path(result_dir: &Path, dataset: &str) -> PathBuf {
    result_dir.join(format!("{dataset}.txt"))
}

/// Append one result row, writing the header first when the file does not
/// exist yet.
pub fn append_row(spec: &TrainSpec, metrics: &EpochMetrics) -> Result<PathBuf, TrainError> {
    let path = report_path(&spec.result_dir, &spec.dataset);
    let wrap = |source| TrainError::Report { path: path.clone(), source };

    fs::create_dir_all(&spec.result_dir).map_err(wrap)?;
    let fresh = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(wrap)?;

    if fresh {
        writeln!(file, "{}", header()).map_err(wrap)?;
    }
    writeln!(file, "{}", format_row(spec, metrics)).map_err(wrap)?;
    Ok(path)
}

fn format_row(spec: &TrainSpec, metrics: &EpochMetrics) -> String {
    let mut row = format!(
        "{}\t{:.0E}\t{:.0E}\t{:.4}\t{:.4}\t{:.4}",
        spec.fold, spec.lr, spec.graph_lr, spec.dropout, metrics.accuracy, metrics.macro_f1,
    );
    let zero = ClassMetrics::zeroed();
    for n in 0..REPORT_CLASSES {
        let c = metrics.per_class.get(n).unwrap_or(&zero);
        row.push_str(&format!(
            "\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
            c.accuracy, c.precision, c.recall, c.f1
        ));
    }
    row
}
