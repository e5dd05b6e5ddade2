//! Fold identifier files
//!
//! One k-fold split is materialized on disk as one directory per fold,
//! each holding the train and test identifier lists as JSON arrays:
//!
//! ```text
//! {base}/{dataset}_5fold/fold{k}/train_ids.json
//! {base}/{dataset}_5fold/fold{k}/test_ids.json
//! ```
//!
//! Loading is idempotent; a missing file aborts the run.

use std::path::{Path, PathBuf};

use super::DataError;

/// One train/test split of a k-fold cross-validation.
#[derive(Clone, Debug)]
pub struct Fold {
    pub train_ids: Vec<String>,
    pub test_ids: Vec<String>,
}

/// Directory holding the identifier files of one fold.
pub fn fold_dir(base: &Path, dataset: &str, fold: usize) -> PathBuf {
    base.join(format!("{dataset}_5fold")).join(format!("fold{fold}"))
}

/// Load both identifier lists of one fold.
pub fn load_fold(base: &Path, dataset: &str, fold: usize) -> Result<Fold, DataError> {
    let dir = fold_dir(base, dataset, fold);
    let train_ids = load_id_list(&dir.join("train_ids.json"))?;
    let test_ids = load_id_list(&dir.join("test_ids.json"))?;
    if train_ids.is_empty() {
        return Err(DataError::EmptySplit { split: "train" });
    }
    if test_ids.is_empty() {
        return Err(DataError::EmptySplit { split: "test" });
    }
    Ok(Fold { train_ids, test_ids })
}

fn load_id_list(path: &Path) -> Result<Vec<String>, DataError> {
    if !path.is_file() {
        return Err(DataError::FoldFileMissing(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fold(dir: &Path, train: &[&str], test: &[&str]) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("train_ids.json"), serde_json::to_string(train).unwrap()).unwrap();
        std::fs::write(dir.join("test_ids.json"), serde_json::to_string(test).unwrap()).unwrap();
    }

    #[test]
    fn test_load_fold() {
        let tmp = tempfile::tempdir().unwrap();
        write_fold(&fold_dir(tmp.path(), "twitter15", 2), &["a", "b"], &["c"]);

        let fold = load_fold(tmp.path(), "twitter15", 2).unwrap();
        assert_eq!(fold.train_ids, vec!["a", "b"]);
        assert_eq!(fold.test_ids, vec!["c"]);
    }

    #[test]
    fn test_load_fold_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        write_fold(&fold_dir(tmp.path(), "d", 0), &["x"], &["y"]);

        let first = load_fold(tmp.path(), "d", 0).unwrap();
        let second = load_fold(tmp.path(), "d", 0).unwrap();
        assert_eq!(first.train_ids, second.train_ids);
        assert_eq!(first.test_ids, second.test_ids);
    }

    #[test]
    fn test_missing_fold_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_fold(tmp.path(), "twitter15", 0).unwrap_err();
        assert!(matches!(err, DataError::FoldFileMissing(_)));
    }

    #[test]
    fn test_missing_test_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = fold_dir(tmp.path(), "d", 1);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("train_ids.json"), "[\"a\"]").unwrap();

        let err = load_fold(tmp.path(), "d", 1).unwrap_err();
        match err {
            DataError::FoldFileMissing(path) => {
                assert!(path.ends_with("test_ids.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_split_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_fold(&fold_dir(tmp.path(), "d", 0), &[], &["y"]);
        let err = load_fold(tmp.path(), "d", 0).unwrap_err();
        assert!(matches!(err, DataError::EmptySplit { split: "train" }));
    }
}
