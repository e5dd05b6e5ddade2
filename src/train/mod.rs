//! Training loop, early stopping, checkpointing, and result reporting

mod checkpoint;
mod early_stopping;
pub mod loss;
mod report;
mod trainer;

pub use checkpoint::{checkpoint_path, Checkpoint, CheckpointError};
pub use early_stopping::{BestSnapshot, EarlyStopping, StopState};
pub use report::{append_row, report_path};
pub use trainer::{EpochRecord, RunSummary, Trainer};
