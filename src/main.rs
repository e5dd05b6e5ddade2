//! Arbol CLI
//!
//! Trains a rumor classifier on one cross-validation fold and appends the
//! best epoch's metrics to the dataset's result log.
//!
//! # Usage
//!
//! ```bash
//! # Train the default model on fold 0
//! arbol twitter15
//!
//! # Pick a fold, model, and learning rates
//! arbol weibo --fold 3 --model triple-gat-bert --lr 1e-4 --graph-lr 1e-5
//! ```

use clap::Parser;
use std::process::ExitCode;

use arbol::cli::{run_command, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
