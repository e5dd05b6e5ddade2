//! Console output gating
//!
//! Training progress goes to stdout through a single gate so `--quiet`
//! silences everything and `--verbose` adds the per-class metric lines.

/// Output verbosity for a training run.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// No output at all.
    Quiet,
    /// Run header, per-epoch summary lines, final result.
    Normal,
    /// Normal plus the per-class metric lines.
    Verbose,
}

impl LogLevel {
    /// Whether a message tagged `required` passes this level's gate.
    pub fn allows(self, required: LogLevel) -> bool {
        match self {
            LogLevel::Quiet => false,
            LogLevel::Normal => required == LogLevel::Normal,
            LogLevel::Verbose => true,
        }
    }
}

/// Print `msg` when the run's level admits messages tagged `required`.
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level.allows(required) {
        println!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_allows_nothing() {
        assert!(!LogLevel::Quiet.allows(LogLevel::Normal));
        assert!(!LogLevel::Quiet.allows(LogLevel::Verbose));
        assert!(!LogLevel::Quiet.allows(LogLevel::Quiet));
    }

    #[test]
    fn test_normal_drops_verbose_detail() {
        assert!(LogLevel::Normal.allows(LogLevel::Normal));
        assert!(!LogLevel::Normal.allows(LogLevel::Verbose));
    }

    #[test]
    fn test_verbose_allows_everything_tagged() {
        assert!(LogLevel::Verbose.allows(LogLevel::Normal));
        assert!(LogLevel::Verbose.allows(LogLevel::Verbose));
    }
}
