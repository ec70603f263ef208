use anyhow::{bail, Result};

/// Ceiling above which worker counts get a suggestion on platforms with a descriptor limit.
pub const SUGGEST_ABOVE_WITH_CEILING: usize = 4096;
/// Same, for platforms that expose no descriptor ceiling.
pub const SUGGEST_ABOVE_WITHOUT_CEILING: usize = 2048;
/// Fraction of the descriptor ceiling the workers may not reach.
pub const MAX_CEILING_SHARE: f64 = 0.9;

/// Source of the process's open-file ceiling, if the platform has one.
pub trait DescriptorLimit {
    fn ceiling(&self) -> Option<u64>;
}

/// Reads the soft `RLIMIT_NOFILE` of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLimit;

impl DescriptorLimit for SystemLimit {
    #[cfg(unix)]
    fn ceiling(&self) -> Option<u64> {
        match rlimit::Resource::NOFILE.get() {
            Ok((soft, _hard)) if soft != rlimit::INFINITY => Some(soft),
            _ => None,
        }
    }

    #[cfg(not(unix))]
    fn ceiling(&self) -> Option<u64> {
        None
    }
}

/// Non-fatal outcome of the worker check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    Fine,
    Suggest(String),
}

/// Decide whether `workers` is safe given an optional descriptor `ceiling`.
///
/// Errors when the workers would take 90% or more of the ceiling. Large worker
/// counts below that only earn a suggestion.
pub fn check_workers(workers: usize, ceiling: Option<u64>) -> Result<Advisory> {
    match ceiling {
        Some(max_files) => {
            if max_files == 0 || workers as f64 / max_files as f64 >= MAX_CEILING_SHARE {
                bail!(
                    "number of requested workers ({workers}) is at least 90% of the system's maximum \
                     open files / connections ({max_files}); please lower the worker count"
                );
            }
            if workers > SUGGEST_ABOVE_WITH_CEILING {
                return Ok(Advisory::Suggest(format!(
                    "try lowering your worker count below {SUGGEST_ABOVE_WITH_CEILING} if you \
                     experience inconsistent results or unexpected behavior"
                )));
            }
            Ok(Advisory::Fine)
        }
        None if workers > SUGGEST_ABOVE_WITHOUT_CEILING => Ok(Advisory::Suggest(format!(
            "try lowering your worker count below {SUGGEST_ABOVE_WITHOUT_CEILING} if you \
             experience inconsistent results or unexpected behavior"
        ))),
        None => Ok(Advisory::Suggest(
            "if you notice inconsistent results, try lowering your worker count".to_string(),
        )),
    }
}
