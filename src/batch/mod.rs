//! Batch job model and run accounting.

pub mod orchestrator;

pub use orchestrator::Orchestrator;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::discovery::AudioFile;
use crate::engine::EngineError;

/// One unit of work: one audio input under the run's fixed configuration.
#[derive(Debug, Clone)]
pub struct Job {
    pub input: AudioFile,
    /// Where the engine is expected to write the transcript.
    pub expected_output: PathBuf,
}

impl Job {
    pub fn new(input: AudioFile, config: &EngineConfig, output_dir: &Path) -> Self {
        let expected_output = config.expected_output_path(&input.path, output_dir);
        Self {
            input,
            expected_output,
        }
    }
}

/// Why a job failed.
#[derive(Debug)]
pub enum FailureReason {
    /// Engine ran but exited nonzero; `None` means killed by a signal.
    EngineExit(Option<i32>),
    /// Engine could not be started or waited on.
    Engine(EngineError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::EngineExit(Some(code)) => write!(f, "engine exited with code {}", code),
            FailureReason::EngineExit(None) => write!(f, "engine terminated by a signal"),
            FailureReason::Engine(err) => write!(f, "{}", err),
        }
    }
}

/// Final classification of one job. Exactly one is recorded per input.
#[derive(Debug)]
pub enum JobOutcome {
    /// Output already present and non-empty; engine not invoked.
    Skipped,
    /// Engine exited zero.
    Succeeded,
    Failed(FailureReason),
}

impl JobOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed(_))
    }
}

/// Aggregate counts for one run. Skipped jobs count as succeeded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &JobOutcome) {
        if outcome.is_failure() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whole-run verdict: any failed job fails the invocation.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
