//! Transcription engine boundary.
//!
//! The orchestrator only sees the [`TranscriptionEngine`] trait; the real
//! implementation shells out to the whisper CLI, and tests substitute a fake
//! that simulates success, nonzero exit, and an unavailable engine.

pub mod whisper;

pub use whisper::WhisperCli;

use std::path::Path;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine '{0}' could not be started; is it installed and on PATH?")]
    NotAvailable(String),

    #[error("Failed to invoke engine: {0}")]
    Invocation(String),
}

/// Exit classification of one engine run.
///
/// The exit code is the sole success signal; engine output is never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    code: Option<i32>,
}

impl EngineStatus {
    /// Status from a raw exit code; `None` means killed by a signal.
    pub fn new(code: Option<i32>) -> Self {
        Self { code }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for EngineStatus {
    fn from(status: ExitStatus) -> Self {
        Self::new(status.code())
    }
}

/// One engine invocation: transcribe `input` into `output_dir`.
///
/// Both error variants are job-scoped; the run continues with the next input.
pub trait TranscriptionEngine {
    fn transcribe(&self, input: &Path, output_dir: &Path) -> Result<EngineStatus, EngineError>;
}

impl<E: TranscriptionEngine + ?Sized> TranscriptionEngine for &E {
    fn transcribe(&self, input: &Path, output_dir: &Path) -> Result<EngineStatus, EngineError> {
        (**self).transcribe(input, output_dir)
    }
}
