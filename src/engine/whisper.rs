//! Whisper CLI invocation.

use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::config::EngineConfig;

use super::{EngineError, EngineStatus, TranscriptionEngine};

/// Engine implementation that runs the external whisper CLI, one process per
/// input, blocking until it exits.
///
/// The child inherits stdout/stderr so the operator sees engine progress
/// live; nothing is captured or parsed.
pub struct WhisperCli {
    config: EngineConfig,
}

impl WhisperCli {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build the engine command line. The input path comes before the options
    /// (whisper in module mode requires positional-before-optional ordering).
    fn build_command(&self, input: &Path, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .arg(input)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--language")
            .arg(self.config.language.as_str())
            .arg("--output_format")
            .arg(&self.config.output_format)
            .arg("--output_dir")
            .arg(output_dir);

        for (flag, value) in &self.config.extra_args {
            command.arg(format!("--{}", flag)).arg(value);
        }

        command
    }
}

impl TranscriptionEngine for WhisperCli {
    fn transcribe(&self, input: &Path, output_dir: &Path) -> Result<EngineStatus, EngineError> {
        let mut command = self.build_command(input, output_dir);
        debug!("Running engine: {:?}", command);

        let status = command.status().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                EngineError::NotAvailable(self.config.program.clone())
            } else {
                EngineError::Invocation(e.to_string())
            }
        })?;

        Ok(EngineStatus::from(status))
    }
}
