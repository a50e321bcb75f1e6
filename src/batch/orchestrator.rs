//! Per-job state machine and whole-run control flow.
//!
//! Jobs run strictly one at a time, in discovery order, each blocking until
//! the engine process exits. Only discovery failures abort the run; every
//! per-job failure is recorded and the remaining inputs still run. The
//! filesystem is the only durable completion record: an interrupted run is
//! resumed simply by running again, the skip check picks up where it left off.

use std::fs;
use std::path::Path;
use tracing::warn;

use crate::config::EngineConfig;
use crate::discovery::{self, AudioFile, DiscoveryError, AUDIO_EXTENSIONS};
use crate::engine::TranscriptionEngine;

use super::{FailureReason, Job, JobOutcome, RunSummary};

const SEPARATOR_WIDTH: usize = 40;

/// Drives a whole batch: discovery, skip-or-run per input, cleanup on
/// failure, aggregate counts.
pub struct Orchestrator<E> {
    config: EngineConfig,
    engine: E,
}

impl<E: TranscriptionEngine> Orchestrator<E> {
    pub fn new(config: EngineConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// Run over every audio file in `input_dir` and return the final counts.
    pub fn run(&self, input_dir: &Path) -> Result<RunSummary, DiscoveryError> {
        let files = discovery::find_audio_files(input_dir)?;

        if files.is_empty() {
            println!(
                "No audio files ({}) found in '{}'.",
                AUDIO_EXTENSIONS.join(", "),
                input_dir.display()
            );
            return Ok(RunSummary::default());
        }

        let output_dir = self.config.output_dir_for(input_dir);
        self.print_banner(&files, input_dir, &output_dir);

        let mut summary = RunSummary::default();
        for file in files {
            let job = Job::new(file, &self.config, &output_dir);
            let outcome = self.process(&job, &output_dir);
            summary.record(&outcome);
            println!("{}", "-".repeat(SEPARATOR_WIDTH));
        }

        println!("Transcription run finished.");
        println!("Succeeded: {}", summary.succeeded);
        if summary.failed > 0 {
            println!("Failed: {}", summary.failed);
        }

        Ok(summary)
    }

    /// Drive one job from pending to done: skip check, engine invocation,
    /// outcome classification, partial-artifact cleanup on failure.
    fn process(&self, job: &Job, output_dir: &Path) -> JobOutcome {
        println!("Processing: {}", job.input.path.display());

        if output_is_complete(&job.expected_output) {
            println!(
                "Output '{}' already exists and is not empty, skipping.",
                display_name(&job.expected_output)
            );
            return JobOutcome::Skipped;
        }

        let outcome = match self.engine.transcribe(&job.input.path, output_dir) {
            Ok(status) if status.success() => JobOutcome::Succeeded,
            Ok(status) => JobOutcome::Failed(FailureReason::EngineExit(status.code())),
            Err(err) => JobOutcome::Failed(FailureReason::Engine(err)),
        };

        match &outcome {
            JobOutcome::Failed(reason) => {
                eprintln!(
                    "ERROR transcribing '{}': {}",
                    job.input.display_name(),
                    reason
                );
                cleanup_partial_output(&job.expected_output);
            }
            _ => {
                println!("Finished transcribing '{}'.", job.input.display_name());
            }
        }

        outcome
    }

    fn print_banner(&self, files: &[AudioFile], input_dir: &Path, output_dir: &Path) {
        println!(
            "Found {} audio file(s) in '{}'.",
            files.len(),
            input_dir.display()
        );
        println!("Model: {}", self.config.model);
        println!("Language: {}", self.config.language);
        println!("Output format: {}", self.config.output_format);
        println!("Output directory: {}", output_dir.display());
        if self.config.model.to_lowercase().starts_with("large") {
            println!(
                "WARNING: the '{}' model needs significant memory and will take a while.",
                self.config.model
            );
        }
        println!("{}", "-".repeat(SEPARATOR_WIDTH));
    }
}

/// The idempotency check: a transcript exists and is non-empty.
///
/// Deliberately cheap and non-authoritative; content is not validated against
/// the current configuration.
fn output_is_complete(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Remove a partial artifact left behind by a failed engine run, so the next
/// run does not mistake it for a completed transcript. Deletion failure is
/// advisory only and never changes the job outcome.
fn cleanup_partial_output(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => println!("Removed incomplete output '{}'.", display_name(path)),
        Err(err) => warn!(
            "Could not remove incomplete output '{}': {}",
            path.display(),
            err
        ),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, EngineStatus};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Scripted engine: records every invocation, optionally writes an
    /// artifact, then reports the configured result.
    struct FakeEngine {
        exit_code: i32,
        /// Artifact content to write before exiting; `None` writes nothing.
        artifact: Option<&'static str>,
        available: bool,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl FakeEngine {
        fn succeeding(artifact: &'static str) -> Self {
            Self {
                exit_code: 0,
                artifact: Some(artifact),
                available: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(artifact: Option<&'static str>) -> Self {
            Self {
                exit_code: 1,
                artifact,
                available: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            Self {
                exit_code: 0,
                artifact: None,
                available: false,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn invocations(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl TranscriptionEngine for FakeEngine {
        fn transcribe(
            &self,
            input: &Path,
            output_dir: &Path,
        ) -> Result<EngineStatus, EngineError> {
            self.calls.borrow_mut().push(input.to_path_buf());

            if !self.available {
                return Err(EngineError::NotAvailable("fake-engine".to_string()));
            }

            if let Some(content) = self.artifact {
                let stem = input.file_stem().unwrap().to_string_lossy();
                fs::write(output_dir.join(format!("{}.txt", stem)), content).unwrap();
            }

            Ok(EngineStatus::new(Some(self.exit_code)))
        }
    }

    fn orchestrator(engine: &FakeEngine) -> Orchestrator<&FakeEngine> {
        Orchestrator::new(EngineConfig::default(), engine)
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"audio").unwrap();
    }

    #[test]
    fn test_missing_directory_aborts_without_invoking() {
        let engine = FakeEngine::succeeding("text");
        let result = orchestrator(&engine).run(Path::new("/definitely/not/here"));

        assert!(matches!(result, Err(DiscoveryError::DirectoryNotFound(_))));
        assert_eq!(engine.invocations(), 0);
    }

    #[test]
    fn test_empty_directory_is_a_successful_noop() {
        let tmp = TempDir::new().unwrap();
        let engine = FakeEngine::succeeding("text");

        let summary = orchestrator(&engine).run(tmp.path()).unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(engine.invocations(), 0);
    }

    #[test]
    fn test_pre_existing_output_is_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        fs::write(tmp.path().join("b.txt"), b"already transcribed").unwrap();

        let engine = FakeEngine::succeeding("text");
        let summary = orchestrator(&engine).run(tmp.path()).unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        // Only a.wav reaches the engine.
        assert_eq!(engine.calls.borrow().as_slice(), [tmp.path().join("a.wav")]);
    }

    #[test]
    fn test_second_run_invokes_nothing() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");

        let first = FakeEngine::succeeding("text");
        let summary = orchestrator(&first).run(tmp.path()).unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(first.invocations(), 2);

        let second = FakeEngine::succeeding("text");
        let summary = orchestrator(&second).run(tmp.path()).unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(second.invocations(), 0);
    }

    #[test]
    fn test_failed_job_partial_artifact_is_deleted() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "c.wav");

        // Engine writes a zero-byte transcript and exits nonzero.
        let engine = FakeEngine::failing(Some(""));
        let summary = orchestrator(&engine).run(tmp.path()).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 0);
        assert!(!tmp.path().join("c.txt").exists());
    }

    #[test]
    fn test_failure_without_artifact_needs_no_cleanup() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "c.wav");

        let engine = FakeEngine::failing(None);
        let summary = orchestrator(&engine).run(tmp.path()).unwrap();

        assert_eq!(summary.failed, 1);
        assert!(!tmp.path().join("c.txt").exists());
    }

    #[test]
    fn test_unavailable_engine_fails_jobs_but_not_the_run() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");

        let engine = FakeEngine::unavailable();
        let summary = orchestrator(&engine).run(tmp.path()).unwrap();

        // Both jobs are attempted and recorded; the run itself completes.
        assert_eq!(engine.invocations(), 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 0);
    }

    #[test]
    fn test_one_failure_does_not_stop_siblings() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        // Make b.wav's output pre-existing so only a.wav fails.
        fs::write(tmp.path().join("b.txt"), b"done").unwrap();

        let engine = FakeEngine::failing(None);
        let summary = orchestrator(&engine).run(tmp.path()).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 2);
    }
}
