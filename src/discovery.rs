//! Audio file discovery.
//!
//! Lists the regular files directly inside a directory (non-recursive) whose
//! extension matches a fixed set of common audio containers.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Audio extensions accepted as transcription input (compared case-insensitively).
pub const AUDIO_EXTENSIONS: [&str; 9] = [
    "opus", "mp3", "wav", "m4a", "ogg", "flac", "aac", "aiff", "wma",
];

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Directory '{0}' not found or not a directory")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to list '{0}': {1}")]
    Listing(PathBuf, std::io::Error),
}

/// One candidate input found by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    /// Lowercased extension without the leading dot.
    pub extension: String,
}

impl AudioFile {
    /// File name for operator-facing log lines.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Finds audio files directly inside `dir`, sorted by file name so batch runs
/// process inputs in a stable order.
///
/// Subdirectories and non-regular files are ignored. An empty result is not an
/// error; the caller decides that the run is a no-op.
pub fn find_audio_files(dir: &Path) -> Result<Vec<AudioFile>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries =
        fs::read_dir(dir).map_err(|e| DiscoveryError::Listing(dir.to_path_buf(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DiscoveryError::Listing(dir.to_path_buf(), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let extension = extension.to_lowercase();
        if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            files.push(AudioFile { path, extension });
        }
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!("Found {} audio file(s) in {}", files.len(), dir.display());
    Ok(files)
}
