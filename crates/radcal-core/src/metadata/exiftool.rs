use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::consts::{EXIFTOOL_BINARY, EXIFTOOL_PATH_ENV};
use crate::error::{RadcalError, Result};

use super::{ImageMetadata, MetadataSource};

/// Reads metadata by running an external `exiftool` process.
#[derive(Clone, Debug)]
pub struct ExifTool {
    executable: PathBuf,
}

impl ExifTool {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Pick the executable: an explicit path wins; on Windows the
    /// `exiftoolpath` environment variable is consulted; otherwise
    /// `exiftool` is resolved through `PATH`.
    pub fn discover(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }
        if cfg!(windows) {
            if let Some(path) = std::env::var_os(EXIFTOOL_PATH_ENV) {
                return Self::new(path);
            }
        }
        Self::new(EXIFTOOL_BINARY)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl MetadataSource for ExifTool {
    fn read(&self, path: &Path) -> Result<ImageMetadata> {
        debug!(file = %path.display(), exiftool = %self.executable.display(), "Reading metadata");
        let output = Command::new(&self.executable)
            .args(["-j", "-n", "-G"])
            .arg(path)
            .output()
            .map_err(|e| {
                RadcalError::ExifTool(format!(
                    "cannot run {}: {e}",
                    self.executable.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RadcalError::ExifTool(format!(
                "{} exited with {} for {}: {}",
                self.executable.display(),
                output.status,
                path.display(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        ImageMetadata::from_exiftool_json(path, &stdout)
    }
}
