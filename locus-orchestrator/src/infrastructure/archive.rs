//! Archive extraction through the 7-Zip command line

use std::ffi::OsString;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::process;
use crate::domain::services::{ArchiveExtractor, ToolError};

/// Extracts any archive format 7-Zip understands (zip, tar, gz, 7z, rar, ...)
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    executable: String,
}

impl SevenZipExtractor {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check that the extractor can be launched and return its banner line.
    /// 7-Zip has no version flag; `7z i` prints the banner with its format list.
    pub async fn check_installation(&self) -> Result<String, ToolError> {
        let mut cmd = process::command(&self.executable);
        cmd.arg("i");
        let stdout = process::run(&self.executable, cmd).await?;
        let banner = String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("7-Zip"))
            .unwrap_or_default()
            .to_string();
        Ok(banner)
    }
}

impl Default for SevenZipExtractor {
    fn default() -> Self {
        Self::new("7z")
    }
}

#[async_trait]
impl ArchiveExtractor for SevenZipExtractor {
    #[instrument(skip(self), fields(archive = %archive.display()))]
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ToolError> {
        let mut output_flag = OsString::from("-o");
        output_flag.push(destination.as_os_str());

        let mut cmd = process::command(&self.executable);
        cmd.arg("x").arg(archive).arg(output_flag).arg("-y");

        process::run(&self.executable, cmd).await?;
        debug!(destination = %destination.display(), "Archive extracted");
        Ok(())
    }
}
