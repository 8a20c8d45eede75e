//! scc executor
//!
//! Runs `scc <tree> -f json` and hands back the raw JSON report. Decoding
//! lives in [`super::output`] so callers can decide how strict to be.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::services::{LineCounter, ToolError};
use crate::infrastructure::process;

#[derive(Debug, Clone)]
pub struct SccLineCounter {
    executable: String,
}

impl SccLineCounter {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check if scc is installed and accessible
    #[instrument(skip(self))]
    pub async fn check_installation(&self) -> Result<String, ToolError> {
        let version = process::probe_version(&self.executable, "--version").await?;
        debug!(version = %version, "scc found");
        Ok(version)
    }
}

impl Default for SccLineCounter {
    fn default() -> Self {
        Self::new("scc")
    }
}

#[async_trait]
impl LineCounter for SccLineCounter {
    #[instrument(skip(self), fields(tree = %tree.display()))]
    async fn count(&self, tree: &Path) -> Result<Vec<u8>, ToolError> {
        let mut cmd = process::command(&self.executable);
        cmd.arg(tree).arg("-f").arg("json");

        let stdout = process::run(&self.executable, cmd).await?;
        debug!(bytes = stdout.len(), "scc report received");
        Ok(stdout)
    }
}
