//! In-memory collaborators that record how the pipeline drove them

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use locus_orchestrator::domain::services::{
    ArchiveExtractor, CancelFlag, LineCounter, RepositoryCloner, SourceProvider,
    SourceProviderError, ToolError, UploadBody,
};
use locus_orchestrator::domain::value_objects::{RepositoryId, SourceKind};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Provider answering from fixed values
pub struct FakeProvider {
    kind: SourceKind,
    exists: bool,
    size_mb: u64,
    unreachable: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeProvider {
    pub fn existing(kind: SourceKind, size_mb: u64) -> Self {
        Self {
            kind,
            exists: true,
            size_mb,
            unreachable: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn missing(kind: SourceKind) -> Self {
        Self {
            exists: false,
            ..Self::existing(kind, 0)
        }
    }

    pub fn unreachable(kind: SourceKind) -> Self {
        Self {
            unreachable: true,
            ..Self::existing(kind, 0)
        }
    }

    /// Capability calls in order: `"exists"` or `"size"`
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceProvider for FakeProvider {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn clone_url(&self, repository: &RepositoryId) -> String {
        format!("https://{}.com/{}", self.kind, repository)
    }

    async fn repository_exists(
        &self,
        _repository: &RepositoryId,
    ) -> Result<bool, SourceProviderError> {
        self.calls.lock().unwrap().push("exists");
        if self.unreachable {
            return Err(SourceProviderError::Transport {
                provider: "fake",
                source: "connection refused".into(),
            });
        }
        Ok(self.exists)
    }

    async fn repository_size_mb(
        &self,
        _repository: &RepositoryId,
    ) -> Result<u64, SourceProviderError> {
        self.calls.lock().unwrap().push("size");
        Ok(self.size_mb)
    }
}

/// How a fake tool behaves when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    Fail,
    /// Never completes; only a timeout or cancellation ends it
    Hang,
    /// Ignores cancellation and keeps writing for [`LINGER`] on a blocking
    /// thread, the way a libgit2 checkout does
    Linger,
}

pub const LINGER: Duration = Duration::from_millis(200);

fn io_error(error: std::io::Error) -> ToolError {
    ToolError::Backend(Box::new(error))
}

async fn act(behaviour: Behaviour, program: &str) -> Result<(), ToolError> {
    match behaviour {
        Behaviour::Succeed => Ok(()),
        Behaviour::Fail => Err(ToolError::Failed {
            program: program.to_string(),
            status: "exit status: 128".to_string(),
            stderr: "fatal: simulated failure".to_string(),
        }),
        Behaviour::Hang => std::future::pending().await,
        Behaviour::Linger => {
            tokio::time::sleep(LINGER).await;
            Ok(())
        }
    }
}

/// Cloner that writes a marker file into the destination
pub struct FakeCloner {
    behaviour: Behaviour,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeCloner {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryCloner for FakeCloner {
    async fn clone_repository(
        &self,
        url: &str,
        destination: &Path,
        cancel: CancelFlag,
    ) -> Result<(), ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        tokio::fs::write(destination.join("README.md"), b"# cloned\n")
            .await
            .map_err(io_error)?;
        match self.behaviour {
            Behaviour::Hang => {
                while !cancel.is_cancelled() {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                Err(ToolError::Failed {
                    program: "git".to_string(),
                    status: "cancelled".to_string(),
                    stderr: String::new(),
                })
            }
            Behaviour::Linger => {
                let destination = destination.to_path_buf();
                tokio::task::spawn_blocking(move || {
                    std::thread::sleep(LINGER);
                    let nested = destination.join("src").join("deep");
                    std::fs::create_dir_all(&nested)?;
                    std::fs::write(nested.join("late.rs"), b"fn late() {}\n")
                })
                .await
                .map_err(|e| ToolError::Backend(Box::new(e)))?
                .map_err(io_error)
            }
            behaviour => act(behaviour, "git").await,
        }
    }
}

/// Extractor that records the archive it was handed
pub struct FakeExtractor {
    behaviour: Behaviour,
    archives: Mutex<Vec<(PathBuf, Vec<u8>)>>,
}

impl FakeExtractor {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            archives: Mutex::new(Vec::new()),
        }
    }

    /// Archive paths with the bytes they held at extraction time
    pub fn archives(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.archives.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveExtractor for FakeExtractor {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ToolError> {
        let content = tokio::fs::read(archive).await.map_err(io_error)?;
        self.archives
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), content));
        act(self.behaviour, "7z").await?;
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(io_error)?;
        tokio::fs::write(destination.join("main.go"), b"package main\n")
            .await
            .map_err(io_error)?;
        Ok(())
    }
}

/// Counter returning a canned report
pub struct FakeCounter {
    behaviour: Behaviour,
    report: Vec<u8>,
    trees: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeCounter {
    pub fn new(report: Vec<u8>) -> Self {
        Self {
            behaviour: Behaviour::Succeed,
            report,
            trees: Mutex::new(Vec::new()),
        }
    }

    pub fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            ..Self::new(Vec::new())
        }
    }

    /// Trees counted, with whether each existed when the counter ran
    pub fn trees(&self) -> Vec<(PathBuf, bool)> {
        self.trees.lock().unwrap().clone()
    }
}

#[async_trait]
impl LineCounter for FakeCounter {
    async fn count(&self, tree: &Path) -> Result<Vec<u8>, ToolError> {
        self.trees
            .lock()
            .unwrap()
            .push((tree.to_path_buf(), tree.is_dir()));
        act(self.behaviour, "scc").await?;
        Ok(self.report.clone())
    }
}

/// Upload body served from memory, optionally failing after some chunks
pub struct MemoryUpload {
    chunks: VecDeque<Vec<u8>>,
    fail_when_drained: bool,
}

impl MemoryUpload {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            fail_when_drained: false,
        }
    }

    /// Stream the chunks, then fail as a dropped connection would
    pub fn interrupted(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            fail_when_drained: true,
        }
    }
}

#[async_trait]
impl UploadBody for MemoryUpload {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, BoxError> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.fail_when_drained => Err("connection reset by peer".into()),
            None => Ok(None),
        }
    }
}
