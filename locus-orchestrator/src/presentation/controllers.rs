//! Orchestrator API controllers

pub mod health;
pub mod loc;

use std::sync::Arc;
use std::time::Instant;

use crate::application::use_cases::{AnalyzeRepositoryUseCase, AnalyzeUploadUseCase};
use crate::infrastructure::order_token::OrderTokenIssuer;

pub use loc::dispatch;

/// Application state for the orchestrator
#[derive(Clone)]
pub struct OrchestratorState {
    pub analyze_repository: Arc<AnalyzeRepositoryUseCase>,
    pub analyze_upload: Arc<AnalyzeUploadUseCase>,
    pub order_tokens: Arc<OrderTokenIssuer>,
    /// First path segment every analysis request must carry
    pub api_version: String,
    pub startup_time: Instant,
}
