//! Remote source providers

mod github;
mod gitlab;
mod registry;

pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use registry::SourceProviderRegistry;

use std::time::Duration;

/// Build the shared HTTP client for a provider.
fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("locus/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

const BYTES_PER_MB: u64 = 1024 * 1024;
