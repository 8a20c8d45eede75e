mod service;

pub use service::{GitCloner, GitClonerConfig, GitServiceError};
