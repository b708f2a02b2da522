//! Content source implementations

pub mod github;

pub use github::GitHubContentSource;
