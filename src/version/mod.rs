//! Version retrieval layer
//!
//! This module provides the core functionality for fetching a manifest from a
//! hosted repository, caching the declared version, and comparing it against
//! a caller-supplied version.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Tracker   │────▶│    Cache    │
//! │  (fetch)    │     │ (decode,    │     │ (per key)   │
//! └─────────────┘     │  validate)  │     └─────────────┘
//!        │            └─────────────┘
//!        ▼                   │
//! ┌─────────────┐     ┌─────────────┐
//! │   Sources   │     │   Semver    │
//! │  (github)   │     │ (compare)   │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tracker`]: `VersionTracker`, the entry point
//! - [`source`]: Trait for fetching file contents from a repository
//! - [`sources`]: Concrete sources (GitHub contents API)
//! - [`payload`]: Raw vs. base64-enveloped manifest decoding
//! - [`cache`]: Short-lived in-memory cache
//! - [`clock`]: Time source, injectable for tests
//! - [`semver`]: Version validation, ordering and update classification
//! - [`repository`]: Repository reference normalization
//! - [`error`]: Error types
//! - [`types`]: `PackageInfo` and `UpdateCheckResult`

pub mod cache;
pub mod clock;
pub mod error;
pub mod payload;
pub mod repository;
pub mod semver;
pub mod source;
pub mod sources;
pub mod tracker;
pub mod types;
