//! Release artefacts: where they are published, which one a host needs, and
//! how one is fetched, checked and unpacked.
//!
//! # Sub-modules
//!
//! - [`catalog`] - Published releases and their platform rows.
//! - [`platform`] - OS and architecture families, host descriptors.
//! - [`matcher`] - First-match selection of a release row for a host.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - Digest check producing a `VerifiedArtefact`.
//! - [`download`] - Artefact download trait and HTTP implementation.
//! - [`extraction`] - Archive extraction with path traversal protection.
//! - [`error`] - Semantic error types for validation failures.

pub mod catalog;
pub mod download;
pub mod error;
pub mod extraction;
pub mod matcher;
pub mod platform;
pub mod sha256_digest;
pub mod verification;
