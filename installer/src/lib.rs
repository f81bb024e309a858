//! terraform-demux installer library.
//!
//! This crate provides the core functionality for installing the prebuilt
//! terraform-demux launcher: a release catalog, host-to-artefact matching,
//! digest verification, and an installer that places the launcher together
//! with its `terraform` alias. It is used by the `terraform-demux-installer`
//! CLI binary and can be consumed programmatically for testing or custom
//! installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Release catalog, platform matching, download, extraction
//!   and verification
//! - [`cli`] - Command-line argument definitions
//! - [`conflict`] - Package metadata and the `terraform` conflict declaration
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types with retry hints
//! - [`installer`] - Atomic placement of the launcher and alias
//! - [`logging`] - Stderr subscriber setup and level selection
//! - [`output`] - Progress lines and human/JSON formatting
//! - [`pipeline`] - Lookup, select, fetch, verify and install orchestration
//! - [`receipt`] - Install receipts

pub mod artefact;
pub mod cli;
pub mod conflict;
pub mod dirs;
pub mod error;
pub mod installer;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod receipt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
