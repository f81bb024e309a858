//! Error types for release catalog values and platform descriptors.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// An operating system tag is not one the catalog understands.
    #[error("unsupported operating system \"{value}\"; expected one of: {expected}")]
    UnsupportedOs {
        /// The rejected tag.
        value: String,
        /// Comma-separated list of accepted tags.
        expected: String,
    },

    /// An architecture tag is not one the catalog understands.
    #[error("unsupported architecture \"{value}\"; expected one of: {expected}")]
    UnsupportedArch {
        /// The rejected tag.
        value: String,
        /// Comma-separated list of accepted tags.
        expected: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// A release version string is empty or contains whitespace.
    #[error("invalid release version \"{value}\"")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
    },

    /// A download URL is empty or not an HTTP(S) URL.
    #[error("invalid download URL \"{value}\"")]
    InvalidUrl {
        /// The rejected URL.
        value: String,
    },

    /// The same version is defined more than once.
    #[error("release {version} is defined more than once")]
    DuplicateVersion {
        /// The repeated version.
        version: String,
    },

    /// A release declares no platforms at all.
    #[error("release {version} declares no platforms")]
    EmptyRelease {
        /// The empty release's version.
        version: String,
    },

    /// Two platform rows of one release could match the same host.
    #[error("release {version} has overlapping platforms {first} and {second}")]
    OverlappingPlatforms {
        /// The release version.
        version: String,
        /// The earlier row.
        first: String,
        /// The later row that overlaps it.
        second: String,
    },

    /// A release that claims verified checksums carries a placeholder
    /// digest.
    #[error("release {version} pins a placeholder digest for {platform}; mark it unverified")]
    PlaceholderDigest {
        /// The release version.
        version: String,
        /// The platform row carrying the placeholder.
        platform: String,
    },

    /// The catalog text could not be parsed.
    #[error("invalid release catalog: {reason}")]
    InvalidCatalog {
        /// Description of the parse failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
