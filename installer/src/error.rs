//! Error types for the terraform-demux installer.
//!
//! This module defines the semantic error variants surfaced to the caller.
//! Each variant says whether the caller can do anything about it; only
//! download failures are transient.

use crate::artefact::catalog::UnknownVersion;
use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::matcher::UnsupportedPlatform;
use crate::artefact::verification::ChecksumMismatch;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during installation, upgrade or removal.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The requested version is not published in the catalog.
    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersion),

    /// The host has no matching artefact in the release.
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),

    /// The archive could not be fetched.
    #[error("download failed (retry later): {0}")]
    DownloadFailure(#[from] DownloadError),

    /// The fetched archive does not match the pinned digest.
    #[error("refusing to install untrusted artefact: {0}")]
    ChecksumMismatch(#[from] ChecksumMismatch),

    /// The alias name is already occupied by another package.
    #[error(
        "{path} is owned by the {owner} package; uninstall {owner} before installing {package}"
    )]
    InstallCollision {
        /// The occupied alias path.
        path: Utf8PathBuf,
        /// The package that owns the alias slot.
        owner: &'static str,
        /// The package being installed.
        package: &'static str,
    },

    /// The release catalog is invalid.
    #[error("release catalog error: {0}")]
    Catalog(#[from] ArtefactError),

    /// The archive could not be unpacked.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The install receipt could not be read or written.
    #[error("install receipt at {path} is unreadable: {reason}")]
    Receipt {
        /// Path of the receipt file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A required directory could not be determined.
    #[error("could not determine {what} directory; pass it explicitly")]
    DirectoryUnavailable {
        /// Which directory was missing (e.g. "bin").
        what: &'static str,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Whether retrying the same operation could succeed.
    ///
    /// Only transport failures are transient; a checksum mismatch in
    /// particular is never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DownloadFailure(_))
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::platform::Host;
    use crate::artefact::sha256_digest::Sha256Digest;

    #[test]
    fn install_collision_suggests_uninstall() {
        let err = InstallerError::InstallCollision {
            path: Utf8PathBuf::from("/usr/local/bin/terraform"),
            owner: "terraform",
            package: "terraform-demux",
        };
        let msg = err.to_string();
        assert!(msg.contains("uninstall terraform before installing terraform-demux"));
        assert!(msg.contains("/usr/local/bin/terraform"));
    }

    #[test]
    fn only_download_failures_are_retryable() {
        let download = InstallerError::from(DownloadError::NotFound {
            url: "https://example.test/a.tar.gz".to_owned(),
        });
        assert!(download.is_retryable());

        let mismatch = InstallerError::from(ChecksumMismatch {
            expected: Sha256Digest::of(b"a"),
            actual: Sha256Digest::of(b"b"),
        });
        assert!(!mismatch.is_retryable());

        let unsupported = InstallerError::from(UnsupportedPlatform {
            host: Host::from_names("linux", "armv7l", None),
            available: Vec::new(),
        });
        assert!(!unsupported.is_retryable());
    }

    #[test]
    fn unknown_version_is_reported_verbatim() {
        let err = InstallerError::from(UnknownVersion {
            requested: "9.9.9".to_owned(),
            available: "1.1.2, 2.0.0".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "unknown version 9.9.9; published versions: 1.1.2, 2.0.0"
        );
    }

    #[test]
    fn write_failed_preserves_source() {
        let source = std::io::Error::other("broken pipe");
        let err = InstallerError::WriteFailed { source };
        assert!(std::error::Error::source(&err).is_some());
    }
}
