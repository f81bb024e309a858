//! Release catalog: published versions and their per-platform artefacts.
//!
//! The catalog is plain data. Each release lists platform rows in a fixed
//! order; adding a platform means adding a row, never code. Rows are
//! validated when the catalog is loaded so that no two rows of one release
//! can ever match the same host.
//!
//! A release whose checksums are not yet published is marked
//! `unverified = true`. Its rows carry all-zero digests, it is never chosen as
//! the default version, and requesting it explicitly fails verification.

use super::error::{ArtefactError, Result};
use super::platform::{CpuArch, OsFamily, PlatformKey};
use super::sha256_digest::Sha256Digest;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The release definitions shipped with the installer.
const BUILTIN_CATALOG: &str = include_str!("../../releases.toml");

/// One downloadable archive for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    os: OsFamily,
    arch: CpuArch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bits64: Option<bool>,
    url: String,
    sha256: Sha256Digest,
}

impl Artifact {
    /// Create an artefact row.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidUrl`] unless `url` is an HTTP(S) URL
    /// naming a file.
    pub fn new(key: PlatformKey, url: impl Into<String>, sha256: Sha256Digest) -> Result<Self> {
        let artifact = Self {
            os: key.os,
            arch: key.arch,
            bits64: key.bits64,
            url: url.into(),
            sha256,
        };
        validate_url(&artifact.url)?;
        Ok(artifact)
    }

    /// The selection key of this row.
    #[must_use]
    pub const fn key(&self) -> PlatformKey {
        PlatformKey {
            os: self.os,
            arch: self.arch,
            bits64: self.bits64,
        }
    }

    /// The download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The pinned digest of the archive at [`Self::url`].
    #[must_use]
    pub const fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }

    /// The archive filename, taken from the last URL path segment.
    #[must_use]
    pub fn archive_filename(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// A published version together with its platform artefacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    version: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    unverified: bool,
    #[serde(rename = "platform")]
    artifacts: Vec<Artifact>,
}

impl Release {
    /// Create a release, rejecting empty or overlapping platform rows.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidVersion`],
    /// [`ArtefactError::EmptyRelease`],
    /// [`ArtefactError::OverlappingPlatforms`], or
    /// [`ArtefactError::PlaceholderDigest`].
    pub fn new(version: impl Into<String>, artifacts: Vec<Artifact>) -> Result<Self> {
        Self::build(version.into(), artifacts, false)
    }

    /// Create a release whose checksums are not published yet.
    ///
    /// Placeholder digests are allowed; the release is skipped by
    /// [`ArtifactCatalog::latest`].
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as [`Self::new`], except
    /// [`ArtefactError::PlaceholderDigest`].
    pub fn new_unverified(version: impl Into<String>, artifacts: Vec<Artifact>) -> Result<Self> {
        Self::build(version.into(), artifacts, true)
    }

    fn build(version: String, artifacts: Vec<Artifact>, unverified: bool) -> Result<Self> {
        let release = Self {
            version,
            unverified,
            artifacts,
        };
        release.validate()?;
        Ok(release)
    }

    /// The version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The artefacts in definition order.
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Whether every row pins a published checksum.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        !self.unverified
    }

    fn validate(&self) -> Result<()> {
        if self.version.is_empty() || self.version.chars().any(char::is_whitespace) {
            return Err(ArtefactError::InvalidVersion {
                value: self.version.clone(),
            });
        }
        if self.artifacts.is_empty() {
            return Err(ArtefactError::EmptyRelease {
                version: self.version.clone(),
            });
        }
        for artifact in &self.artifacts {
            validate_url(artifact.url())?;
            if !self.unverified && artifact.sha256().is_placeholder() {
                return Err(ArtefactError::PlaceholderDigest {
                    version: self.version.clone(),
                    platform: artifact.key().to_string(),
                });
            }
        }
        for (index, later) in self.artifacts.iter().enumerate() {
            let earlier = self
                .artifacts
                .iter()
                .take(index)
                .find(|earlier| earlier.key().overlaps(&later.key()));
            if let Some(earlier) = earlier {
                return Err(ArtefactError::OverlappingPlatforms {
                    version: self.version.clone(),
                    first: earlier.key().to_string(),
                    second: later.key().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The requested version is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown version {requested}; published versions: {available}")]
pub struct UnknownVersion {
    /// The version that was asked for.
    pub requested: String,
    /// Comma-separated list of published versions.
    pub available: String,
}

/// Immutable table of published releases.
///
/// # Examples
///
/// ```
/// use terraform_demux_installer::artefact::catalog::ArtifactCatalog;
///
/// let catalog = ArtifactCatalog::builtin().expect("shipped catalog is valid");
/// let artifacts = catalog.lookup("1.1.2").expect("published version");
/// assert_eq!(artifacts.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCatalog {
    releases: Vec<Release>,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(rename = "release", default)]
    releases: Vec<RawRelease>,
}

#[derive(Deserialize)]
struct RawRelease {
    version: String,
    #[serde(default)]
    unverified: bool,
    #[serde(rename = "platform", default)]
    artifacts: Vec<Artifact>,
}

impl ArtifactCatalog {
    /// Create a catalog from already-validated releases.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::DuplicateVersion`] if a version repeats.
    pub fn new(releases: Vec<Release>) -> Result<Self> {
        let mut seen = HashSet::new();
        for release in &releases {
            if !seen.insert(release.version()) {
                return Err(ArtefactError::DuplicateVersion {
                    version: release.version().to_owned(),
                });
            }
        }
        Ok(Self { releases })
    }

    /// The catalog compiled into this binary.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded definitions are invalid.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse and validate release definitions written in TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidCatalog`] for syntax or field errors
    /// and the validation errors of [`Release::new`] and [`Self::new`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawCatalog = toml::from_str(text).map_err(|e| ArtefactError::InvalidCatalog {
            reason: e.to_string(),
        })?;
        let releases = raw
            .releases
            .into_iter()
            .map(|raw| Release::build(raw.version, raw.artifacts, raw.unverified))
            .collect::<Result<Vec<_>>>()?;
        Self::new(releases)
    }

    /// Read a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidCatalog`] if the file cannot be read
    /// or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ArtefactError::InvalidCatalog {
            reason: format!("failed to read {path}: {e}"),
        })?;
        Self::from_toml_str(&text)
    }

    /// Return the artefacts for an exactly matching version.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownVersion`] if no release has this version.
    pub fn lookup(&self, version: &str) -> std::result::Result<&[Artifact], UnknownVersion> {
        self.release(version)
            .map(Release::artifacts)
            .ok_or_else(|| UnknownVersion {
                requested: version.to_owned(),
                available: self.versions().join(", "),
            })
    }

    /// Return the release for an exactly matching version.
    #[must_use]
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.iter().find(|release| release.version() == version)
    }

    /// All releases in definition order.
    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Published versions in definition order.
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.releases.iter().map(Release::version).collect()
    }

    /// The last-defined verified release, used when no version is requested.
    #[must_use]
    pub fn latest(&self) -> Option<&Release> {
        self.releases.iter().rev().find(|release| release.is_verified())
    }
}

fn validate_url(url: &str) -> Result<()> {
    let has_scheme = url.starts_with("https://") || url.starts_with("http://");
    if !has_scheme || url.ends_with('/') || url.chars().any(char::is_whitespace) {
        return Err(ArtefactError::InvalidUrl {
            value: url.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
