//! Install pipeline orchestration.
//!
//! Ties the stages together in the only order that is safe: look the version
//! up, select the host's artefact, fetch it, verify it against the pinned
//! digest, and only then hand it to the [`Installer`]. Each stage fails
//! fast; nothing touches the bin directory before verification succeeds.

use crate::artefact::catalog::{Artifact, ArtifactCatalog, UnknownVersion};
use crate::artefact::download::ArtefactDownloader;
use crate::artefact::matcher::select;
use crate::artefact::platform::Host;
use crate::artefact::verification::verify;
use crate::error::Result;
use crate::installer::Installer;
use crate::output::{success_message, write_stderr_line};
use crate::receipt::InstalledPackage;
use std::io::Write;

/// Inputs for one install run.
pub struct InstallRequest<'a> {
    /// Published releases.
    pub catalog: &'a ArtifactCatalog,
    /// Version to install; the latest release when `None`.
    pub version: Option<&'a str>,
    /// The machine being installed onto.
    pub host: &'a Host,
    /// Resolve and report without downloading or writing.
    pub dry_run: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// The artefact chosen for a host, before anything is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact<'a> {
    /// The release version.
    pub version: &'a str,
    /// The selected row.
    pub artifact: &'a Artifact,
    /// Whether the release pins published checksums. An unverified release
    /// is only reachable by naming it, and its download fails verification.
    pub verified: bool,
}

/// What an install run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome<'a> {
    /// The package was installed or upgraded.
    Installed(InstalledPackage),
    /// Dry run: the artefact that would have been installed.
    Planned(ResolvedArtifact<'a>),
}

/// Resolve `version` (or the latest verified release) to the host's
/// artefact.
///
/// # Errors
///
/// Returns [`crate::error::InstallerError::UnknownVersion`] if the version
/// is not published and
/// [`crate::error::InstallerError::UnsupportedPlatform`] if the release has
/// no row for the host.
pub fn resolve_artifact<'a>(
    catalog: &'a ArtifactCatalog,
    version: Option<&str>,
    host: &Host,
) -> Result<ResolvedArtifact<'a>> {
    let release = match version {
        Some(version) => catalog.release(version),
        None => catalog.latest(),
    };
    let release = release.ok_or_else(|| UnknownVersion {
        requested: version.unwrap_or("latest").to_owned(),
        available: catalog.versions().join(", "),
    })?;
    let artifact = select(host, release.artifacts())?;
    if !release.is_verified() {
        log::warn!(
            "release {} has no published checksums; verification will fail",
            release.version()
        );
    }
    Ok(ResolvedArtifact {
        version: release.version(),
        artifact,
        verified: release.is_verified(),
    })
}

/// Run the full install pipeline.
///
/// Progress lines go to `stderr` unless the request is quiet.
///
/// # Errors
///
/// Returns the first failing stage's error: unknown version, unsupported
/// platform, download failure, checksum mismatch, or any installer error.
pub fn run_install<'a>(
    request: &InstallRequest<'a>,
    downloader: &dyn ArtefactDownloader,
    installer: &Installer<'_>,
    stderr: &mut dyn Write,
) -> Result<InstallOutcome<'a>> {
    let resolved = resolve_artifact(request.catalog, request.version, request.host)?;
    let artifact = resolved.artifact;
    log::info!(
        "selected {} for {} ({})",
        artifact.archive_filename(),
        request.host,
        resolved.version
    );

    if !resolved.verified && !request.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Warning: terraform-demux {} has no published checksums",
                resolved.version
            ),
        );
    }

    if request.dry_run {
        if !request.quiet {
            write_stderr_line(
                stderr,
                format!(
                    "Would install terraform-demux {} from {}",
                    resolved.version,
                    artifact.url()
                ),
            );
        }
        return Ok(InstallOutcome::Planned(resolved));
    }

    // Fail before the download when the alias slot is already taken.
    installer.check_collision()?;

    if !request.quiet {
        write_stderr_line(stderr, format!("Downloading {}...", artifact.url()));
    }
    let bytes = downloader.fetch(artifact.url())?;

    if !request.quiet {
        write_stderr_line(
            stderr,
            format!("Verifying checksum {}...", artifact.sha256().short()),
        );
    }
    let verified = verify(bytes, artifact.sha256())?;

    let installed = installer.install(&verified, artifact, resolved.version)?;
    if !request.quiet {
        write_stderr_line(stderr, success_message(&installed));
    }
    Ok(InstallOutcome::Installed(installed))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
