//! Output formatting for the installer CLI.
//!
//! Progress and result lines are plain text written to stderr; the
//! `releases` and `info` commands can also render JSON for scripting.

use crate::artefact::catalog::ArtifactCatalog;
use crate::conflict::{ConflictDeclaration, PackageMetadata};
use crate::receipt::InstalledPackage;
use serde::Serialize;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output; ignore write failures.
    }
}

/// Format a success message after installation.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use terraform_demux_installer::artefact::sha256_digest::Sha256Digest;
/// use terraform_demux_installer::output::success_message;
/// use terraform_demux_installer::receipt::InstalledPackage;
///
/// let installed = InstalledPackage {
///     package: "terraform-demux".to_owned(),
///     version: "1.1.2".to_owned(),
///     sha256: Sha256Digest::of(b"archive"),
///     primary_binary_path: Utf8PathBuf::from("/opt/bin/terraform-demux"),
///     alias_name: "terraform".to_owned(),
///     alias_target_path: Utf8PathBuf::from("/opt/bin/terraform"),
///     conflicts_with: "terraform".to_owned(),
/// };
/// let msg = success_message(&installed);
/// assert!(msg.starts_with("Installed terraform-demux 1.1.2"));
/// ```
#[must_use]
pub fn success_message(installed: &InstalledPackage) -> String {
    format!(
        "Installed {} {} to {} (also available as {})",
        installed.package,
        installed.version,
        installed.primary_binary_path,
        installed.alias_target_path
    )
}

/// Format the result of an uninstall.
#[must_use]
pub fn uninstall_message(package: &str, removed: Option<&InstalledPackage>) -> String {
    match removed {
        Some(installed) => format!("Removed {} {}", installed.package, installed.version),
        None => format!("{package} is not installed"),
    }
}

/// Format the catalog as a human-readable listing.
///
/// # Examples
///
/// ```
/// use terraform_demux_installer::artefact::catalog::ArtifactCatalog;
/// use terraform_demux_installer::output::format_releases_human;
///
/// let catalog = ArtifactCatalog::builtin().expect("valid");
/// let text = format_releases_human(&catalog);
/// assert!(text.contains("1.1.2"));
/// assert!(text.contains("1.1.2 (latest)"));
/// assert!(text.contains("2.0.0 (unverified)"));
/// ```
#[must_use]
pub fn format_releases_human(catalog: &ArtifactCatalog) -> String {
    if catalog.releases().is_empty() {
        return String::from("No releases published.");
    }

    let latest = catalog.latest().map(|release| release.version());
    let mut output = String::from("Published releases:\n");
    for release in catalog.releases() {
        let marker = if Some(release.version()) == latest {
            " (latest)"
        } else if release.is_verified() {
            ""
        } else {
            " (unverified)"
        };
        output.push_str(&format!("\n{}{marker}\n", release.version()));
        for artifact in release.artifacts() {
            output.push_str(&format!(
                "  {:<20} {}  {}\n",
                artifact.key().to_string(),
                artifact.sha256().short(),
                artifact.archive_filename()
            ));
        }
    }
    output
}

#[derive(Serialize)]
struct ReleasesJson<'a> {
    latest: Option<&'a str>,
    releases: &'a [crate::artefact::catalog::Release],
}

/// Format the catalog as JSON.
#[must_use]
pub fn format_releases_json(catalog: &ArtifactCatalog) -> String {
    let json = ReleasesJson {
        latest: catalog.latest().map(|release| release.version()),
        releases: catalog.releases(),
    };
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_owned())
}

/// Format package metadata and its conflict declaration.
#[must_use]
pub fn format_info_human(metadata: &PackageMetadata) -> String {
    let conflict = metadata.conflict();
    [
        format!("{}: {}", metadata.name, metadata.description),
        format!("Homepage: {}", metadata.homepage),
        format!("License: {}", metadata.license),
        format!(
            "Installs: {} (alias: {})",
            metadata.primary_binary, metadata.alias
        ),
        format!(
            "Conflicts with: {} (both provide `{}`)",
            conflict.conflicts_with, conflict.slot
        ),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct InfoJson<'a> {
    #[serde(flatten)]
    metadata: &'a PackageMetadata,
    conflict: ConflictDeclaration,
}

/// Format package metadata as JSON.
#[must_use]
pub fn format_info_json(metadata: &PackageMetadata) -> String {
    let json = InfoJson {
        metadata,
        conflict: metadata.conflict(),
    };
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_owned())
}
