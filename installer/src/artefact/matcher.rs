//! Host-to-artefact selection.
//!
//! Selection walks the rows of one release in definition order and returns
//! the first whose [`PlatformKey`] accepts the host. Rows are validated as
//! non-overlapping when the catalog loads, so at most one row can match.
//! There is no fallback: a host without a matching row is unsupported.

use super::catalog::Artifact;
use super::platform::{Host, PlatformKey};
use std::fmt;

/// No artefact of the release matches the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no artefact for host {host}; available platforms: {}", SupportedList(.available))]
pub struct UnsupportedPlatform {
    /// The host that failed to match.
    pub host: Host,
    /// The platform keys the release does provide.
    pub available: Vec<PlatformKey>,
}

struct SupportedList<'a>(&'a [PlatformKey]);

impl fmt::Display for SupportedList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Select the artefact for `host` from one release's rows.
///
/// # Errors
///
/// Returns [`UnsupportedPlatform`] when no row matches.
///
/// # Examples
///
/// ```
/// use terraform_demux_installer::artefact::catalog::ArtifactCatalog;
/// use terraform_demux_installer::artefact::matcher::select;
/// use terraform_demux_installer::artefact::platform::{CpuArch, Host, OsFamily};
///
/// let catalog = ArtifactCatalog::builtin().expect("valid");
/// let artifacts = catalog.lookup("1.1.2").expect("published");
/// let host = Host::new(OsFamily::Macos, CpuArch::Arm, true);
/// let artifact = select(&host, artifacts).expect("supported");
/// assert!(artifact.url().ends_with("_darwin_arm64.tar.gz"));
/// ```
pub fn select<'a>(
    host: &Host,
    artifacts: &'a [Artifact],
) -> Result<&'a Artifact, UnsupportedPlatform> {
    let selected = artifacts
        .iter()
        .find(|artifact| artifact.key().matches(host));
    match selected {
        Some(artifact) => {
            log::debug!("host {host} matched platform {}", artifact.key());
            Ok(artifact)
        }
        None => Err(UnsupportedPlatform {
            host: host.clone(),
            available: artifacts.iter().map(Artifact::key).collect(),
        }),
    }
}
