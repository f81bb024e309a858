//! Platform descriptors for artefact selection.
//!
//! Catalog rows are tagged with a canonical operating system (`macos`,
//! `linux`) and architecture family (`arm`, `intel`). Host descriptors are
//! built from whatever the running process reports and may carry values the
//! catalog does not know; those never match any row.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical operating system tags accepted in the catalog.
const SUPPORTED_OS: &[&str] = &["macos", "linux"];

/// The canonical architecture tags accepted in the catalog.
const SUPPORTED_ARCH: &[&str] = &["arm", "intel"];

/// Environment variable overriding the detected host architecture.
pub const ARCH_OVERRIDE_ENV: &str = "TF_DEMUX_ARCH";

/// Operating system family of a catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OsFamily {
    /// Apple macOS (Darwin).
    Macos,
    /// Linux, any distribution.
    Linux,
}

impl OsFamily {
    /// Return the canonical catalog tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Macos => "macos",
            Self::Linux => "linux",
        }
    }

    /// Map an operating system name reported by a host to a family.
    ///
    /// Accepts the names used by Rust (`macos`), Go (`darwin`) and the
    /// canonical catalog tags.
    #[must_use]
    pub fn from_host_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Some(Self::Macos),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }
}

impl TryFrom<&str> for OsFamily {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "macos" => Ok(Self::Macos),
            "linux" => Ok(Self::Linux),
            _ => Err(ArtefactError::UnsupportedOs {
                value: value.to_owned(),
                expected: SUPPORTED_OS.join(", "),
            }),
        }
    }
}

impl TryFrom<String> for OsFamily {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processor architecture family of a catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CpuArch {
    /// ARM, 32- or 64-bit.
    Arm,
    /// Intel/AMD x86, 32- or 64-bit.
    Intel,
}

impl CpuArch {
    /// Return the canonical catalog tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Intel => "intel",
        }
    }

    /// Map an architecture name reported by a host to a family and the
    /// word size that name implies.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::artefact::platform::CpuArch;
    ///
    /// assert_eq!(CpuArch::from_host_name("aarch64"), Some((CpuArch::Arm, true)));
    /// assert_eq!(CpuArch::from_host_name("armv7"), Some((CpuArch::Arm, false)));
    /// assert_eq!(CpuArch::from_host_name("amd64"), Some((CpuArch::Intel, true)));
    /// assert_eq!(CpuArch::from_host_name("riscv64"), None);
    /// ```
    #[must_use]
    pub fn from_host_name(name: &str) -> Option<(Self, bool)> {
        match name.to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" => Some((Self::Arm, true)),
            "arm" | "armv6" | "armv6l" | "armv7" | "armv7l" => Some((Self::Arm, false)),
            "x86_64" | "amd64" | "intel" => Some((Self::Intel, true)),
            "x86" | "i386" | "i686" | "386" => Some((Self::Intel, false)),
            _ => None,
        }
    }
}

impl TryFrom<&str> for CpuArch {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "arm" => Ok(Self::Arm),
            "intel" => Ok(Self::Intel),
            _ => Err(ArtefactError::UnsupportedArch {
                value: value.to_owned(),
                expected: SUPPORTED_ARCH.join(", "),
            }),
        }
    }
}

impl TryFrom<String> for CpuArch {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for CpuArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selection key of one catalog row.
///
/// `bits64 = None` means the row applies to either word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    /// Operating system family.
    pub os: OsFamily,
    /// Architecture family.
    pub arch: CpuArch,
    /// Required word size, if any.
    pub bits64: Option<bool>,
}

impl PlatformKey {
    /// Whether a host satisfies this row.
    #[must_use]
    pub fn matches(&self, host: &Host) -> bool {
        host.os == Some(self.os)
            && host.arch == Some(self.arch)
            && self.bits64.is_none_or(|bits64| bits64 == host.is_64bit)
    }

    /// Whether some host could satisfy both rows.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.os == other.os
            && self.arch == other.arch
            && match (self.bits64, other.bits64) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)?;
        match self.bits64 {
            Some(true) => f.write_str(" (64-bit)"),
            Some(false) => f.write_str(" (32-bit)"),
            None => Ok(()),
        }
    }
}

/// Properties of the machine performing the installation.
///
/// Unknown operating systems or architectures are kept verbatim for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    os: Option<OsFamily>,
    arch: Option<CpuArch>,
    is_64bit: bool,
    os_name: String,
    arch_name: String,
}

impl Host {
    /// Build a descriptor from host-reported names.
    ///
    /// When `is_64bit` is `None` the word size implied by the architecture
    /// name is used; unknown architectures default to 64-bit.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::artefact::platform::{CpuArch, Host, OsFamily};
    ///
    /// let host = Host::from_names("darwin", "arm64", None);
    /// assert_eq!(host.os(), Some(OsFamily::Macos));
    /// assert_eq!(host.arch(), Some(CpuArch::Arm));
    /// assert!(host.is_64bit());
    /// ```
    #[must_use]
    pub fn from_names(os_name: &str, arch_name: &str, is_64bit: Option<bool>) -> Self {
        let parsed_arch = CpuArch::from_host_name(arch_name);
        let implied_64bit = parsed_arch.is_none_or(|(_, bits64)| bits64);
        Self {
            os: OsFamily::from_host_name(os_name),
            arch: parsed_arch.map(|(arch, _)| arch),
            is_64bit: is_64bit.unwrap_or(implied_64bit),
            os_name: os_name.to_owned(),
            arch_name: arch_name.to_owned(),
        }
    }

    /// Build a descriptor from already-known families.
    #[must_use]
    pub fn new(os: OsFamily, arch: CpuArch, is_64bit: bool) -> Self {
        Self {
            os: Some(os),
            arch: Some(arch),
            is_64bit,
            os_name: os.as_str().to_owned(),
            arch_name: arch.as_str().to_owned(),
        }
    }

    /// Detect the running host.
    ///
    /// The architecture reported by the compiler target can be overridden
    /// with the `TF_DEMUX_ARCH` environment variable.
    #[must_use]
    pub fn detect() -> Self {
        let arch_override = std::env::var(ARCH_OVERRIDE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        match arch_override {
            Some(arch) => {
                log::debug!("using architecture '{arch}' from {ARCH_OVERRIDE_ENV}");
                Self::from_names(std::env::consts::OS, arch.trim(), None)
            }
            None => Self::from_names(
                std::env::consts::OS,
                std::env::consts::ARCH,
                Some(cfg!(target_pointer_width = "64")),
            ),
        }
    }

    /// The operating system family, if recognised.
    #[must_use]
    pub const fn os(&self) -> Option<OsFamily> {
        self.os
    }

    /// The architecture family, if recognised.
    #[must_use]
    pub const fn arch(&self) -> Option<CpuArch> {
        self.arch
    }

    /// Whether the host uses a 64-bit word size.
    #[must_use]
    pub const fn is_64bit(&self) -> bool {
        self.is_64bit
    }

    /// The operating system name as reported.
    #[must_use]
    pub fn os_name(&self) -> &str {
        &self.os_name
    }

    /// The architecture name as reported.
    #[must_use]
    pub fn arch_name(&self) -> &str {
        &self.arch_name
    }

    /// Replace any of the reported values, keeping the rest.
    ///
    /// The word size is re-derived from the architecture when only the
    /// architecture changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::artefact::platform::{CpuArch, Host, OsFamily};
    ///
    /// let host = Host::new(OsFamily::Macos, CpuArch::Intel, true)
    ///     .with_overrides(Some("linux"), Some("armv7l"), None);
    /// assert_eq!(host.os(), Some(OsFamily::Linux));
    /// assert!(!host.is_64bit());
    /// ```
    #[must_use]
    pub fn with_overrides(
        self,
        os_name: Option<&str>,
        arch_name: Option<&str>,
        is_64bit: Option<bool>,
    ) -> Self {
        let bits = match (arch_name, is_64bit) {
            (_, Some(bits64)) => Some(bits64),
            (Some(_), None) => None,
            (None, None) => Some(self.is_64bit),
        };
        Self::from_names(
            os_name.unwrap_or(&self.os_name),
            arch_name.unwrap_or(&self.arch_name),
            bits,
        )
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = if self.is_64bit { 64 } else { 32 };
        write!(f, "{}/{} ({bits}-bit)", self.os_name, self.arch_name)
    }
}
