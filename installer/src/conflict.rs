//! Package metadata and the conflict declaration.
//!
//! `terraform-demux` installs its launcher under a second name, `terraform`,
//! which is also the command installed by the `terraform` package. That name
//! is a single slot: only one of the two packages may own it at a time. This
//! module declares the relation; enforcing it is the host package manager's
//! job.

use serde::Serialize;

/// Static description of an installable package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    /// Package name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Project homepage.
    pub homepage: &'static str,
    /// SPDX licence identifier.
    pub license: &'static str,
    /// Name of the binary inside the release archive and on disk.
    pub primary_binary: &'static str,
    /// Second name under which the binary is installed.
    pub alias: &'static str,
    /// The package that also claims [`Self::alias`].
    pub conflicts_with: &'static str,
}

/// Two packages that may never be installed side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConflictDeclaration {
    /// The declaring package.
    pub package: &'static str,
    /// The package it excludes.
    pub conflicts_with: &'static str,
    /// The binary name both packages claim.
    pub slot: &'static str,
}

/// The `terraform-demux` package.
pub const TERRAFORM_DEMUX: PackageMetadata = PackageMetadata {
    name: "terraform-demux",
    description: "A user-friendly launcher (à la Bazelisk) for Terraform.",
    homepage: "https://github.com/etsy/terraform-demux",
    license: "Apache-2.0",
    primary_binary: "terraform-demux",
    alias: "terraform",
    conflicts_with: "terraform",
};

impl PackageMetadata {
    /// The mutual-exclusion relation this package declares.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::conflict::TERRAFORM_DEMUX;
    ///
    /// let conflict = TERRAFORM_DEMUX.conflict();
    /// assert_eq!(conflict.conflicts_with, "terraform");
    /// assert_eq!(conflict.slot, "terraform");
    /// ```
    #[must_use]
    pub const fn conflict(&self) -> ConflictDeclaration {
        ConflictDeclaration {
            package: self.name,
            conflicts_with: self.conflicts_with,
            slot: self.alias,
        }
    }

    /// Whether `binary_name` is the contested slot.
    #[must_use]
    pub fn claims_slot(&self, binary_name: &str) -> bool {
        binary_name == self.alias
    }
}

impl ConflictDeclaration {
    /// Whether the relation excludes `package`, in either direction.
    #[must_use]
    pub fn excludes(&self, package: &str) -> bool {
        package == self.conflicts_with || package == self.package
    }
}
