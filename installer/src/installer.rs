//! Placing the launcher and its alias on disk.
//!
//! An install extracts the launcher from a verified archive into a staging
//! directory inside the bin directory, then renames it over
//! `<bin>/terraform-demux` so the swap is atomic. The alias
//! `<bin>/terraform` is a relative symlink pointing at the launcher and is
//! replaced the same way. Before anything is touched the alias slot is
//! checked: if `terraform` exists and is not ours, the install stops with
//! [`InstallerError::InstallCollision`] and leaves the directory as it was.
//!
//! The receipt is staged before the bin directory changes and committed
//! last. If linking the alias or committing the receipt fails, the previous
//! launcher is moved back (or the new one removed on a fresh install) and a
//! vacant alias slot is cleared again.

use crate::artefact::catalog::Artifact;
use crate::artefact::extraction::{ArchiveFormat, ArtefactExtractor, ExtractionError};
use crate::artefact::verification::VerifiedArtefact;
use crate::conflict::PackageMetadata;
use crate::error::{InstallerError, Result};
use crate::receipt::{InstalledPackage, ReceiptStore};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix for staging entries created inside the bin directory.
const STAGING_PREFIX: &str = ".terraform-demux-";

/// Who currently holds the alias name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSlot {
    /// Nothing exists at the alias path.
    Vacant,
    /// The alias already resolves to our launcher.
    Ours,
    /// Something else occupies the alias path.
    Foreign,
}

/// Installs, upgrades and removes one package in a bin directory.
pub struct Installer<'a> {
    bin_dir: Utf8PathBuf,
    receipts: ReceiptStore,
    metadata: PackageMetadata,
    extractor: &'a dyn ArtefactExtractor,
}

impl<'a> Installer<'a> {
    /// Create an installer for `metadata` targeting `bin_dir`.
    #[must_use]
    pub fn new(
        bin_dir: Utf8PathBuf,
        receipts: ReceiptStore,
        metadata: PackageMetadata,
        extractor: &'a dyn ArtefactExtractor,
    ) -> Self {
        Self {
            bin_dir,
            receipts,
            metadata,
            extractor,
        }
    }

    /// Path of the installed launcher.
    #[must_use]
    pub fn primary_path(&self) -> Utf8PathBuf {
        self.bin_dir.join(self.metadata.primary_binary)
    }

    /// Path of the alias entry.
    #[must_use]
    pub fn alias_path(&self) -> Utf8PathBuf {
        self.bin_dir.join(self.metadata.alias)
    }

    /// The bin directory.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// Classify whatever currently sits at the alias path.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Io`] if the alias path cannot be inspected.
    pub fn alias_slot(&self) -> Result<AliasSlot> {
        let alias = self.alias_path();
        let meta = match fs::symlink_metadata(&alias) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AliasSlot::Vacant),
            Err(e) => return Err(e.into()),
        };

        let primary = self.primary_path();
        if meta.file_type().is_symlink() {
            let target = fs::read_link(&alias)?;
            let resolved = if target.is_absolute() {
                target
            } else {
                self.bin_dir.as_std_path().join(target)
            };
            if resolved == primary.as_std_path() {
                return Ok(AliasSlot::Ours);
            }
        }

        if same_file(alias.as_std_path(), primary.as_std_path())? {
            Ok(AliasSlot::Ours)
        } else {
            Ok(AliasSlot::Foreign)
        }
    }

    /// Fail with [`InstallerError::InstallCollision`] if the alias belongs
    /// to another package.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InstallCollision`] for a foreign alias, or
    /// [`InstallerError::Io`] if the alias cannot be inspected.
    pub fn check_collision(&self) -> Result<()> {
        self.claim_alias_slot().map(|_| ())
    }

    /// Install `artefact` as `version`, replacing any previous install.
    ///
    /// Re-installing the same version is a no-op in effect: the launcher
    /// and alias are rewritten with identical content. A failure leaves the
    /// bin directory and receipt as they were before the call.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InstallCollision`] if the alias slot is
    /// taken, [`InstallerError::Extraction`] if the archive does not yield
    /// the launcher, [`InstallerError::Io`] on filesystem failures, or
    /// [`InstallerError::Receipt`] if the receipt cannot be written.
    pub fn install(
        &self,
        artefact: &VerifiedArtefact,
        artifact: &Artifact,
        version: &str,
    ) -> Result<InstalledPackage> {
        let slot = self.claim_alias_slot()?;

        let filename = artifact.archive_filename();
        let format = ArchiveFormat::from_filename(filename).ok_or_else(|| {
            ExtractionError::UnsupportedFormat {
                filename: filename.to_owned(),
            }
        })?;

        let primary = self.primary_path();
        let installed = InstalledPackage {
            package: self.metadata.name.to_owned(),
            version: version.to_owned(),
            sha256: artefact.sha256().clone(),
            primary_binary_path: primary.clone(),
            alias_name: self.metadata.alias.to_owned(),
            alias_target_path: self.alias_path(),
            conflicts_with: self.metadata.conflicts_with.to_owned(),
        };
        // An unwritable data directory must fail before the bin directory
        // changes.
        let receipt = self.receipts.stage(&installed)?;

        fs::create_dir_all(&self.bin_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.bin_dir)?;
        let staged = staging.path().join(self.metadata.primary_binary);
        self.extractor.extract_binary(
            artefact.bytes(),
            format,
            self.metadata.primary_binary,
            &staged,
        )?;
        make_executable(&staged)?;

        let previous = self.preserve_primary(staging.path())?;
        fs::rename(&staged, &primary)?;
        log::debug!("placed {primary}");

        if let Err(err) = self.link_alias().and_then(|()| receipt.commit()) {
            log::warn!("install of {version} failed; rolling back: {err}");
            self.roll_back(previous.as_deref(), slot);
            return Err(err);
        }

        log::info!(
            "installed {} {version} into {}",
            self.metadata.name,
            self.bin_dir
        );
        Ok(installed)
    }

    /// Remove the launcher, the alias and the receipt.
    ///
    /// Only entries we own are removed; a foreign `terraform` is left alone.
    /// Returns the receipt that was removed, if there was one.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Io`] or [`InstallerError::Receipt`] on
    /// filesystem failures.
    pub fn uninstall(&self) -> Result<Option<InstalledPackage>> {
        let previous = self.receipts.load()?;

        if self.alias_slot()? == AliasSlot::Ours {
            remove_if_present(self.alias_path().as_std_path())?;
        } else {
            log::debug!("leaving {} in place; not ours", self.alias_path());
        }
        remove_if_present(self.primary_path().as_std_path())?;
        self.receipts.remove()?;

        if let Some(installed) = &previous {
            log::info!("removed {} {}", installed.package, installed.version);
        }
        Ok(previous)
    }

    /// The receipt of the current install, if any.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Receipt`] if the receipt is unreadable.
    pub fn installed(&self) -> Result<Option<InstalledPackage>> {
        self.receipts.load()
    }

    fn claim_alias_slot(&self) -> Result<AliasSlot> {
        let slot = self.alias_slot()?;
        if slot == AliasSlot::Foreign {
            return Err(InstallerError::InstallCollision {
                path: self.alias_path(),
                owner: self.metadata.conflicts_with,
                package: self.metadata.name,
            });
        }
        Ok(slot)
    }

    /// Keep a copy of the current launcher inside `staging` so a failed
    /// upgrade can put it back. Returns `None` on a fresh install.
    fn preserve_primary(&self, staging: &Path) -> Result<Option<PathBuf>> {
        let primary = self.primary_path();
        if !entry_exists(primary.as_std_path())? {
            return Ok(None);
        }
        let backup = staging.join(format!("{}.previous", self.metadata.primary_binary));
        if fs::hard_link(&primary, &backup).is_err() {
            fs::copy(&primary, &backup)?;
        }
        Ok(Some(backup))
    }

    /// Return the launcher and alias to their state before `install`.
    fn roll_back(&self, previous: Option<&Path>, slot: AliasSlot) {
        let primary = self.primary_path();
        let restored = match previous {
            Some(previous) => fs::rename(previous, &primary),
            None => remove_if_present(primary.as_std_path()),
        };
        if let Err(e) = restored {
            log::warn!("could not restore {primary}: {e}");
        }

        let alias = match slot {
            AliasSlot::Vacant => {
                remove_if_present(self.alias_path().as_std_path()).map_err(InstallerError::from)
            }
            // Hard-link aliases must follow the restored launcher.
            AliasSlot::Ours if previous.is_some() => self.link_alias(),
            AliasSlot::Ours | AliasSlot::Foreign => Ok(()),
        };
        if let Err(e) = alias {
            log::warn!("could not restore {}: {e}", self.alias_path());
        }
    }

    /// Point the alias at the launcher, replacing an existing alias of ours.
    fn link_alias(&self) -> Result<()> {
        let alias = self.alias_path();
        let temp_alias = self
            .bin_dir
            .join(format!("{STAGING_PREFIX}{}.tmp", self.metadata.alias));
        remove_if_present(temp_alias.as_std_path())?;
        create_alias(self.metadata.primary_binary, &self.primary_path(), &temp_alias)?;
        if let Err(err) = fs::rename(&temp_alias, &alias) {
            if let Err(e) = fs::remove_file(&temp_alias) {
                log::debug!("could not remove {temp_alias}: {e}");
            }
            return Err(err.into());
        }
        log::debug!("linked {alias} -> {}", self.metadata.primary_binary);
        Ok(())
    }
}

#[cfg(unix)]
fn create_alias(target_name: &str, _primary: &Utf8Path, link: &Utf8Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target_name, link)
}

#[cfg(not(unix))]
fn create_alias(_target_name: &str, primary: &Utf8Path, link: &Utf8Path) -> io::Result<()> {
    fs::hard_link(primary, link)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let (Ok(a), Ok(b)) = (fs::metadata(a), fs::metadata(b)) else {
        return Ok(false);
    };
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    let (Ok(a), Ok(b)) = (fs::read(a), fs::read(b)) else {
        return Ok(false);
    };
    Ok(a == b)
}

fn entry_exists(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod tests;
