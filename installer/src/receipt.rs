//! Install receipts.
//!
//! A receipt records what the last successful install placed on disk. It is
//! staged before the bin directory is touched, committed once the binary and
//! alias are in place, replaced wholesale on upgrade, and deleted on
//! uninstall.

use crate::artefact::sha256_digest::Sha256Digest;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Receipt filename inside the package data directory.
const RECEIPT_FILE: &str = "receipt.json";

/// The on-disk state produced by an install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name.
    pub package: String,
    /// Installed release version.
    pub version: String,
    /// Digest of the archive the binary came from.
    pub sha256: Sha256Digest,
    /// Location of the installed binary.
    pub primary_binary_path: Utf8PathBuf,
    /// Second name the binary answers to.
    pub alias_name: String,
    /// Location of the alias entry; resolves to `primary_binary_path`.
    pub alias_target_path: Utf8PathBuf,
    /// Package sharing the alias slot.
    pub conflicts_with: String,
}

/// Reads and writes the receipt for one package.
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    dir: Utf8PathBuf,
}

impl ReceiptStore {
    /// Create a store rooted at the package data directory.
    #[must_use]
    pub fn new(dir: Utf8PathBuf) -> Self {
        Self { dir }
    }

    /// Return the receipt file path.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.dir.join(RECEIPT_FILE)
    }

    /// Read the receipt, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Receipt`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(&self) -> Result<Option<InstalledPackage>> {
        let path = self.path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(receipt_error(&path, &e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| receipt_error(&path, &e))
    }

    /// Replace the receipt atomically.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Receipt`] if the directory or file cannot be
    /// written.
    pub fn save(&self, installed: &InstalledPackage) -> Result<()> {
        self.stage(installed)?.commit()
    }

    /// Write the receipt to a temporary file beside its final path.
    ///
    /// Nothing is replaced until [`StagedReceipt::commit`]; dropping the
    /// staged receipt discards it.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Receipt`] if the directory or file cannot be
    /// written.
    pub fn stage(&self, installed: &InstalledPackage) -> Result<StagedReceipt> {
        let path = self.path();
        std::fs::create_dir_all(&self.dir).map_err(|e| receipt_error(&path, &e))?;
        let json = serde_json::to_string_pretty(installed).map_err(|e| receipt_error(&path, &e))?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| receipt_error(&path, &e))?;
        writeln!(temp, "{json}").map_err(|e| receipt_error(&path, &e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| receipt_error(&path, &e))?;
        Ok(StagedReceipt { temp, path })
    }

    /// Delete the receipt; a missing receipt is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Receipt`] if the file cannot be removed.
    pub fn remove(&self) -> Result<()> {
        let path = self.path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(receipt_error(&path, &e)),
        }
    }

    /// The directory the receipt lives in.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

/// A fully written receipt waiting to replace the current one.
#[derive(Debug)]
pub struct StagedReceipt {
    temp: tempfile::NamedTempFile,
    path: Utf8PathBuf,
}

impl StagedReceipt {
    /// Move the staged receipt over the receipt path.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Receipt`] if the rename fails.
    pub fn commit(self) -> Result<()> {
        let Self { temp, path } = self;
        temp.persist(&path)
            .map_err(|e| receipt_error(&path, &e.error))?;
        Ok(())
    }
}

fn receipt_error(path: &Utf8Path, err: &dyn std::fmt::Display) -> InstallerError {
    InstallerError::Receipt {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(version: &str) -> InstalledPackage {
        InstalledPackage {
            package: "terraform-demux".to_owned(),
            version: version.to_owned(),
            sha256: Sha256Digest::of(version.as_bytes()),
            primary_binary_path: Utf8PathBuf::from("/opt/bin/terraform-demux"),
            alias_name: "terraform".to_owned(),
            alias_target_path: Utf8PathBuf::from("/opt/bin/terraform"),
            conflicts_with: "terraform".to_owned(),
        }
    }

    fn store() -> (tempfile::TempDir, ReceiptStore) {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().join("terraform-demux")).expect("UTF-8");
        (temp, ReceiptStore::new(dir))
    }

    #[test]
    fn missing_receipt_loads_as_none() {
        let (_temp, store) = store();
        assert_eq!(store.load().expect("readable"), None);
    }

    #[test]
    fn save_replaces_previous_receipt() {
        let (_temp, store) = store();
        store.save(&sample("1.1.2")).expect("save");
        store.save(&sample("2.0.0")).expect("save");
        let loaded = store.load().expect("readable").expect("present");
        assert_eq!(loaded, sample("2.0.0"));
    }

    #[test]
    fn corrupt_receipt_is_an_error() {
        let (_temp, store) = store();
        std::fs::create_dir_all(store.dir()).expect("mkdir");
        std::fs::write(store.path(), "{").expect("write");
        let err = store.load().expect_err("corrupt");
        assert!(matches!(err, InstallerError::Receipt { .. }));
    }

    #[test]
    fn staged_receipt_is_invisible_until_committed() {
        let (_temp, store) = store();
        store.save(&sample("1.1.2")).expect("save");

        let staged = store.stage(&sample("2.0.0")).expect("stage");
        assert_eq!(store.load().expect("readable"), Some(sample("1.1.2")));
        staged.commit().expect("commit");

        assert_eq!(store.load().expect("readable"), Some(sample("2.0.0")));
    }

    #[test]
    fn dropped_staged_receipt_leaves_no_trace() {
        let (_temp, store) = store();
        drop(store.stage(&sample("1.1.2")).expect("stage"));

        assert_eq!(store.load().expect("readable"), None);
        let entries = std::fs::read_dir(store.dir()).expect("list").count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn stage_fails_when_directory_cannot_be_created() {
        let (temp, _) = store();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file").expect("write");
        let dir = Utf8PathBuf::try_from(blocker.join("terraform-demux")).expect("UTF-8");

        let err = ReceiptStore::new(dir)
            .stage(&sample("1.1.2"))
            .expect_err("parent is a file");

        assert!(matches!(err, InstallerError::Receipt { .. }));
    }

    #[test]
    fn remove_is_idempotent() {
        let (_temp, store) = store();
        store.save(&sample("1.1.2")).expect("save");
        store.remove().expect("remove");
        store.remove().expect("second remove");
        assert!(!store.path().exists());
    }
}
