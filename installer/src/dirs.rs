//! Directory resolution for install locations.
//!
//! The binary and alias go into a per-user executable directory
//! (`~/.local/bin` on most systems); the receipt goes into the local data
//! directory. Both can be overridden on the command line.

use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;

/// Platform directory lookup, abstracted for tests.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Directory for user executables.
    fn bin_dir(&self) -> Option<PathBuf>;

    /// Directory for per-user application data.
    fn data_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by `directories-next`.
pub struct SystemBaseDirs {
    dirs: directories_next::BaseDirs,
}

impl SystemBaseDirs {
    /// Resolve the current user's directories.
    ///
    /// Returns `None` when no home directory can be found.
    #[must_use]
    pub fn new() -> Option<Self> {
        directories_next::BaseDirs::new().map(|dirs| Self { dirs })
    }
}

impl BaseDirs for SystemBaseDirs {
    fn bin_dir(&self) -> Option<PathBuf> {
        // `executable_dir` is only defined on Linux.
        self.dirs
            .executable_dir()
            .map(std::path::Path::to_path_buf)
            .or_else(|| Some(self.dirs.home_dir().join(".local").join("bin")))
    }

    fn data_dir(&self) -> Option<PathBuf> {
        Some(self.dirs.data_local_dir().to_path_buf())
    }
}

/// Resolved locations for one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDirs {
    /// Where the binary and alias are placed.
    pub bin_dir: Utf8PathBuf,
    /// Where the receipt is kept.
    pub data_dir: Utf8PathBuf,
}

impl InstallDirs {
    /// Combine explicit overrides with platform defaults.
    ///
    /// `package` names the subdirectory of the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::DirectoryUnavailable`] if a directory is
    /// neither given nor discoverable, or [`InstallerError::NonUtf8Path`] if
    /// the discovered path is not UTF-8.
    pub fn resolve(
        bin_override: Option<&Utf8Path>,
        data_override: Option<&Utf8Path>,
        dirs: Option<&dyn BaseDirs>,
        package: &str,
    ) -> Result<Self> {
        let bin_dir = match bin_override {
            Some(dir) => dir.to_owned(),
            None => utf8(dirs.and_then(|d| d.bin_dir()), "bin")?,
        };
        let data_dir = match data_override {
            Some(dir) => dir.to_owned(),
            None => utf8(dirs.and_then(|d| d.data_dir()), "data")?.join(package),
        };
        Ok(Self { bin_dir, data_dir })
    }
}

fn utf8(path: Option<PathBuf>, what: &'static str) -> Result<Utf8PathBuf> {
    let path = path.ok_or(InstallerError::DirectoryUnavailable { what })?;
    Utf8PathBuf::try_from(path).map_err(|e| InstallerError::NonUtf8Path {
        path: e.into_path_buf().display().to_string(),
    })
}
