//! Archive extraction for release artefacts.
//!
//! Pulls the launcher binary out of a verified `.tar.gz`, `.tar.zst` or
//! `.zip` payload. Every entry path is checked before anything is written,
//! so archives with absolute or `..` paths are rejected outright.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path};

/// Archive container formats found on the release page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball.
    TarGz,
    /// Zstandard-compressed tarball.
    TarZst,
    /// Zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Infer the format from an archive filename or URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::artefact::extraction::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::from_filename("terraform-demux_1.1.2_linux_amd64.tar.gz"),
    ///     Some(ArchiveFormat::TarGz)
    /// );
    /// assert_eq!(ArchiveFormat::from_filename("checksums.txt"), None);
    /// ```
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".tar.zst") {
            Some(Self::TarZst)
        } else if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Trait for extracting one binary from an archive, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactExtractor {
    /// Extract the entry named `binary_name` from `archive` into `dest`.
    ///
    /// The entry may sit at the archive root or in a subdirectory.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry
    /// attempts to escape the destination directory.
    /// Returns [`ExtractionError::BinaryNotFound`] if no entry has the name.
    /// Returns [`ExtractionError::Io`] on I/O or decoding failures.
    fn extract_binary(
        &self,
        archive: &[u8],
        format: ArchiveFormat,
        binary_name: &str,
        dest: &Path,
    ) -> Result<(), ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container is malformed.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive does not contain the expected binary.
    #[error("archive does not contain {binary}")]
    BinaryNotFound {
        /// The binary name that was searched for.
        binary: String,
    },

    /// The archive filename has no recognised extension.
    #[error("unsupported archive format: {filename}")]
    UnsupportedFormat {
        /// The archive filename.
        filename: String,
    },
}

/// Default extractor backed by `tar`, `flate2`, `zstd` and `zip`.
pub struct ReleaseArchiveExtractor;

impl ArtefactExtractor for ReleaseArchiveExtractor {
    fn extract_binary(
        &self,
        archive: &[u8],
        format: ArchiveFormat,
        binary_name: &str,
        dest: &Path,
    ) -> Result<(), ExtractionError> {
        let found = match format {
            ArchiveFormat::TarGz => {
                extract_from_tar(flate2::read::GzDecoder::new(archive), binary_name, dest)?
            }
            ArchiveFormat::TarZst => {
                extract_from_tar(zstd::Decoder::new(archive)?, binary_name, dest)?
            }
            ArchiveFormat::Zip => extract_from_zip(archive, binary_name, dest)?,
        };
        if !found {
            return Err(ExtractionError::BinaryNotFound {
                binary: binary_name.to_owned(),
            });
        }
        log::debug!("extracted {binary_name} to {}", dest.display());
        Ok(())
    }
}

fn extract_from_tar<R: Read>(
    reader: R,
    binary_name: &str,
    dest: &Path,
) -> Result<bool, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut found = false;
    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;

        let is_file = entry.header().entry_type().is_file();
        if !found && is_file && is_named(&entry_path, binary_name) {
            write_entry(&mut entry, dest)?;
            found = true;
        }
    }
    Ok(found)
}

fn extract_from_zip(
    archive: &[u8],
    binary_name: &str,
    dest: &Path,
) -> Result<bool, ExtractionError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut found = false;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(entry_path) = entry.enclosed_name() else {
            return Err(ExtractionError::PathTraversal {
                path: entry.name().to_owned(),
            });
        };
        validate_entry_path(&entry_path)?;

        if !found && entry.is_file() && is_named(&entry_path, binary_name) {
            write_entry(&mut entry, dest)?;
            found = true;
        }
    }
    Ok(found)
}

fn is_named(path: &Path, binary_name: &str) -> bool {
    path.file_name().is_some_and(|name| name == binary_name)
}

fn write_entry(entry: &mut dyn Read, dest: &Path) -> Result<(), ExtractionError> {
    let mut file = File::create(dest)?;
    io::copy(entry, &mut file)?;
    file.sync_all()?;
    Ok(())
}

/// Validate that an archive entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    if path.is_absolute() {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir | Component::RootDir) {
            return Err(ExtractionError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
