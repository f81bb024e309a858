//! Shared test utilities for the installer crate.
//!
//! Builds small in-memory release archives and catalogs so tests can drive
//! the full pipeline without network access.

#![expect(clippy::expect_used, reason = "fixture builders abort the test on failure")]

use crate::artefact::sha256_digest::Sha256Digest;
use std::io::{Cursor, Write};

/// Name of the launcher binary inside release archives.
pub const LAUNCHER: &str = "terraform-demux";

/// Return the lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of(bytes).into_inner()
}

fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path, *contents)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar")
}

/// Build a `.tar.gz` archive holding `files` as `(path, contents)` pairs.
pub fn tar_gz_with_files(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&tar_bytes(files)).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Build a `.tar.zst` archive holding `files` as `(path, contents)` pairs.
pub fn tar_zst_with_files(files: &[(&str, &[u8])]) -> Vec<u8> {
    zstd::encode_all(tar_bytes(files).as_slice(), 0).expect("zstd encode")
}

/// Build a `.zip` archive holding `files` as `(path, contents)` pairs.
pub fn zip_with_files(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
    for (path, contents) in files {
        writer.start_file(*path, options).expect("zip entry");
        writer.write_all(contents).expect("zip write");
    }
    writer.finish().expect("zip finish").into_inner()
}

/// Build a `.tar.gz` release archive whose launcher prints `contents`.
pub fn release_archive(contents: &[u8]) -> Vec<u8> {
    tar_gz_with_files(&[("LICENSE", b"Apache-2.0"), (LAUNCHER, contents)])
}

/// Render a catalog with one release whose rows all pin `archive`.
///
/// The rows cover the four supported platforms; URLs end with the usual
/// `_<os>_<arch>.tar.gz` suffix.
pub fn catalog_toml(version: &str, archive: &[u8]) -> String {
    let sha = sha256_hex(archive);
    let rows = [
        ("macos", "arm", None, "darwin_arm64"),
        ("macos", "intel", None, "darwin_amd64"),
        ("linux", "arm", Some(true), "linux_arm64"),
        ("linux", "intel", None, "linux_amd64"),
    ];
    let mut text = format!("[[release]]\nversion = \"{version}\"\n");
    for (os, arch, bits64, suffix) in rows {
        text.push_str("\n[[release.platform]]\n");
        text.push_str(&format!("os = \"{os}\"\narch = \"{arch}\"\n"));
        if let Some(bits64) = bits64 {
            text.push_str(&format!("bits64 = {bits64}\n"));
        }
        text.push_str(&format!(
            "url = \"https://example.test/v{version}/terraform-demux_{version}_{suffix}.tar.gz\"\n"
        ));
        text.push_str(&format!("sha256 = \"{sha}\"\n"));
    }
    text
}
