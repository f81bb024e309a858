//! Unit tests for install pipeline orchestration.
//!
//! The downloader is mocked; extraction and filesystem work are real and
//! confined to a temporary bin directory.

use super::*;
use crate::artefact::download::{DownloadError, MockArtefactDownloader};
use crate::artefact::extraction::ReleaseArchiveExtractor;
use crate::artefact::platform::{CpuArch, OsFamily};
use crate::conflict::TERRAFORM_DEMUX;
use crate::error::InstallerError;
use crate::receipt::ReceiptStore;
use crate::test_utils::{LAUNCHER, catalog_toml, release_archive};
use camino::Utf8PathBuf;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

struct Harness {
    _temp: tempfile::TempDir,
    bin_dir: Utf8PathBuf,
    data_dir: Utf8PathBuf,
    archive: Vec<u8>,
    catalog: ArtifactCatalog,
}

impl Harness {
    fn installer(&self) -> Installer<'static> {
        Installer::new(
            self.bin_dir.clone(),
            ReceiptStore::new(self.data_dir.clone()),
            TERRAFORM_DEMUX,
            &ReleaseArchiveExtractor,
        )
    }

    fn request<'a>(&'a self, host: &'a Host, quiet: bool) -> InstallRequest<'a> {
        InstallRequest {
            catalog: &self.catalog,
            version: Some("1.1.2"),
            host,
            dry_run: false,
            quiet,
        }
    }
}

#[fixture]
fn harness() -> Harness {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let archive = release_archive(b"launcher");
    let catalog = ArtifactCatalog::from_toml_str(&catalog_toml("1.1.2", &archive))
        .expect("generated catalog is valid");
    Harness {
        _temp: temp,
        bin_dir: root.join("bin"),
        data_dir: root.join("data"),
        archive,
        catalog,
    }
}

fn linux_intel() -> Host {
    Host::new(OsFamily::Linux, CpuArch::Intel, true)
}

const LINUX_URL: &str = "https://example.test/v1.1.2/terraform-demux_1.1.2_linux_amd64.tar.gz";

#[rstest]
fn installs_verified_artefact(harness: Harness) {
    let host = linux_intel();
    let archive = harness.archive.clone();
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_fetch()
        .with(eq(LINUX_URL))
        .times(1)
        .returning(move |_| Ok(archive.clone()));
    let mut stderr = Vec::new();

    let outcome = run_install(
        &harness.request(&host, false),
        &downloader,
        &harness.installer(),
        &mut stderr,
    )
    .expect("install succeeds");

    let InstallOutcome::Installed(installed) = outcome else {
        panic!("expected an install");
    };
    assert_eq!(installed.version, "1.1.2");
    assert!(harness.bin_dir.join(LAUNCHER).exists());
    let output = String::from_utf8_lossy(&stderr);
    assert!(output.contains("Downloading"));
    assert!(output.contains("Installed terraform-demux 1.1.2"));
}

#[rstest]
fn quiet_run_writes_nothing(harness: Harness) {
    let host = linux_intel();
    let archive = harness.archive.clone();
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_fetch()
        .returning(move |_| Ok(archive.clone()));
    let mut stderr = Vec::new();

    run_install(
        &harness.request(&host, true),
        &downloader,
        &harness.installer(),
        &mut stderr,
    )
    .expect("install succeeds");

    assert!(stderr.is_empty());
}

#[rstest]
fn tampered_payload_is_never_installed(harness: Harness) {
    let host = linux_intel();
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_fetch()
        .times(1)
        .returning(|_| Ok(release_archive(b"evil")));

    let err = run_install(
        &harness.request(&host, true),
        &downloader,
        &harness.installer(),
        &mut Vec::new(),
    )
    .expect_err("mismatch");

    assert!(matches!(err, InstallerError::ChecksumMismatch(_)));
    assert!(!err.is_retryable());
    assert!(!harness.bin_dir.join(LAUNCHER).exists());
    assert!(!harness.bin_dir.join("terraform").exists());
}

#[rstest]
fn download_failure_is_retryable(harness: Harness) {
    let host = linux_intel();
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().returning(|url| {
        Err(DownloadError::HttpError {
            url: url.to_owned(),
            reason: "connection reset".to_owned(),
        })
    });

    let err = run_install(
        &harness.request(&host, true),
        &downloader,
        &harness.installer(),
        &mut Vec::new(),
    )
    .expect_err("download fails");

    assert!(err.is_retryable());
}

#[rstest]
#[case::linux_arm_32(Host::new(OsFamily::Linux, CpuArch::Arm, false))]
#[case::windows(Host::from_names("windows", "x86_64", None))]
fn unsupported_host_fails_before_download(harness: Harness, #[case] host: Host) {
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().never();

    let err = run_install(
        &harness.request(&host, true),
        &downloader,
        &harness.installer(),
        &mut Vec::new(),
    )
    .expect_err("unsupported");

    assert!(matches!(err, InstallerError::UnsupportedPlatform(_)));
}

#[rstest]
fn unknown_version_fails_before_download(harness: Harness) {
    let host = linux_intel();
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().never();
    let request = InstallRequest {
        version: Some("9.9.9"),
        ..harness.request(&host, true)
    };

    let err = run_install(&request, &downloader, &harness.installer(), &mut Vec::new())
        .expect_err("unknown");

    assert!(matches!(err, InstallerError::UnknownVersion(_)));
}

#[rstest]
fn collision_fails_before_download(harness: Harness) {
    std::fs::create_dir_all(&harness.bin_dir).expect("bin dir");
    std::fs::write(harness.bin_dir.join("terraform"), b"hashicorp").expect("seed");
    let host = linux_intel();
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().never();

    let err = run_install(
        &harness.request(&host, true),
        &downloader,
        &harness.installer(),
        &mut Vec::new(),
    )
    .expect_err("collision");

    assert!(matches!(err, InstallerError::InstallCollision { .. }));
}

#[rstest]
fn dry_run_resolves_without_side_effects(harness: Harness) {
    let host = Host::new(OsFamily::Macos, CpuArch::Arm, true);
    let mut downloader = MockArtefactDownloader::new();
    downloader.expect_fetch().never();
    let request = InstallRequest {
        dry_run: true,
        ..harness.request(&host, false)
    };
    let mut stderr = Vec::new();

    let outcome = run_install(&request, &downloader, &harness.installer(), &mut stderr)
        .expect("dry run");

    let InstallOutcome::Planned(resolved) = outcome else {
        panic!("expected a plan");
    };
    assert!(resolved.artifact.url().ends_with("_darwin_arm64.tar.gz"));
    assert!(String::from_utf8_lossy(&stderr).contains("Would install"));
    assert!(!harness.bin_dir.exists());
}

#[rstest]
#[case::linux_intel(linux_intel())]
#[case::macos_arm(Host::new(OsFamily::Macos, CpuArch::Arm, true))]
fn missing_version_resolves_to_latest_verified_release(#[case] host: Host) {
    let catalog = ArtifactCatalog::builtin().expect("valid");
    let resolved = resolve_artifact(&catalog, None, &host).expect("latest supports host");
    assert_eq!(resolved.version, "1.1.2");
    assert!(resolved.verified);
    assert!(!resolved.artifact.sha256().is_placeholder());
}

#[test]
fn unverified_release_resolves_only_by_name() {
    let catalog = ArtifactCatalog::builtin().expect("valid");
    let resolved =
        resolve_artifact(&catalog, Some("2.0.0"), &linux_intel()).expect("published row");
    assert_eq!(resolved.version, "2.0.0");
    assert!(!resolved.verified);
    assert!(resolved.artifact.url().ends_with("_linux_amd64.tar.gz"));
}

/// Feeding the macOS Intel 2.0.0 slot the bytes published for Linux Intel
/// must stop at verification.
#[rstest]
fn builtin_2_0_0_rejects_bytes_of_another_platform(harness: Harness) {
    let catalog = ArtifactCatalog::builtin().expect("valid");
    let host = Host::new(OsFamily::Macos, CpuArch::Intel, true);
    let linux_bytes = release_archive(b"terraform-demux 2.0.0 linux amd64");
    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_fetch()
        .withf(|url: &str| url.ends_with("terraform-demux_2.0.0_darwin_amd64.tar.gz"))
        .times(1)
        .returning(move |_| Ok(linux_bytes.clone()));
    let request = InstallRequest {
        catalog: &catalog,
        version: Some("2.0.0"),
        host: &host,
        dry_run: false,
        quiet: false,
    };
    let mut stderr = Vec::new();

    let err = run_install(&request, &downloader, &harness.installer(), &mut stderr)
        .expect_err("mismatch");

    let InstallerError::ChecksumMismatch(mismatch) = &err else {
        panic!("expected a checksum mismatch, got {err}");
    };
    assert!(mismatch.expected.is_placeholder());
    assert!(!err.is_retryable());
    assert!(String::from_utf8_lossy(&stderr).contains("no published checksums"));
    assert!(!harness.bin_dir.join(LAUNCHER).exists());
    assert!(std::fs::symlink_metadata(harness.bin_dir.join("terraform")).is_err());
    assert_eq!(harness.installer().installed().expect("readable"), None);
}

#[test]
fn empty_catalog_has_no_latest() {
    let catalog = ArtifactCatalog::new(Vec::new()).expect("empty is valid");
    let err = resolve_artifact(&catalog, None, &linux_intel()).expect_err("nothing published");
    assert!(matches!(err, InstallerError::UnknownVersion(_)));
}
