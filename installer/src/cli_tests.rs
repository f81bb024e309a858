//! Tests for installer CLI parsing and default behaviours.

use super::*;
use crate::artefact::platform::{CpuArch, OsFamily};
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["terraform-demux-installer"]);
    assert!(cli.command.is_none());
    assert!(cli.install.version.is_none());
    assert!(cli.install.bin_dir.is_none());
    assert!(cli.install.data_dir.is_none());
    assert!(cli.install.catalog.is_none());
    assert!(!cli.install.dry_run);
    assert_eq!(cli.install.verbosity, 0);
    assert!(!cli.install.quiet);
}

#[test]
fn version_flag_selects_release() {
    let cli = Cli::parse_from(["terraform-demux-installer", "--version", "1.1.2"]);
    assert_eq!(cli.install_args().version.as_deref(), Some("1.1.2"));
}

#[test]
fn cli_parses_install_subcommand_with_args() {
    let cli = Cli::parse_from([
        "terraform-demux-installer",
        "install",
        "--version",
        "2.0.0",
        "--bin-dir",
        "/opt/bin",
        "--data-dir",
        "/opt/share",
        "--dry-run",
    ]);
    assert!(matches!(cli.command, Some(Command::Install(_))));
    let args = cli.install_args();
    assert_eq!(args.version.as_deref(), Some("2.0.0"));
    assert_eq!(args.bin_dir, Some(Utf8PathBuf::from("/opt/bin")));
    assert_eq!(args.data_dir, Some(Utf8PathBuf::from("/opt/share")));
    assert!(args.dry_run);
}

#[rstest]
#[case::bits32("32", WordSize::Bits32)]
#[case::bits64("64", WordSize::Bits64)]
fn cli_parses_word_size(#[case] value: &str, #[case] expected: WordSize) {
    let cli = Cli::parse_from(["terraform-demux-installer", "--bits", value]);
    assert_eq!(cli.install.bits, Some(expected));
}

#[test]
fn cli_rejects_odd_word_size() {
    let result = Cli::try_parse_from(["terraform-demux-installer", "--bits", "16"]);
    assert!(result.is_err());
}

#[test]
fn host_overrides_are_applied() {
    let cli = Cli::parse_from([
        "terraform-demux-installer",
        "--os",
        "darwin",
        "--arch",
        "arm64",
    ]);
    let host = cli.install_args().host();
    assert_eq!(host.os(), Some(OsFamily::Macos));
    assert_eq!(host.arch(), Some(CpuArch::Arm));
    assert!(host.is_64bit());
}

#[test]
fn cli_rejects_quiet_with_verbose() {
    let result = Cli::try_parse_from(["terraform-demux-installer", "-q", "-v"]);
    assert!(result.is_err());
}

#[test]
fn cli_counts_verbosity() {
    let cli = Cli::parse_from(["terraform-demux-installer", "-vvv"]);
    assert_eq!(cli.log_settings(), (3, false));
}

#[test]
fn cli_parses_uninstall_subcommand() {
    let cli = Cli::parse_from(["terraform-demux-installer", "uninstall", "-b", "/opt/bin", "-q"]);
    match &cli.command {
        Some(Command::Uninstall(args)) => {
            assert_eq!(args.bin_dir, Some(Utf8PathBuf::from("/opt/bin")));
            assert!(args.quiet);
        }
        _ => panic!("expected Uninstall command"),
    }
    assert_eq!(cli.log_settings(), (0, true));
}

#[test]
fn cli_parses_releases_with_json() {
    let cli = Cli::parse_from([
        "terraform-demux-installer",
        "releases",
        "--json",
        "--catalog",
        "/tmp/releases.toml",
    ]);
    match cli.command {
        Some(Command::Releases(args)) => {
            assert!(args.json);
            assert_eq!(args.catalog, Some(Utf8PathBuf::from("/tmp/releases.toml")));
        }
        _ => panic!("expected Releases command"),
    }
}

#[test]
fn cli_parses_info_subcommand() {
    let cli = Cli::parse_from(["terraform-demux-installer", "info"]);
    assert!(matches!(cli.command, Some(Command::Info(InfoArgs { json: false }))));
}

#[test]
fn installer_version_flag_short_circuits() {
    let err = Cli::try_parse_from(["terraform-demux-installer", "-V"]).expect_err("prints version");
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}
