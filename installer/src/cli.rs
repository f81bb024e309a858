//! CLI argument definitions for the terraform-demux installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::platform::Host;
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Install the terraform-demux launcher.
#[derive(Parser, Debug)]
#[command(name = "terraform-demux-installer")]
#[command(version, about, disable_version_flag = true)]
#[command(long_about = concat!(
    "Install the terraform-demux launcher.\n\n",
    "terraform-demux is a user-friendly launcher (à la Bazelisk) for Terraform. ",
    "This installer downloads the prebuilt archive for your platform, verifies ",
    "it against a pinned SHA-256 digest, and installs the launcher together ",
    "with a `terraform` alias.\n\n",
    "The alias means terraform-demux cannot be installed alongside the ",
    "`terraform` package; an existing foreign `terraform` binary stops the ",
    "install without touching anything.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the latest release into the default bin directory:\n",
    "    $ terraform-demux-installer\n\n",
    "  Install a specific release into a custom directory:\n",
    "    $ terraform-demux-installer install --version 1.1.2 --bin-dir ~/bin\n\n",
    "  Show what would be installed for a 64-bit Linux ARM host:\n",
    "    $ terraform-demux-installer install --os linux --arch aarch64 --dry-run\n\n",
    "  List published releases:\n",
    "    $ terraform-demux-installer releases\n\n",
    "ENVIRONMENT:\n",
    "  TF_DEMUX_ARCH   Override the detected host architecture\n",
    "  TF_DEMUX_LOG    Enable debug logging when set\n\n",
    "For more information, see: https://github.com/etsy/terraform-demux",
))]
pub struct Cli {
    /// Print the installer version.
    #[arg(short = 'V', long = "installer-version", action = ArgAction::Version)]
    pub installer_version: Option<bool>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install or upgrade terraform-demux (default when no subcommand given).
    Install(InstallArgs),

    /// Remove terraform-demux and its alias.
    Uninstall(UninstallArgs),

    /// List published releases and their platforms.
    Releases(ReleasesArgs),

    /// Show package metadata and the conflict declaration.
    Info(InfoArgs),
}

/// Word size of the target host.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSize {
    /// 32-bit.
    #[value(name = "32")]
    Bits32,
    /// 64-bit.
    #[value(name = "64")]
    Bits64,
}

impl WordSize {
    /// Whether this is the 64-bit word size.
    #[must_use]
    pub const fn is_64bit(self) -> bool {
        matches!(self, Self::Bits64)
    }
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Release to install [default: latest].
    #[arg(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Directory for the binary and alias [default: platform-specific].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Directory for the install receipt [default: platform-specific].
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Release catalog to use instead of the built-in one.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<Utf8PathBuf>,

    /// Override the detected operating system (e.g. darwin, linux).
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// Override the detected architecture (e.g. arm64, x86_64).
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Override the detected word size.
    #[arg(long, value_enum, value_name = "BITS")]
    pub bits: Option<WordSize>,

    /// Resolve the artefact and exit without downloading or installing.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the uninstall command.
#[derive(Parser, Debug, Clone, Default)]
pub struct UninstallArgs {
    /// Directory holding the binary and alias [default: platform-specific].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Directory holding the install receipt [default: platform-specific].
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the releases command.
#[derive(Parser, Debug, Clone, Default)]
pub struct ReleasesArgs {
    /// Release catalog to use instead of the built-in one.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<Utf8PathBuf>,

    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the info command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InfoArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

impl InstallArgs {
    /// The host to install for: the detected one with any overrides applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::artefact::platform::{CpuArch, OsFamily};
    /// use terraform_demux_installer::cli::{InstallArgs, WordSize};
    ///
    /// let args = InstallArgs {
    ///     os: Some("linux".to_owned()),
    ///     arch: Some("arm".to_owned()),
    ///     bits: Some(WordSize::Bits32),
    ///     ..InstallArgs::default()
    /// };
    /// let host = args.host();
    /// assert_eq!(host.os(), Some(OsFamily::Linux));
    /// assert_eq!(host.arch(), Some(CpuArch::Arm));
    /// assert!(!host.is_64bit());
    /// ```
    #[must_use]
    pub fn host(&self) -> Host {
        Host::detect().with_overrides(
            self.os.as_deref(),
            self.arch.as_deref(),
            self.bits.map(WordSize::is_64bit),
        )
    }
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened install arguments.
    ///
    /// # Note
    ///
    /// For the other subcommands this returns the default flattened install
    /// arguments. Callers should check `self.command` first.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::Uninstall(_) | Command::Releases(_) | Command::Info(_)) | None => {
                &self.install
            }
        }
    }

    /// Verbosity and quiet flags of whichever command is active.
    #[must_use]
    pub fn log_settings(&self) -> (u8, bool) {
        match &self.command {
            Some(Command::Uninstall(args)) => (0, args.quiet),
            Some(Command::Releases(_) | Command::Info(_)) => (0, false),
            Some(Command::Install(_)) | None => {
                let args = self.install_args();
                (args.verbosity, args.quiet)
            }
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
