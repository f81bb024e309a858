//! terraform-demux installer CLI entrypoint.
//!
//! This binary installs, upgrades and removes the prebuilt terraform-demux
//! launcher and its `terraform` alias, and reports what the release catalog
//! publishes.

use camino::Utf8Path;
use clap::Parser;
use std::io::Write;
use terraform_demux_installer::artefact::catalog::ArtifactCatalog;
use terraform_demux_installer::artefact::download::HttpDownloader;
use terraform_demux_installer::artefact::extraction::ReleaseArchiveExtractor;
use terraform_demux_installer::cli::{Cli, Command, InfoArgs, ReleasesArgs, UninstallArgs};
use terraform_demux_installer::conflict::TERRAFORM_DEMUX;
use terraform_demux_installer::dirs::{BaseDirs, InstallDirs, SystemBaseDirs};
use terraform_demux_installer::error::{InstallerError, Result};
use terraform_demux_installer::installer::Installer;
use terraform_demux_installer::logging;
use terraform_demux_installer::output::{
    format_info_human, format_info_json, format_releases_human, format_releases_json,
    uninstall_message, write_stderr_line,
};
use terraform_demux_installer::pipeline::{InstallRequest, run_install};
use terraform_demux_installer::receipt::ReceiptStore;

fn main() {
    let cli = Cli::parse();
    let (verbosity, quiet) = cli.log_settings();
    logging::init(verbosity, quiet);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Some(Command::Uninstall(args)) => run_uninstall(args, stderr),
        Some(Command::Releases(args)) => run_releases(args, stdout),
        Some(Command::Info(args)) => run_info(args, stdout),
        Some(Command::Install(_)) | None => run_install_command(cli, stderr),
    }
}

fn run_install_command(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let args = cli.install_args();
    let catalog = load_catalog(args.catalog.as_deref())?;
    let host = args.host();
    let dirs = resolve_dirs(args.bin_dir.as_deref(), args.data_dir.as_deref())?;

    let extractor = ReleaseArchiveExtractor;
    let installer = Installer::new(
        dirs.bin_dir,
        ReceiptStore::new(dirs.data_dir),
        TERRAFORM_DEMUX,
        &extractor,
    );
    let request = InstallRequest {
        catalog: &catalog,
        version: args.version.as_deref(),
        host: &host,
        dry_run: args.dry_run,
        quiet: args.quiet,
    };
    run_install(&request, &HttpDownloader, &installer, stderr)?;
    Ok(())
}

fn run_uninstall(args: &UninstallArgs, stderr: &mut dyn Write) -> Result<()> {
    let dirs = resolve_dirs(args.bin_dir.as_deref(), args.data_dir.as_deref())?;
    let extractor = ReleaseArchiveExtractor;
    let installer = Installer::new(
        dirs.bin_dir,
        ReceiptStore::new(dirs.data_dir),
        TERRAFORM_DEMUX,
        &extractor,
    );
    let removed = installer.uninstall()?;
    if !args.quiet {
        write_stderr_line(
            stderr,
            uninstall_message(TERRAFORM_DEMUX.name, removed.as_ref()),
        );
    }
    Ok(())
}

fn run_releases(args: &ReleasesArgs, stdout: &mut dyn Write) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let text = if args.json {
        format_releases_json(&catalog)
    } else {
        format_releases_human(&catalog)
    };
    write_stdout(stdout, &text)
}

fn run_info(args: &InfoArgs, stdout: &mut dyn Write) -> Result<()> {
    let text = if args.json {
        format_info_json(&TERRAFORM_DEMUX)
    } else {
        format_info_human(&TERRAFORM_DEMUX)
    };
    write_stdout(stdout, &text)
}

fn load_catalog(path: Option<&Utf8Path>) -> Result<ArtifactCatalog> {
    let catalog = match path {
        Some(path) => ArtifactCatalog::load(path)?,
        None => ArtifactCatalog::builtin()?,
    };
    Ok(catalog)
}

fn resolve_dirs(
    bin_dir: Option<&Utf8Path>,
    data_dir: Option<&Utf8Path>,
) -> Result<InstallDirs> {
    let system = SystemBaseDirs::new();
    InstallDirs::resolve(
        bin_dir,
        data_dir,
        system.as_ref().map(|dirs| dirs as &dyn BaseDirs),
        TERRAFORM_DEMUX.name,
    )
}

fn write_stdout(stdout: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(stdout, "{text}").map_err(|source| InstallerError::WriteFailed { source })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
