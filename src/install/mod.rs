//! Runs the stored install commands for one distribution.

use anyhow::{Context, Result};
use colored::Colorize;
use duct::cmd;
use std::io::Write;

use crate::catalog::{CatalogStore, PackageRecord};

/// The two distributions the catalog carries commands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Distro {
    Debian,
    Fedora,
}

impl Distro {
    pub fn tag(self) -> &'static str {
        match self {
            Distro::Debian => "debian",
            Distro::Fedora => "fedora",
        }
    }

    pub fn command_for(self, record: &PackageRecord) -> &str {
        match self {
            Distro::Debian => &record.command_debian,
            Distro::Fedora => &record.command_fedora,
        }
    }
}

/// Result of one executed command. Exit status is carried, not raised:
/// a failing install command is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    pub fn success(self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executor seam for the install flow. The real implementation shells out;
/// tests substitute a recording runner.
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> Result<CommandOutcome>;
}

/// Runs a command line through `sh -c`, inheriting the terminal for all of
/// the command's own I/O. Only a shell that cannot be spawned is an error.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) -> Result<CommandOutcome> {
        let output = cmd("sh", ["-c", command])
            .unchecked()
            .run()
            .with_context(|| format!("failed to invoke shell for '{command}'"))?;
        Ok(CommandOutcome {
            exit_code: output.status.code(),
        })
    }
}

/// Install every package in the catalog for the given distribution,
/// sequentially and in store order. A non-zero exit status is reported as
/// a warning but never aborts the remaining installs.
pub fn install_all<W: Write>(
    store: &CatalogStore,
    distro: Distro,
    runner: &mut dyn CommandRunner,
    out: &mut W,
) -> Result<()> {
    let records = store.list_all()?;
    if records.is_empty() {
        writeln!(out, "{}", "The catalog is empty, nothing to install".yellow())?;
        return Ok(());
    }

    for record in &records {
        writeln!(
            out,
            "{}",
            format!("Installing {} ({})", record.package_name, record.slug)
                .cyan()
                .bold()
        )?;
        let command = distro.command_for(record);
        let outcome = runner.run(command)?;
        if !outcome.success() {
            let status = match outcome.exit_code {
                Some(code) => format!("exit status {code}"),
                None => "termination by signal".to_string(),
            };
            writeln!(
                out,
                "{}",
                format!("warning: '{command}' reported {status}").yellow()
            )?;
        }
        writeln!(out, "{}", format!("Finished {}", record.package_name).green())?;
    }

    writeln!(
        out,
        "{}",
        format!("Processed {} package(s) for {}", records.len(), distro.tag()).green()
    )?;
    Ok(())
}
