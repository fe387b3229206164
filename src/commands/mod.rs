// snaprot rotates read-only btrfs snapshots
// Copyright (C) 2025  Javier Lancha Vázquez <javier.lancha@gmail.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{path::PathBuf, time::Instant};

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::{
    backend::{self, make_dry_backend},
    global::{
        self, UsageError,
        defaults::{DEFAULT_BTRFS_COMMAND, DEFAULT_CONFIG_PATH, DEFAULT_PROTECTED_CHARS},
    },
    rotation::{
        orchestrator::{Mode, Rotator, RunReport},
        retention::ProtectedMarkers,
    },
    target::{self, Overrides, TargetEntry, config},
    ui::{
        self,
        cli::Console,
        table::{Alignment, Table},
    },
    utils,
};

pub mod cmd_list;
pub mod cmd_prune;
pub mod cmd_snapshot;

#[derive(Parser, Debug)]
#[clap(
    version = env!("CARGO_PKG_VERSION"), // Version from crate metadata
    about = "Take and rotate read-only btrfs snapshots",
)]
pub struct Cli {
    // Subcommand
    #[command(subcommand)]
    pub command: Command,

    // Global arguments
    #[clap(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Snapshot(cmd_snapshot::CmdArgs),
    Prune(cmd_prune::CmdArgs),
    List(cmd_list::CmdArgs),
}

#[derive(Parser, Debug)]
pub struct GlobalArgs {
    /// Disable logging (verbosity = 0)
    #[clap(long, global = true, value_parser, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Set the verbosity level [0-3]
    #[clap(short = 'v', long, global = true, value_parser)]
    pub verbosity: Option<u32>,
}

/// Selection of the targets. Shared by all the commands.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Configuration file with one target per section. Read when no PATHs are given
    #[clap(long, value_parser, conflicts_with = "paths")]
    pub config: Option<PathBuf>,

    /// The btrfs executable
    #[clap(long, value_parser, default_value = DEFAULT_BTRFS_COMMAND)]
    pub btrfs: PathBuf,

    /// Make a target of every subdirectory of each SOURCE
    #[clap(short = 'D', long, value_parser)]
    pub directories: bool,

    /// Prefix of the snapshot names
    #[clap(long, value_parser)]
    pub prefix: Option<String>,

    /// Snapshots whose names contain any of these characters are never deleted
    #[clap(long, value_parser, default_value = DEFAULT_PROTECTED_CHARS)]
    pub protect: String,

    /// Keep the last N snapshots of every target
    #[clap(long, value_parser, allow_negative_numbers = true)]
    pub keep: Option<i64>,

    /// Keep the snapshots of every target younger than N days
    #[clap(long, value_parser, allow_negative_numbers = true)]
    pub days: Option<i64>,

    /// SOURCE DESTINATION, or SOURCE... DESTINATION with --directories
    #[clap(value_parser, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

impl Default for TargetArgs {
    fn default() -> Self {
        Self {
            config: None,
            btrfs: PathBuf::from(DEFAULT_BTRFS_COMMAND),
            directories: false,
            prefix: None,
            protect: DEFAULT_PROTECTED_CHARS.to_string(),
            keep: None,
            days: None,
            paths: Vec::new(),
        }
    }
}

impl TargetArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            prefix: self.prefix.clone(),
            keep: self.keep,
            days: self.days,
        }
    }

    /// Resolves the targets from the positional paths or, if there are none,
    /// from the configuration file.
    pub fn resolve_targets(&self) -> Result<Vec<TargetEntry>> {
        let overrides = self.overrides();

        match (self.paths.as_slice(), self.directories) {
            ([], false) => {
                let path = self
                    .config
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
                config::load_targets(&path, &overrides)
            }
            ([source, destination], false) => {
                Ok(vec![target::from_pair(source, destination, &overrides)])
            }
            (paths, false) => Err(UsageError(format!(
                "Expected SOURCE DESTINATION, got {}",
                utils::format_count(paths.len(), "path", "paths")
            ))
            .into()),
            ([] | [_], true) => Err(UsageError(
                "--directories needs at least one SOURCE and a DESTINATION".to_string(),
            )
            .into()),
            ([sources @ .., destination], true) => {
                Ok(target::from_directories(sources, destination, &overrides))
            }
        }
    }

    /// The protected markers. Warns about markers that also appear in
    /// timestamps, since they would protect every snapshot.
    pub fn markers(&self, console: &Console) -> ProtectedMarkers {
        let markers = ProtectedMarkers::new(&self.protect);
        let conflicts = markers.timestamp_conflicts();
        if !conflicts.is_empty() {
            ui::cli::warning!(
                console,
                "Protected markers {:?} also appear in timestamps. Those snapshots are never deleted",
                conflicts
            );
        }
        markers
    }
}

/// Runs snapshot and prune passes over all the targets.
pub(crate) fn run_rotation(
    global_args: &GlobalArgs,
    target_args: &TargetArgs,
    mode: Mode,
    dry_run: bool,
    timestamp: String,
) -> Result<RunReport> {
    let console = global::console_from_args(global_args);
    let entries = target_args.resolve_targets()?;
    let markers = target_args.markers(&console);

    if entries.is_empty() {
        ui::cli::warning!(console, "No targets");
    }

    let backend = backend::new_btrfs_backend(&target_args.btrfs, console);
    let backend = make_dry_backend(backend, dry_run, console);

    let start = Instant::now();
    let rotator = Rotator::new(backend, console, markers, timestamp, Utc::now())
        .with_interrupt(global::interrupt_flag(&console));
    let report = rotator.run(&entries, mode);

    show_summary(&console, &report, dry_run);
    ui::cli::log!(
        console,
        "Finished in {}",
        utils::pretty_print_duration(start.elapsed())
    );

    Ok(report)
}

/// Prints one row per target.
fn show_summary(console: &Console, report: &RunReport, dry_run: bool) {
    if console.verbosity() < 1 || report.targets.is_empty() {
        return;
    }

    let mut table = Table::new_with_alignments(vec![
        Alignment::Left,
        Alignment::Left,
        Alignment::Right,
        Alignment::Left,
    ]);
    let deleted_header = if dry_run { "Would delete" } else { "Deleted" };
    table.set_headers(vec![
        "Target".bold().to_string(),
        "Snapshot".bold().to_string(),
        deleted_header.bold().to_string(),
        "Status".bold().to_string(),
    ]);

    for target in &report.targets {
        let snapshot = target
            .created
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match &target.error {
            None => "ok".green().to_string(),
            Some(_) => "failed".bold().red().to_string(),
        };
        table.add_row(vec![
            target.name.clone(),
            snapshot,
            target.deleted.len().to_string(),
            status,
        ]);
    }

    ui::cli::log!(console);
    table.print();

    let failed = report.num_failed();
    if failed > 0 {
        ui::cli::log!(
            console,
            "{} of {} failed",
            utils::format_count(failed, "target", "targets"),
            report.targets.len()
        );
    }
}

pub fn run(args: &Cli) -> Result<RunReport> {
    match &args.command {
        Command::Snapshot(cmd_args) => cmd_snapshot::run(&args.global_args, cmd_args),
        Command::Prune(cmd_args) => cmd_prune::run(&args.global_args, cmd_args),
        Command::List(cmd_args) => cmd_list::run(&args.global_args, cmd_args),
    }
}
