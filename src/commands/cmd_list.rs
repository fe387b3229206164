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

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;

use super::{GlobalArgs, TargetArgs};
use crate::{
    backend::{self, SnapshotBackend},
    global,
    rotation::{
        orchestrator::{RunReport, TargetReport},
        retention::{self, ProtectedMarkers, Verdict},
    },
    target::SnapshotTarget,
    ui::{
        self,
        table::{Alignment, Table},
    },
};

#[derive(Args, Debug)]
#[clap(about = "Show the snapshots of every target and what the retention policy does with them")]
pub struct CmdArgs {
    #[clap(flatten)]
    pub targets: TargetArgs,
}

pub fn run(global_args: &GlobalArgs, args: &CmdArgs) -> Result<RunReport> {
    let console = global::console_from_args(global_args);
    let entries = args.targets.resolve_targets()?;
    let markers = args.targets.markers(&console);
    let backend = backend::new_btrfs_backend(&args.targets.btrfs, console);
    let now = Utc::now();

    let mut report = RunReport::default();
    for entry in &entries {
        let result = entry.target.as_ref().map_err(|e| format!("{:#}", e)).and_then(|target| {
            list_target(backend.as_ref(), &entry.name, target, &markers, &now)
                .map_err(|e| format!("{:#}", e))
        });

        match result {
            Ok(()) => report.targets.push(TargetReport::new(&entry.name)),
            Err(message) => {
                ui::cli::error!(console, "[{}] {}", entry.name, message);
                report.targets.push(TargetReport::failed(&entry.name, message));
            }
        }
    }

    Ok(report)
}

fn list_target(
    backend: &dyn SnapshotBackend,
    name: &str,
    target: &SnapshotTarget,
    markers: &ProtectedMarkers,
    now: &DateTime<Utc>,
) -> Result<()> {
    let policy = target.policy();
    let names = backend.list_snapshots(&target.destination)?;
    let verdicts = retention::verdicts(&names, &target.prefix, &policy, markers, now)?;

    println!(
        "{} {} -> {} ({})",
        format!("[{}]", name).bold(),
        target.source.display(),
        target.destination.display(),
        policy
    );

    let table = verdict_table(verdicts, &target.prefix, now);
    if table.is_empty() {
        println!("No snapshots");
    } else {
        table.print();
    }
    println!();
    Ok(())
}

/// One row per snapshot with its age and what the policy does with it.
fn verdict_table(verdicts: Vec<(String, Verdict)>, prefix: &str, now: &DateTime<Utc>) -> Table {
    let mut table =
        Table::new_with_alignments(vec![Alignment::Left, Alignment::Right, Alignment::Left]);
    table.set_headers(vec![
        "Snapshot".bold().to_string(),
        "Age".bold().to_string(),
        "Policy".bold().to_string(),
    ]);

    for (snapshot, verdict) in verdicts {
        let age = match retention::snapshot_age_days(&snapshot, prefix, now) {
            Ok(days) => format!("{}d", days),
            Err(_) => "?".to_string(),
        };
        let verdict = match verdict {
            Verdict::Protected => verdict.to_string().cyan().to_string(),
            Verdict::Keep => verdict.to_string().green().to_string(),
            Verdict::Delete => verdict.to_string().red().to_string(),
        };
        table.add_row(vec![snapshot, age, verdict]);
    }

    table
}
