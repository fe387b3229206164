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

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Error, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;

use super::retention::{self, ProtectedMarkers};
use crate::{
    backend::SnapshotBackend,
    target::{SnapshotTarget, TargetEntry},
    ui::{self, cli::Console},
    utils,
};

/// What to do with each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Take a new snapshot, then apply the retention policy.
    Snapshot,
    /// Only apply the retention policy.
    Prune,
}

/// Outcome of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub name: String,
    /// Path of the snapshot taken in this run.
    pub created: Option<PathBuf>,
    /// Names of the snapshots deleted by the retention policy, oldest first.
    pub deleted: Vec<String>,
    pub error: Option<String>,
}

impl TargetReport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created: None,
            deleted: Vec::new(),
            error: None,
        }
    }

    pub fn failed(name: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(name)
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub targets: Vec<TargetReport>,
    /// The run was stopped before processing every target.
    pub interrupted: bool,
}

impl RunReport {
    /// True if every target succeeded.
    pub fn success(&self) -> bool {
        !self.interrupted && self.targets.iter().all(TargetReport::is_ok)
    }

    pub fn num_failed(&self) -> usize {
        self.targets.iter().filter(|t| !t.is_ok()).count()
    }
}

/// Takes snapshots and applies the retention policy, one target at a time.
///
/// A failing target never stops the run: the error is logged, recorded in
/// the report and the next target is processed.
pub struct Rotator {
    backend: Arc<dyn SnapshotBackend>,
    console: Console,
    markers: ProtectedMarkers,
    timestamp: String,
    now: DateTime<Utc>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Rotator {
    /// `timestamp` names the snapshots taken in this run and `now` is the
    /// instant the snapshot ages are measured from.
    pub fn new(
        backend: Arc<dyn SnapshotBackend>,
        console: Console,
        markers: ProtectedMarkers,
        timestamp: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            backend,
            console,
            markers,
            timestamp,
            now,
            interrupt: None,
        }
    }

    /// Stops the run before the next target once `flag` is raised.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Processes all the targets in order.
    pub fn run(&self, entries: &[TargetEntry], mode: Mode) -> RunReport {
        let mut report = RunReport::default();

        for (i, entry) in entries.iter().enumerate() {
            if self.is_interrupted() {
                let remaining = &entries[i..];
                ui::cli::warning!(
                    self.console,
                    "Interrupted. Skipping {}",
                    utils::format_count(remaining.len(), "target", "targets")
                );
                report.interrupted = true;
                report.targets.extend(
                    remaining
                        .iter()
                        .map(|e| TargetReport::failed(&e.name, "Interrupted".to_string())),
                );
                break;
            }

            let target_report = match &entry.target {
                Ok(target) => match mode {
                    Mode::Snapshot => self.rotate(&entry.name, target),
                    Mode::Prune => self.prune(&entry.name, target),
                },
                Err(e) => self.fail(TargetReport::new(&entry.name), e),
            };
            report.targets.push(target_report);
        }

        report
    }

    /// Takes a new snapshot of a target and then applies its retention
    /// policy. If the snapshot cannot be taken, nothing is deleted.
    pub fn rotate(&self, name: &str, target: &SnapshotTarget) -> TargetReport {
        let mut report = TargetReport::new(name);

        let snapshot_name = target.snapshot_name(&self.timestamp);
        let snapshot_path = target.snapshot_path(&snapshot_name);

        if let Err(e) = self
            .backend
            .create_snapshot(&target.source, &snapshot_path)
            .with_context(|| format!("Could not snapshot \'{}\'", target.source.display()))
        {
            return self.fail(report, &e);
        }

        ui::cli::log!(
            self.console,
            "{} {} -> {}",
            format!("[{}]", name).bold().green(),
            target.source.display(),
            snapshot_path.display()
        );
        report.created = Some(snapshot_path);

        match self.apply_retention(name, target, Some(&snapshot_name)) {
            Ok(deleted) => report.deleted = deleted,
            Err(e) => return self.fail(report, &e),
        }

        report
    }

    /// Applies the retention policy of a target without taking a snapshot.
    pub fn prune(&self, name: &str, target: &SnapshotTarget) -> TargetReport {
        let mut report = TargetReport::new(name);

        match self.apply_retention(name, target, None) {
            Ok(deleted) => report.deleted = deleted,
            Err(e) => return self.fail(report, &e),
        }

        report
    }

    /// Deletes the snapshots the policy lets go, in a single call.
    ///
    /// `new_snapshot` is the snapshot taken in this run. It counts as
    /// present even if the backend does not list it, as in a dry run.
    fn apply_retention(
        &self,
        name: &str,
        target: &SnapshotTarget,
        new_snapshot: Option<&str>,
    ) -> Result<Vec<String>> {
        let policy = target.policy();
        if policy.keeps_everything() {
            ui::cli::verbose_2!(self.console, "[{}] {}", name, policy);
            return Ok(Vec::new());
        }

        let mut names = self.backend.list_snapshots(&target.destination)?;
        if let Some(new_snapshot) = new_snapshot {
            if !names.iter().any(|n| n == new_snapshot) {
                names.push(new_snapshot.to_string());
            }
        }

        let selection = retention::select_for_deletion(
            &names,
            &target.prefix,
            &policy,
            &self.markers,
            &self.now,
        )
        .with_context(|| {
            format!(
                "Retention skipped for \'{}\'",
                target.destination.display()
            )
        })?;

        ui::cli::verbose_2!(
            self.console,
            "[{}] {}: {} of {} in {}",
            name,
            policy,
            utils::format_count(selection.len(), "snapshot", "snapshots"),
            retention::candidates(&names, &target.prefix, &self.markers).len(),
            target.destination.display()
        );

        if selection.is_empty() {
            return Ok(selection);
        }

        let paths: Vec<PathBuf> = selection
            .iter()
            .map(|snapshot| target.snapshot_path(snapshot))
            .collect();
        self.backend
            .delete_snapshots(&paths)
            .with_context(|| format!("Could not delete snapshots in \'{}\'", target.destination.display()))?;

        ui::cli::log!(
            self.console,
            "{} {} from {}",
            format!("[{}]", name).bold().yellow(),
            utils::format_count(selection.len(), "snapshot deleted", "snapshots deleted"),
            target.destination.display()
        );

        Ok(selection)
    }

    fn fail(&self, mut report: TargetReport, error: &Error) -> TargetReport {
        let message = format!("{:#}", error);
        ui::cli::error!(self.console, "[{}] {}", report.name, message);
        report.error = Some(message);
        report
    }
}
