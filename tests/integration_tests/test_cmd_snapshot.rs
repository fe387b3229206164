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

#![cfg(unix)]

use std::path::PathBuf;

use anyhow::Result;
use snaprot::{
    commands::{TargetArgs, cmd_snapshot},
    global::UsageError,
};

use super::OLD_TIMESTAMPS;
use crate::test_utils::{FAILING_BTRFS, FAKE_BTRFS, Sandbox, add_snapshots, list_dir, quiet};

const TIMESTAMP: &str = "2021-01-01T00:00:00+00:00";

fn snapshot_args(targets: TargetArgs, dry_run: bool) -> cmd_snapshot::CmdArgs {
    cmd_snapshot::CmdArgs {
        targets,
        dry_run,
        timestamp: Some(TIMESTAMP.to_string()),
        utc: false,
    }
}

#[test]
fn test_snapshot_rotates_pair() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;
    add_snapshots(&destination, "home-", OLD_TIMESTAMPS)?;

    let targets = TargetArgs {
        prefix: Some("home-".to_string()),
        keep: Some(2),
        ..sandbox.target_args(vec![source, destination.clone()])
    };
    let report = cmd_snapshot::run(&quiet(), &snapshot_args(targets, false))?;

    assert!(report.success());
    assert_eq!(
        report.targets[0].created,
        Some(destination.join(format!("home-{TIMESTAMP}")))
    );
    assert_eq!(report.targets[0].deleted.len(), 2);
    assert_eq!(
        list_dir(&destination)?,
        vec![
            "home-2020-03-01T00:00:00+00:00".to_string(),
            format!("home-{TIMESTAMP}"),
        ]
    );
    Ok(())
}

#[test]
fn test_snapshot_dry_run() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;
    add_snapshots(&destination, "home-", OLD_TIMESTAMPS)?;

    let targets = TargetArgs {
        prefix: Some("home-".to_string()),
        keep: Some(2),
        ..sandbox.target_args(vec![source, destination.clone()])
    };
    let report = cmd_snapshot::run(&quiet(), &snapshot_args(targets, true))?;

    // Same selection as a real run, nothing touched
    assert!(report.success());
    assert_eq!(
        report.targets[0].deleted,
        vec![
            "home-2020-01-01T00:00:00+00:00",
            "home-2020-02-01T00:00:00+00:00"
        ]
    );
    assert_eq!(list_dir(&destination)?.len(), 3);
    Ok(())
}

#[test]
fn test_failed_snapshot_keeps_old_ones() -> Result<()> {
    let sandbox = Sandbox::new(FAILING_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;
    add_snapshots(&destination, "", OLD_TIMESTAMPS)?;

    let targets = TargetArgs {
        keep: Some(1),
        ..sandbox.target_args(vec![source, destination.clone()])
    };
    let report = cmd_snapshot::run(&quiet(), &snapshot_args(targets, false))?;

    assert!(!report.success());
    let error = report.targets[0].error.clone().unwrap_or_default();
    assert!(error.contains("not a btrfs subvolume"));
    assert_eq!(list_dir(&destination)?.len(), 3);
    Ok(())
}

#[test]
fn test_snapshot_directories() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let volumes = sandbox.mkdir("volumes")?;
    sandbox.mkdir("volumes/a")?;
    sandbox.mkdir("volumes/b")?;
    let snapshots = sandbox.mkdir("snapshots")?;
    sandbox.mkdir("snapshots/a")?;
    sandbox.mkdir("snapshots/b")?;
    add_snapshots(&snapshots.join("a"), "", OLD_TIMESTAMPS)?;

    let targets = TargetArgs {
        directories: true,
        keep: Some(1),
        ..sandbox.target_args(vec![volumes, snapshots.clone()])
    };
    let report = cmd_snapshot::run(&quiet(), &snapshot_args(targets, false))?;

    assert!(report.success());
    assert_eq!(report.targets.len(), 2);
    assert_eq!(list_dir(&snapshots.join("a"))?, vec![TIMESTAMP]);
    assert_eq!(list_dir(&snapshots.join("b"))?, vec![TIMESTAMP]);
    Ok(())
}

#[test]
fn test_snapshot_from_config() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/data")?;
    let destination = sandbox.mkdir("snapshots/data")?;
    add_snapshots(&destination, "data-", OLD_TIMESTAMPS)?;

    let config = format!(
        "[DEFAULT]\nkeep = 2\n\n[data]\nsource = {}\ndestination = {}\nprefix = data-\n\n[broken]\nsource = /nowhere\n",
        source.display(),
        destination.display()
    );
    let config_path = sandbox.dir.path().join("snaprot.ini");
    std::fs::write(&config_path, config)?;

    let targets = TargetArgs {
        config: Some(config_path),
        ..sandbox.target_args(Vec::new())
    };
    let report = cmd_snapshot::run(&quiet(), &snapshot_args(targets, false))?;

    assert!(!report.success());
    assert_eq!(report.num_failed(), 1);
    assert_eq!(report.targets[0].name, "data");
    assert!(report.targets[0].is_ok());
    assert_eq!(report.targets[1].name, "broken");
    assert_eq!(list_dir(&destination)?.len(), 2);
    Ok(())
}

#[test]
fn test_wrong_path_count_is_usage_error() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;

    let targets = sandbox.target_args(vec![source, destination.clone(), PathBuf::from("extra")]);
    let result = cmd_snapshot::run(&quiet(), &snapshot_args(targets, false));

    let err = result.err().unwrap();
    assert!(err.downcast_ref::<UsageError>().is_some());
    assert!(list_dir(&destination)?.is_empty());
    Ok(())
}

#[test]
fn test_snapshot_utc_names() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;

    let args = cmd_snapshot::CmdArgs {
        timestamp: None,
        utc: true,
        ..snapshot_args(sandbox.target_args(vec![source, destination.clone()]), false)
    };
    let report = cmd_snapshot::run(&quiet(), &args)?;

    assert!(report.success());
    let names = list_dir(&destination)?;
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with("+00:00"));
    Ok(())
}
