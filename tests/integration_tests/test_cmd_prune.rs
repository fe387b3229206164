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

use anyhow::Result;
use chrono::Utc;
use snaprot::{
    commands::{TargetArgs, cmd_prune},
    utils::timestamp::format_timestamp,
};

use super::OLD_TIMESTAMPS;
use crate::test_utils::{FAKE_BTRFS, Sandbox, add_snapshots, list_dir, quiet};

#[test]
fn test_prune_by_age() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;
    add_snapshots(&destination, "", OLD_TIMESTAMPS)?;

    let recent = format_timestamp(&Utc::now());
    let protected = "2019-12-31T00:00:00+00:00@";
    add_snapshots(&destination, "", &[recent.as_str(), protected])?;

    let args = cmd_prune::CmdArgs {
        targets: TargetArgs {
            days: Some(30),
            ..sandbox.target_args(vec![source, destination.clone()])
        },
        dry_run: false,
    };
    let report = cmd_prune::run(&quiet(), &args)?;

    assert!(report.success());
    assert_eq!(report.targets[0].created, None);
    assert_eq!(report.targets[0].deleted.len(), 3);

    let mut expected = vec![protected.to_string(), recent];
    expected.sort();
    assert_eq!(list_dir(&destination)?, expected);
    Ok(())
}

#[test]
fn test_prune_invalid_timestamp_deletes_nothing() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;
    add_snapshots(&destination, "home-", OLD_TIMESTAMPS)?;
    add_snapshots(&destination, "home-", &["2019-garbage"])?;

    let args = cmd_prune::CmdArgs {
        targets: TargetArgs {
            prefix: Some("home-".to_string()),
            days: Some(30),
            ..sandbox.target_args(vec![source, destination.clone()])
        },
        dry_run: false,
    };
    let report = cmd_prune::run(&quiet(), &args)?;

    assert!(!report.success());
    assert!(report.targets[0].deleted.is_empty());
    assert_eq!(list_dir(&destination)?.len(), 4);
    Ok(())
}

#[test]
fn test_prune_keep_everything_ignores_missing_destination() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.dir.path().join("missing");

    let args = cmd_prune::CmdArgs {
        targets: sandbox.target_args(vec![source, destination]),
        dry_run: false,
    };
    let report = cmd_prune::run(&quiet(), &args)?;

    assert!(report.success());
    assert!(report.targets[0].deleted.is_empty());
    Ok(())
}
