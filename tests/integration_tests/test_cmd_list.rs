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
use snaprot::commands::{TargetArgs, cmd_list};

use super::OLD_TIMESTAMPS;
use crate::test_utils::{FAKE_BTRFS, Sandbox, add_snapshots, list_dir, quiet};

#[test]
fn test_list_changes_nothing() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;
    let destination = sandbox.mkdir("snapshots/home")?;
    add_snapshots(&destination, "", OLD_TIMESTAMPS)?;

    let args = cmd_list::CmdArgs {
        targets: TargetArgs {
            keep: Some(1),
            ..sandbox.target_args(vec![source, destination.clone()])
        },
    };
    let report = cmd_list::run(&quiet(), &args)?;

    assert!(report.success());
    assert_eq!(list_dir(&destination)?.len(), 3);
    Ok(())
}

#[test]
fn test_list_missing_destination_fails() -> Result<()> {
    let sandbox = Sandbox::new(FAKE_BTRFS)?;
    let source = sandbox.mkdir("volumes/home")?;

    let args = cmd_list::CmdArgs {
        targets: sandbox.target_args(vec![source, sandbox.dir.path().join("missing")]),
    };
    let report = cmd_list::run(&quiet(), &args)?;

    assert!(!report.success());
    assert_eq!(report.num_failed(), 1);
    Ok(())
}
