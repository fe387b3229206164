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
use clap::Args;

use super::{GlobalArgs, TargetArgs, run_rotation};
use crate::{
    rotation::orchestrator::{Mode, RunReport},
    utils::timestamp::run_timestamp,
};

#[derive(Args, Debug)]
#[clap(about = "Delete the old snapshots of every target without taking new ones")]
pub struct CmdArgs {
    #[clap(flatten)]
    pub targets: TargetArgs,

    /// Dry run
    #[clap(short = 'n', long, default_value_t = false)]
    pub dry_run: bool,
}

pub fn run(global_args: &GlobalArgs, args: &CmdArgs) -> Result<RunReport> {
    // No snapshot is named in a prune pass
    run_rotation(
        global_args,
        &args.targets,
        Mode::Prune,
        args.dry_run,
        run_timestamp(),
    )
}
