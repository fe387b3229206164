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

use clap::Parser;

use snaprot::{
    commands::{self, Cli},
    global::{
        self, UsageError,
        defaults::{EXIT_BAD_ARGUMENTS, EXIT_FATAL, EXIT_SUCCESS, EXIT_TARGETS_FAILED},
    },
    ui,
};

fn main() {
    let args = Cli::parse();
    let console = global::console_from_args(&args.global_args);

    let code = match commands::run(&args) {
        Ok(report) if report.success() => EXIT_SUCCESS,
        Ok(_) => EXIT_TARGETS_FAILED,
        Err(e) => {
            ui::cli::error!(console, "{:#}", e);
            if e.downcast_ref::<UsageError>().is_some() {
                EXIT_BAD_ARGUMENTS
            } else {
                EXIT_FATAL
            }
        }
    };

    std::process::exit(code);
}
