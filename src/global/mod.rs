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

pub mod defaults;

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, Ordering},
};

use crate::{commands::GlobalArgs, global::defaults::DEFAULT_VERBOSITY, ui::cli::Console};

/// Builds the console from the global arguments.
pub fn console_from_args(global_args: &GlobalArgs) -> Console {
    let verbosity = if global_args.quiet {
        0
    } else if let Some(v) = global_args.verbosity {
        v
    } else {
        DEFAULT_VERBOSITY
    };

    Console::new(verbosity)
}

/// An error in the command line arguments. Reported before anything is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UsageError {}

static INTERRUPT_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Returns the flag raised by Ctrl+C.
///
/// The signal handler is installed the first time this is called. If the
/// handler cannot be installed, the flag is still returned and never raised.
pub fn interrupt_flag(console: &Console) -> Arc<AtomicBool> {
    INTERRUPT_FLAG
        .get_or_init(|| {
            let flag = Arc::new(AtomicBool::new(false));
            let handler_flag = flag.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                handler_flag.store(true, Ordering::SeqCst);
            }) {
                crate::ui::cli::warning!(console, "Could not install the Ctrl+C handler: {}", e);
            }
            flag
        })
        .clone()
}
