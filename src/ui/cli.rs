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

use crate::global::defaults::{MAX_VERBOSITY, PASSTHROUGH_VERBOSITY};

/// Output settings passed down to everything that prints.
///
/// Levels:
/// - 0: errors only
/// - 1: warnings and a summary of each target
/// - 2: every external command
/// - 3: retention details and the external tool's own output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Console {
    verbosity: u32,
}

impl Console {
    pub fn new(verbosity: u32) -> Self {
        Self {
            verbosity: verbosity.min(MAX_VERBOSITY),
        }
    }

    /// A console that prints nothing but errors.
    pub fn quiet() -> Self {
        Self::new(0)
    }

    #[inline]
    pub fn verbosity(&self) -> u32 {
        self.verbosity
    }

    /// True if the external tool should inherit the terminal.
    #[inline]
    pub fn passthrough(&self) -> bool {
        self.verbosity >= PASSTHROUGH_VERBOSITY
    }
}

#[macro_export]
macro_rules! log_with_level {
    ($console:expr, $min_level:expr) => {
        if $console.verbosity() >= $min_level {
            println!()
        }
    };
    ($console:expr, $min_level:expr, $($arg:tt)*) => {
        if $console.verbosity() >= $min_level {
            println!($($arg)*)
        }
    };
}

#[macro_export]
macro_rules! log_always {
    ($($arg:tt)*) => {
        println!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($console:expr, $($arg:tt)*) => {
        {
            let _ = &$console;
            eprintln!(
                "{}{}Error:{} {}",
                "\x1b[1m",  // BOLD
                "\x1b[31m", // RED
                "\x1b[0m",  // RESET
                format!($($arg)*)
            );
        }
    };
}

#[macro_export]
macro_rules! warning {
    ($console:expr, $($arg:tt)*) => {
        if $console.verbosity() >= 1 {
            eprintln!(
                "{}{}Warning:{} {}",
                "\x1b[1m",  // BOLD
                "\x1b[33m", // YELLOW
                "\x1b[0m",  // RESET
                format!($($arg)*)
            );
        }
    };
}

#[macro_export]
macro_rules! log {
    ($console:expr) => {
        $crate::ui::cli::log_with_level!($console, 1)
    };
    ($console:expr, $($arg:tt)*) => {
        $crate::ui::cli::log_with_level!($console, 1, $($arg)*)
    };
}

#[macro_export]
macro_rules! verbose_1 {
    ($console:expr, $($arg:tt)*) => {
        $crate::ui::cli::log_with_level!($console, 2, $($arg)*)
    };
}

#[macro_export]
macro_rules! verbose_2 {
    ($console:expr, $($arg:tt)*) => {
        $crate::ui::cli::log_with_level!($console, 3, $($arg)*)
    };
}

pub use {error, log, log_always, log_with_level, verbose_1, verbose_2, warning};
