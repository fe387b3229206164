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

// -- Configuration --
pub const DEFAULT_CONFIG_PATH: &str = "/etc/local/btrfs-snapshots";
pub const DEFAULT_BTRFS_COMMAND: &str = "btrfs";

/// Section whose keys act as fallback values for every other section.
pub const CONFIG_DEFAULT_SECTION: &str = "DEFAULT";

// -- Retention --
// keep <= 0 and days <= 0 keeps everything.
pub const DEFAULT_KEEP: i64 = 0;
pub const DEFAULT_DAYS: i64 = -1;

/// Snapshot names containing any of these characters are never deleted.
pub const DEFAULT_PROTECTED_CHARS: &str = "@";

// -- Exit codes --
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_BAD_ARGUMENTS: i32 = 2;
pub const EXIT_TARGETS_FAILED: i32 = 8;

// -- Output --
pub const DEFAULT_VERBOSITY: u32 = 1;
pub const MAX_VERBOSITY: u32 = 3;

/// From this level on, the external tool writes straight to the terminal
/// instead of having its output captured.
pub const PASSTHROUGH_VERBOSITY: u32 = 3;
