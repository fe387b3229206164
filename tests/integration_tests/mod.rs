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

mod test_cmd_list;
mod test_cmd_prune;
mod test_cmd_snapshot;

/// Old snapshots shared by the tests, oldest first.
const OLD_TIMESTAMPS: &[&str] = &[
    "2020-01-01T00:00:00+00:00",
    "2020-02-01T00:00:00+00:00",
    "2020-03-01T00:00:00+00:00",
];
