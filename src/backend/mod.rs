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

pub mod btrfs;
pub mod dry;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use btrfs::BtrfsCommand;
use dry::DryBackend;

use crate::ui::cli::Console;

/// Abstraction of the tool that owns the snapshots.
///
/// Creation and deletion are the only operations with side effects. Every
/// call blocks until the underlying operation has finished.
pub trait SnapshotBackend: Send + Sync {
    /// Creates a read-only, point-in-time snapshot of `source` at `destination`.
    fn create_snapshot(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Deletes all the snapshots in `paths` in a single operation.
    /// The list is never empty.
    fn delete_snapshots(&self, paths: &[PathBuf]) -> Result<()>;

    /// Lists the names of the entries in a destination directory.
    fn list_snapshots(&self, directory: &Path) -> Result<Vec<String>>;
}

/// Encapsulates a SnapshotBackend inside a DryBackend.
#[inline]
pub fn make_dry_backend(
    backend: Arc<dyn SnapshotBackend>,
    dry: bool,
    console: Console,
) -> Arc<dyn SnapshotBackend> {
    match dry {
        true => Arc::new(DryBackend::new(backend, console)),
        false => backend,
    }
}

/// Creates the backend that drives the external btrfs tool.
pub fn new_btrfs_backend(program: &Path, console: Console) -> Arc<dyn SnapshotBackend> {
    Arc::new(BtrfsCommand::new(program.to_path_buf(), console))
}
