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

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use colored::Colorize;

use super::SnapshotBackend;
use crate::{ui, ui::cli::Console};

/// A dummy backend that sets itself before another backend, forwarding
/// listings but only reporting creations and deletions.
pub struct DryBackend {
    backend: Arc<dyn SnapshotBackend>,
    console: Console,
}

impl DryBackend {
    pub fn new(backend: Arc<dyn SnapshotBackend>, console: Console) -> Self {
        Self { backend, console }
    }
}

impl SnapshotBackend for DryBackend {
    fn create_snapshot(&self, source: &Path, destination: &Path) -> Result<()> {
        ui::cli::log!(
            self.console,
            "{} snapshot {} -> {}",
            "Would create".bold().yellow(),
            source.display(),
            destination.display()
        );
        Ok(())
    }

    fn delete_snapshots(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            ui::cli::log!(
                self.console,
                "{} {}",
                "Would delete".bold().yellow(),
                path.display()
            );
        }
        Ok(())
    }

    #[inline]
    fn list_snapshots(&self, directory: &Path) -> Result<Vec<String>> {
        self.backend.list_snapshots(directory)
    }
}
