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

//! Helpers to exercise the rotation logic without a btrfs filesystem.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow, bail};
use parking_lot::Mutex;

use crate::backend::SnapshotBackend;

/// A call that modified a `MemoryBackend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Create { source: PathBuf, destination: PathBuf },
    Delete(Vec<PathBuf>),
}

#[derive(Default)]
struct State {
    directories: BTreeMap<PathBuf, BTreeSet<String>>,
    failing_sources: HashSet<PathBuf>,
    failing_deletes: bool,
    calls: Vec<BackendCall>,
}

/// An in-memory snapshot store. Directories come into existence when the
/// first snapshot is added to them.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing snapshot without recording a call.
    pub fn add_snapshot<P: AsRef<Path>>(&self, directory: P, name: &str) {
        let mut state = self.state.lock();
        state
            .directories
            .entry(directory.as_ref().to_path_buf())
            .or_default()
            .insert(name.to_string());
    }

    /// Adds an empty destination directory.
    pub fn add_directory<P: AsRef<Path>>(&self, directory: P) {
        let mut state = self.state.lock();
        state
            .directories
            .entry(directory.as_ref().to_path_buf())
            .or_default();
    }

    /// Makes every snapshot creation from `source` fail.
    pub fn fail_creations_from<P: AsRef<Path>>(&self, source: P) {
        let mut state = self.state.lock();
        state.failing_sources.insert(source.as_ref().to_path_buf());
    }

    /// Makes every deletion fail.
    pub fn fail_deletions(&self) {
        self.state.lock().failing_deletes = true;
    }

    /// Returns the calls that reached the backend, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }
}

fn split_path(path: &Path) -> Result<(PathBuf, String)> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("\'{}\' has no parent", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("\'{}\' has no file name", path.display()))?;
    Ok((parent.to_path_buf(), name.to_string()))
}

impl SnapshotBackend for MemoryBackend {
    fn create_snapshot(&self, source: &Path, destination: &Path) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::Create {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });

        if state.failing_sources.contains(source) {
            bail!("Cannot snapshot \'{}\'", source.display());
        }

        let (directory, name) = split_path(destination)?;
        let snapshots = state.directories.entry(directory).or_default();
        if !snapshots.insert(name) {
            bail!("\'{}\' already exists", destination.display());
        }
        Ok(())
    }

    fn delete_snapshots(&self, paths: &[PathBuf]) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::Delete(paths.to_vec()));

        if paths.is_empty() {
            bail!("No snapshots to delete");
        }
        if state.failing_deletes {
            bail!("Cannot delete snapshots");
        }

        for path in paths {
            let (directory, name) = split_path(path)?;
            let removed = state
                .directories
                .get_mut(&directory)
                .map(|snapshots| snapshots.remove(&name))
                .unwrap_or(false);
            if !removed {
                bail!("\'{}\' does not exist", path.display());
            }
        }
        Ok(())
    }

    fn list_snapshots(&self, directory: &Path) -> Result<Vec<String>> {
        let state = self.state.lock();
        match state.directories.get(directory) {
            Some(snapshots) => Ok(snapshots.iter().cloned().collect()),
            None => bail!("\'{}\' does not exist", directory.display()),
        }
    }
}
