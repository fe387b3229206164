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

pub mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{
    global::defaults::{DEFAULT_DAYS, DEFAULT_KEEP},
    rotation::retention::RetentionPolicy,
};

/// A source subvolume and the directory where its snapshots are rotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub prefix: String,
    pub keep: i64,
    pub days: i64,
}

impl SnapshotTarget {
    #[inline]
    pub fn policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.keep, self.days)
    }

    /// Name of the snapshot taken at `timestamp`.
    #[inline]
    pub fn snapshot_name(&self, timestamp: &str) -> String {
        format!("{}{}", self.prefix, timestamp)
    }

    /// Full path of a snapshot in the destination directory.
    #[inline]
    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.destination.join(name)
    }
}

/// A resolved target, or the reason why it could not be resolved.
#[derive(Debug)]
pub struct TargetEntry {
    pub name: String,
    pub target: Result<SnapshotTarget>,
}

/// Values given on the command line. They take precedence over the ones in
/// the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub keep: Option<i64>,
    pub days: Option<i64>,
}

impl Overrides {
    fn target(&self, source: PathBuf, destination: PathBuf) -> SnapshotTarget {
        SnapshotTarget {
            source,
            destination,
            prefix: self.prefix.clone().unwrap_or_default(),
            keep: self.keep.unwrap_or(DEFAULT_KEEP),
            days: self.days.unwrap_or(DEFAULT_DAYS),
        }
    }
}

/// A single `SOURCE DESTINATION` pair from the command line.
pub fn from_pair(source: &Path, destination: &Path, overrides: &Overrides) -> TargetEntry {
    TargetEntry {
        name: source.display().to_string(),
        target: Ok(overrides.target(source.to_path_buf(), destination.to_path_buf())),
    }
}

/// One target per subdirectory of each source. The snapshots of
/// `source/dir` go to `destination/dir`.
pub fn from_directories(
    sources: &[PathBuf],
    destination: &Path,
    overrides: &Overrides,
) -> Vec<TargetEntry> {
    let mut entries = Vec::new();

    for source in sources {
        match list_subdirectories(source) {
            Ok(subdirs) => {
                for subdir in subdirs {
                    let subdir_source = source.join(&subdir);
                    entries.push(TargetEntry {
                        name: subdir_source.display().to_string(),
                        target: Ok(overrides.target(subdir_source, destination.join(&subdir))),
                    });
                }
            }
            Err(e) => entries.push(TargetEntry {
                name: source.display().to_string(),
                target: Err(e),
            }),
        }
    }

    entries
}

fn list_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Could not list \'{}\'", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Could not list \'{}\'", dir.display()))?;
        if entry.path().is_dir() {
            subdirs.push(PathBuf::from(entry.file_name()));
        }
    }

    subdirs.sort();
    Ok(subdirs)
}
