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
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Output, Stdio},
};

use anyhow::{Context, Result, bail};

use super::SnapshotBackend;
use crate::{ui, ui::cli::Console, utils};

/// Drives the `btrfs` command line tool.
///
/// Each operation is a single invocation of the tool. The output of the tool
/// is captured and attached to the error when it fails, unless the console
/// is verbose enough to let the tool write to the terminal directly.
pub struct BtrfsCommand {
    program: PathBuf,
    console: Console,
}

impl BtrfsCommand {
    pub fn new(program: PathBuf, console: Console) -> Self {
        Self { program, console }
    }

    fn create_args(source: &Path, destination: &Path) -> Vec<OsString> {
        vec![
            "subvolume".into(),
            "snapshot".into(),
            "-r".into(),
            source.into(),
            destination.into(),
        ]
    }

    fn delete_args(paths: &[PathBuf]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["subvolume".into(), "delete".into()];
        args.extend(paths.iter().map(OsString::from));
        args
    }

    /// Runs the tool and waits for it to exit.
    fn execute(&self, args: &[OsString]) -> Result<()> {
        let command_line = utils::quote_command(&self.program, args);
        ui::cli::verbose_1!(self.console, "{}", command_line);

        let mut command = Command::new(&self.program);
        command.args(args).stdin(Stdio::null());

        if self.console.passthrough() {
            let status = command
                .status()
                .with_context(|| format!("Could not run \'{}\'", command_line))?;
            if !status.success() {
                bail!("{} failed ({})", command_line, describe_status(&status));
            }
        } else {
            let output = command
                .output()
                .with_context(|| format!("Could not run \'{}\'", command_line))?;
            if !output.status.success() {
                let captured = captured_output(&output);
                if captured.is_empty() {
                    bail!("{} failed ({})", command_line, describe_status(&output.status));
                }
                bail!(
                    "{} failed ({}): {}",
                    command_line,
                    describe_status(&output.status),
                    captured
                );
            }
        }

        Ok(())
    }
}

impl SnapshotBackend for BtrfsCommand {
    fn create_snapshot(&self, source: &Path, destination: &Path) -> Result<()> {
        self.execute(&Self::create_args(source, destination))
    }

    fn delete_snapshots(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            bail!("No snapshots to delete");
        }
        self.execute(&Self::delete_args(paths))
    }

    fn list_snapshots(&self, directory: &Path) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(directory)
            .with_context(|| format!("Could not list \'{}\'", directory.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Could not list \'{}\'", directory.display()))?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => ui::cli::warning!(
                    self.console,
                    "Ignoring non UTF-8 entry {:?} in {}",
                    name,
                    directory.display()
                ),
            }
        }

        names.sort();
        Ok(names)
    }
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

/// Joins what the tool wrote to stdout and stderr.
fn captured_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    [stdout.trim_end(), stderr.trim_end()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<&str>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_create_args() {
        let args = BtrfsCommand::create_args(Path::new("/home"), Path::new("/snap/home/h-1"));
        assert_eq!(
            args,
            vec!["subvolume", "snapshot", "-r", "/home", "/snap/home/h-1"]
        );
    }

    #[test]
    fn test_delete_args() {
        let paths = vec![PathBuf::from("/snap/a"), PathBuf::from("/snap/b")];
        let args = BtrfsCommand::delete_args(&paths);
        assert_eq!(args, vec!["subvolume", "delete", "/snap/a", "/snap/b"]);
    }

    #[test]
    fn test_delete_nothing_is_an_error() {
        let btrfs = BtrfsCommand::new(PathBuf::from("true"), Console::quiet());
        assert!(btrfs.delete_snapshots(&[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_checked() {
        let ok = BtrfsCommand::new(PathBuf::from("true"), Console::quiet());
        assert!(
            ok.create_snapshot(Path::new("/src"), Path::new("/dst"))
                .is_ok()
        );

        let failing = BtrfsCommand::new(PathBuf::from("false"), Console::quiet());
        let err = failing
            .create_snapshot(Path::new("/src"), Path::new("/dst"))
            .unwrap_err();
        assert!(err.to_string().contains("failed (1)"));
    }

    #[test]
    fn test_missing_program() {
        let btrfs = BtrfsCommand::new(
            PathBuf::from("/nonexistent/snaprot-btrfs"),
            Console::quiet(),
        );
        assert!(
            btrfs
                .create_snapshot(Path::new("/src"), Path::new("/dst"))
                .is_err()
        );
    }

    #[test]
    fn test_list_snapshots() -> Result<()> {
        let tmp_dir = tempdir()?;
        std::fs::create_dir(tmp_dir.path().join("home-2024-02-01T00:00:00+00:00"))?;
        std::fs::create_dir(tmp_dir.path().join("home-2024-01-01T00:00:00+00:00"))?;

        let btrfs = BtrfsCommand::new(PathBuf::from("btrfs"), Console::quiet());
        let names = btrfs.list_snapshots(tmp_dir.path())?;
        assert_eq!(
            names,
            vec![
                "home-2024-01-01T00:00:00+00:00",
                "home-2024-02-01T00:00:00+00:00"
            ]
        );

        assert!(btrfs.list_snapshots(&tmp_dir.path().join("missing")).is_err());
        Ok(())
    }
}
