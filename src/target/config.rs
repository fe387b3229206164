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

//! Targets from an INI configuration file.
//!
//! Every section is a target named after the section:
//!
//! ```ini
//! [DEFAULT]
//! destinationdirectory = /snapshots
//! keep = 10
//!
//! [home]
//! source = /home
//! days = 30
//!
//! [www]
//! sourcedirectory = /srv
//! destination = .snapshots
//! relative = yes
//! prefix = www-
//! ```
//!
//! `[home]` snapshots `/home` into `/snapshots/home`. `[www]` snapshots
//! `/srv/www` into `/srv/www/.snapshots`. Keys in `[DEFAULT]` apply to every
//! section that does not set them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ini::{Ini, Properties};

use super::{Overrides, SnapshotTarget, TargetEntry};
use crate::global::defaults::{CONFIG_DEFAULT_SECTION, DEFAULT_DAYS, DEFAULT_KEEP};

/// Reads the targets of a configuration file.
///
/// Fails only if the file cannot be read or parsed. A section that does not
/// describe a valid target is returned as an entry with an error.
pub fn load_targets(path: &Path, overrides: &Overrides) -> Result<Vec<TargetEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config file \'{}\'", path.display()))?;
    parse_targets(&contents, overrides)
        .with_context(|| format!("Invalid config file \'{}\'", path.display()))
}

pub fn parse_targets(contents: &str, overrides: &Overrides) -> Result<Vec<TargetEntry>> {
    let ini = Ini::load_from_str(contents)?;

    let mut fallbacks: Vec<&Properties> = Vec::new();
    if let Some(defaults) = ini.section(Some(CONFIG_DEFAULT_SECTION)) {
        fallbacks.push(defaults);
    }
    if let Some(general) = ini.section(None::<String>) {
        fallbacks.push(general);
    }

    let entries = ini
        .iter()
        .filter_map(|(name, properties)| match name {
            Some(name) if name != CONFIG_DEFAULT_SECTION => Some((name, properties)),
            _ => None,
        })
        .map(|(name, properties)| {
            let section = Section {
                name,
                properties,
                fallbacks: &fallbacks,
            };
            TargetEntry {
                name: name.to_string(),
                target: section.target(overrides),
            }
        })
        .collect();

    Ok(entries)
}

/// A section with the values it inherits.
struct Section<'a> {
    name: &'a str,
    properties: &'a Properties,
    fallbacks: &'a [&'a Properties],
}

impl<'a> Section<'a> {
    /// Looks up a key, ignoring case, in the section and then in the fallbacks.
    fn get(&self, key: &str) -> Option<&'a str> {
        std::iter::once(self.properties)
            .chain(self.fallbacks.iter().copied())
            .find_map(|properties| {
                properties
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v.trim())
            })
    }

    /// Looks up a path. Empty values count as missing.
    fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    /// A path given directly by `key`, or the section name inside the
    /// directory given by `directory_key`.
    fn resolve_path(&self, key: &str, directory_key: &str) -> Result<PathBuf> {
        if let Some(path) = self.get_path(key) {
            return Ok(path);
        }
        match self.get_path(directory_key) {
            Some(directory) => Ok(directory.join(self.name)),
            None => bail!(
                "Section [{}] needs \'{}\' or \'{}\'",
                self.name,
                key,
                directory_key
            ),
        }
    }

    fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.parse::<i64>().with_context(|| {
                format!(
                    "Section [{}]: \'{}\' is not a valid value for \'{}\'",
                    self.name, value, key
                )
            }),
        }
    }

    fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "yes" | "true" | "on" => Ok(true),
                "0" | "no" | "false" | "off" => Ok(false),
                _ => bail!(
                    "Section [{}]: \'{}\' is not a valid value for \'{}\'",
                    self.name,
                    value,
                    key
                ),
            },
        }
    }

    fn target(&self, overrides: &Overrides) -> Result<SnapshotTarget> {
        let source = self.resolve_path("source", "sourcedirectory")?;
        let mut destination = self.resolve_path("destination", "destinationdirectory")?;

        if self.get_bool("relative")? && destination.is_relative() {
            destination = source.join(destination);
        }

        let prefix = match &overrides.prefix {
            Some(prefix) => prefix.clone(),
            None => self.get("prefix").unwrap_or_default().to_string(),
        };
        let keep = match overrides.keep {
            Some(keep) => keep,
            None => self.get_int("keep", DEFAULT_KEEP)?,
        };
        let days = match overrides.days {
            Some(days) => days,
            None => self.get_int("days", DEFAULT_DAYS)?,
        };

        Ok(SnapshotTarget {
            source,
            destination,
            prefix,
            keep,
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    const CONFIG: &str = "\
[DEFAULT]
destinationdirectory = /snapshots
keep = 10

[home]
source = /home
days = 30

[www]
sourcedirectory = /srv
destination = .snapshots
relative = yes
prefix = www-

[root]
Source = /
Destination = /snapshots/root
Keep = 3
";

    fn target(entries: &[TargetEntry], name: &str) -> SnapshotTarget {
        entries
            .iter()
            .find(|e| e.name == name)
            .unwrap()
            .target
            .as_ref()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_parse_targets() -> Result<()> {
        let entries = parse_targets(CONFIG, &Overrides::default())?;
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["home", "www", "root"]);

        assert_eq!(
            target(&entries, "home"),
            SnapshotTarget {
                source: PathBuf::from("/home"),
                destination: PathBuf::from("/snapshots/home"),
                prefix: String::new(),
                keep: 10,
                days: 30,
            }
        );
        assert_eq!(
            target(&entries, "www"),
            SnapshotTarget {
                source: PathBuf::from("/srv/www"),
                destination: PathBuf::from("/srv/www/.snapshots"),
                prefix: "www-".to_string(),
                keep: 10,
                days: DEFAULT_DAYS,
            }
        );
        assert_eq!(
            target(&entries, "root"),
            SnapshotTarget {
                source: PathBuf::from("/"),
                destination: PathBuf::from("/snapshots/root"),
                prefix: String::new(),
                keep: 3,
                days: DEFAULT_DAYS,
            }
        );
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let overrides = Overrides {
            prefix: None,
            keep: Some(1),
            days: Some(7),
        };
        let entries = parse_targets(CONFIG, &overrides)?;

        for entry in &entries {
            let target = entry.target.as_ref().unwrap();
            assert_eq!(target.keep, 1);
            assert_eq!(target.days, 7);
        }
        assert_eq!(target(&entries, "www").prefix, "www-");
        Ok(())
    }

    #[test]
    fn test_bad_sections_do_not_hide_good_ones() -> Result<()> {
        let config = "\
[nosource]
destination = /snapshots/a

[badkeep]
source = /b
destination = /snapshots/b
keep = many

[badrelative]
source = /c
destination = snaps
relative = perhaps

[good]
source = /d
destination = /snapshots/d
";
        let entries = parse_targets(config, &Overrides::default())?;
        assert_eq!(entries.len(), 4);
        assert!(entries[0].target.is_err());
        assert!(entries[1].target.is_err());
        assert!(entries[2].target.is_err());
        assert_eq!(target(&entries, "good").source, PathBuf::from("/d"));

        let err = entries[0].target.as_ref().unwrap_err();
        assert!(err.to_string().contains("nosource"));
        Ok(())
    }

    #[test]
    fn test_relative_is_off_by_default() -> Result<()> {
        let config = "\
[data]
source = /data
destination = snaps
";
        let entries = parse_targets(config, &Overrides::default())?;
        assert_eq!(target(&entries, "data").destination, PathBuf::from("snaps"));
        Ok(())
    }

    #[test]
    fn test_load_targets() -> Result<()> {
        let tmp_dir = tempdir()?;
        let config_path = tmp_dir.path().join("snaprot.ini");
        std::fs::write(&config_path, CONFIG)?;

        let entries = load_targets(&config_path, &Overrides::default())?;
        assert_eq!(entries.len(), 3);

        assert!(load_targets(&tmp_dir.path().join("missing.ini"), &Overrides::default()).is_err());
        Ok(())
    }
}
