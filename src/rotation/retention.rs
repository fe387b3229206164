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

use std::collections::{BTreeSet, HashSet};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};

use crate::{
    global::defaults::{DEFAULT_DAYS, DEFAULT_KEEP},
    utils::timestamp,
};

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Non-digit characters of a generated timestamp.
const TIMESTAMP_CHARS: &str = "-:+TZ";

/// How many snapshots of a rotation group survive.
///
/// Both rules protect snapshots independently: a snapshot is deleted only if
/// it is not among the `keep` most recent ones and it is at least `days` days
/// old. A non-positive `keep` disables the count rule and a negative `days`
/// disables the age rule. With `keep <= 0` and `days <= 0` nothing is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub keep: i64,
    pub days: i64,
}

impl RetentionPolicy {
    pub fn new(keep: i64, days: i64) -> Self {
        Self { keep, days }
    }

    #[inline]
    pub fn keeps_everything(&self) -> bool {
        self.keep <= 0 && self.days <= 0
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP, DEFAULT_DAYS)
    }
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.keeps_everything() {
            return write!(f, "keep all");
        }

        let mut rules = Vec::new();
        if self.keep > 0 {
            rules.push(format!("keep last {}", self.keep));
        }
        if self.days >= 0 {
            rules.push(format!("keep within {} days", self.days));
        }
        write!(f, "{}", rules.join(", "))
    }
}

/// Characters that pin a snapshot. A snapshot whose name contains any of
/// them is never considered for deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedMarkers(BTreeSet<char>);

impl ProtectedMarkers {
    pub fn new(chars: &str) -> Self {
        Self(chars.chars().collect())
    }

    #[inline]
    pub fn is_protected(&self, name: &str) -> bool {
        name.chars().any(|c| self.0.contains(&c))
    }

    /// Markers that can appear in a generated timestamp. With any of these,
    /// every snapshot would be protected.
    pub fn timestamp_conflicts(&self) -> Vec<char> {
        self.0
            .iter()
            .copied()
            .filter(|c| c.is_ascii_digit() || TIMESTAMP_CHARS.contains(*c))
            .collect()
    }
}

impl std::fmt::Display for ProtectedMarkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().collect::<String>())
    }
}

/// Returns the names of the rotation group, oldest first, leaving out the
/// protected ones. Timestamps sort chronologically, so plain string order is
/// chronological order.
pub fn candidates<'a>(
    names: &'a [String],
    prefix: &str,
    markers: &ProtectedMarkers,
) -> Vec<&'a str> {
    let mut candidates: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| name.starts_with(prefix) && !markers.is_protected(name))
        .collect();
    candidates.sort_unstable();
    candidates
}

/// Age of a snapshot in whole days, rounded down.
///
/// A snapshot dated in the future has a negative age.
pub fn snapshot_age_days(name: &str, prefix: &str, now: &DateTime<Utc>) -> Result<i64> {
    let suffix = name
        .strip_prefix(prefix)
        .ok_or_else(|| anyhow!("Snapshot \'{}\' does not start with \'{}\'", name, prefix))?;
    let time = timestamp::parse_timestamp(suffix)
        .with_context(|| format!("Snapshot \'{}\' has an invalid timestamp", name))?;

    let age = *now - time.with_timezone(&Utc);
    Ok(age.num_seconds().div_euclid(SECONDS_PER_DAY))
}

/// Selects the snapshots of a rotation group that the policy lets go.
///
/// The selection is made in two steps. The count rule drops the `keep` most
/// recent candidates. Then the rest is scanned oldest first and the scan stops
/// at the first snapshot younger than `days` days: that snapshot and all the
/// newer ones survive. Only the scanned snapshots need a valid timestamp.
///
/// The selection is returned oldest first.
pub fn select_for_deletion(
    names: &[String],
    prefix: &str,
    policy: &RetentionPolicy,
    markers: &ProtectedMarkers,
    now: &DateTime<Utc>,
) -> Result<Vec<String>> {
    if policy.keeps_everything() {
        return Ok(Vec::new());
    }

    let sorted = candidates(names, prefix, markers);

    let count_eligible = if policy.keep > 0 {
        let keep = usize::try_from(policy.keep).unwrap_or(usize::MAX);
        &sorted[..sorted.len().saturating_sub(keep)]
    } else {
        &sorted[..]
    };

    if policy.days < 0 || count_eligible.is_empty() {
        return Ok(count_eligible.iter().map(|name| name.to_string()).collect());
    }

    let mut end = count_eligible.len();
    for (i, name) in count_eligible.iter().enumerate() {
        if snapshot_age_days(name, prefix, now)? < policy.days {
            end = i;
            break;
        }
    }

    Ok(count_eligible[..end]
        .iter()
        .map(|name| name.to_string())
        .collect())
}

/// What the retention policy decides for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Carries a protected marker.
    Protected,
    Keep,
    Delete,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Protected => write!(f, "protected"),
            Verdict::Keep => write!(f, "keep"),
            Verdict::Delete => write!(f, "delete"),
        }
    }
}

/// Classifies every snapshot of the rotation group, oldest first.
pub fn verdicts(
    names: &[String],
    prefix: &str,
    policy: &RetentionPolicy,
    markers: &ProtectedMarkers,
    now: &DateTime<Utc>,
) -> Result<Vec<(String, Verdict)>> {
    let selection: HashSet<String> = select_for_deletion(names, prefix, policy, markers, now)?
        .into_iter()
        .collect();

    let mut group: Vec<&String> = names.iter().filter(|n| n.starts_with(prefix)).collect();
    group.sort_unstable();

    Ok(group
        .into_iter()
        .map(|name| {
            let verdict = if markers.is_protected(name) {
                Verdict::Protected
            } else if selection.contains(name) {
                Verdict::Delete
            } else {
                Verdict::Keep
            };
            (name.clone(), verdict)
        })
        .collect())
}
