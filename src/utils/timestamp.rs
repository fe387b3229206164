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

//! Snapshot name timestamps.
//!
//! A run uses a single timestamp for every snapshot it creates, so all the
//! snapshots of one pass share the same name suffix. The format is RFC 3339
//! with whole seconds and a numeric offset, e.g. `2024-03-15T10:20:30+01:00`.
//! With a fixed offset these strings sort chronologically.

use anyhow::{Result, bail};
use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};

use crate::global::UsageError;

/// Formats of timestamps accepted in snapshot names that carry an offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"];

/// Formats without offset. These are read as local time.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Returns the timestamp for the snapshots created in this run.
///
/// chrono falls back to UTC when the local timezone cannot be determined.
pub fn run_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Like `run_timestamp`, in UTC. Names keep their order across daylight
/// saving changes.
pub fn utc_run_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Formats an instant as a snapshot name suffix.
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parses a snapshot name suffix back into an instant.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(s) {
        return Ok(time);
    }

    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(s, format) {
            return Ok(time);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_to_fixed(&naive, s);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        return local_to_fixed(&naive, s);
    }

    bail!("Invalid timestamp \'{}\'", s)
}

fn local_to_fixed(naive: &NaiveDateTime, s: &str) -> Result<DateTime<FixedOffset>> {
    match Local.from_local_datetime(naive).earliest() {
        Some(time) => Ok(time.fixed_offset()),
        None => bail!("Timestamp \'{}\' does not exist in the local timezone", s),
    }
}

/// Validates a user supplied `--timestamp` and returns it in the canonical
/// form, so that it sorts among the names written by other runs.
pub fn parse_timestamp_override(s: &str) -> Result<String> {
    if s.is_empty() || s.contains(std::path::is_separator) {
        return Err(UsageError(format!(
            "Timestamp \'{}\' cannot be used in a snapshot name",
            s
        ))
        .into());
    }

    match parse_timestamp(s) {
        Ok(time) => Ok(format_timestamp(&time)),
        Err(e) => Err(UsageError(e.to_string()).into()),
    }
}
