// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and month windows.

use chrono::{DateTime, Datelike, Local, SecondsFormat, Utc};
use std::str::FromStr;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// How an activity log's creation month is compared with "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthMatch {
    /// Month number only. Logs from the same month of earlier years match.
    #[default]
    MonthOfYear,
    /// Year and month must both match.
    Calendar,
}

impl FromStr for MonthMatch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month-of-year" => Ok(MonthMatch::MonthOfYear),
            "calendar" => Ok(MonthMatch::Calendar),
            _ => Err(()),
        }
    }
}

/// The month a monthly leaderboard covers, in server-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// `None` when matching by month number only.
    pub year: Option<i32>,
    /// 1-12
    pub month: u32,
}

impl MonthWindow {
    /// Window containing `now` under the given matching mode.
    pub fn containing(now: DateTime<Local>, mode: MonthMatch) -> Self {
        let year = match mode {
            MonthMatch::MonthOfYear => None,
            MonthMatch::Calendar => Some(now.year()),
        };
        Self {
            year,
            month: now.month(),
        }
    }

    /// Whether a (year, month) pair falls in this window.
    pub fn contains(&self, year: i32, month: u32) -> bool {
        month == self.month && self.year.is_none_or(|y| y == year)
    }
}

/// Server-local (year, month) of a UTC instant.
pub fn local_year_month(at: DateTime<Utc>) -> (i32, u32) {
    let local = at.with_timezone(&Local);
    (local.year(), local.month())
}
