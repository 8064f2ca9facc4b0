//! Named comparison periods and their date-range resolution.

use crate::core::error::AppError;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Full previous calendar year vs current year through today.
    Ytd,
    /// Full previous calendar month vs current month through today.
    Mtd,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::Ytd => "YTD",
                Period::Mtd => "MTD",
            }
        )
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "YTD" => Ok(Period::Ytd),
            "MTD" => Ok(Period::Mtd),
            other => Err(AppError::UnsupportedPeriod(other.to_string())),
        }
    }
}

/// A closed date range. `end` may be "now" for the still-open current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    /// Human label for the window: "Jan 2025" for a single month,
    /// "Jan 2026 ~ Aug" within one year, plain "2025" for a full year.
    pub fn label(&self) -> String {
        if self.start.year() == self.end.year() && self.start.month() == self.end.month() {
            self.start.format("%b %Y").to_string()
        } else if self.start.year() == self.end.year() {
            format!("{} ~ {}", self.start.format("%b %Y"), self.end.format("%b"))
        } else {
            self.start.format("%Y").to_string()
        }
    }
}

/// The two windows a comparison runs over: the closed previous period and
/// the current period up to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonWindows {
    pub previous: PeriodWindow,
    pub current: PeriodWindow,
}

/// Resolves a named period into its two comparison windows. Pure function
/// of (period, now).
pub fn resolve_windows(period: Period, now: DateTime<Utc>) -> ComparisonWindows {
    match period {
        Period::Ytd => ComparisonWindows {
            previous: PeriodWindow {
                start: Utc.with_ymd_and_hms(now.year() - 1, 1, 1, 0, 0, 0).unwrap(),
                end: Utc
                    .with_ymd_and_hms(now.year() - 1, 12, 31, 0, 0, 0)
                    .unwrap(),
            },
            current: PeriodWindow {
                start: Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).unwrap(),
                end: now,
            },
        },
        Period::Mtd => {
            let this_month_start = Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .unwrap();
            let prev_month_end = this_month_start - Duration::days(1);
            let prev_month_start = Utc
                .with_ymd_and_hms(prev_month_end.year(), prev_month_end.month(), 1, 0, 0, 0)
                .unwrap();

            ComparisonWindows {
                previous: PeriodWindow {
                    start: prev_month_start,
                    end: prev_month_end,
                },
                current: PeriodWindow {
                    start: this_month_start,
                    end: now,
                },
            }
        }
    }
}
