//! Validity windows for catalog rows
//!
//! Stations and site-channels are valid between two calendar dates, with an
//! absent off date meaning the row is still open. Sensors are valid between two
//! epoch-second timestamps, and an open sensor carries the sentinel endtime
//! [`SENSOR_OPEN_END`] instead of a null. The two representations are kept as
//! separate types; a calendar date is compared with a sensor window at UTC
//! midnight of that date.

use crate::constants::{SENSOR_OPEN_END, SENSOR_OPEN_END_THRESHOLD};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Convert a calendar date to epoch seconds at midnight UTC
pub fn date_to_epoch(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

/// Convert epoch seconds to a UTC timestamp, if representable
pub fn epoch_to_datetime(epoch: f64) -> Option<DateTime<Utc>> {
    let secs = epoch.floor();
    let nanos = ((epoch - secs) * 1e9).round() as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

// =============================================================================
// Calendar Date Interval (stations, site-channels)
// =============================================================================

/// Inclusive validity window between two calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    /// First day the row is valid
    pub on_date: NaiveDate,

    /// Last day the row is valid; `None` is unbounded future
    pub off_date: Option<NaiveDate>,
}

impl DateInterval {
    /// Create a closed or open interval, rejecting an off date before the on date
    pub fn new(on_date: NaiveDate, off_date: Option<NaiveDate>) -> Result<Self> {
        if let Some(off) = off_date {
            if off < on_date {
                return Err(Error::data_validation(format!(
                    "Off date {} cannot be before on date {}",
                    off, on_date
                )));
            }
        }
        Ok(Self { on_date, off_date })
    }

    /// Create an interval with no off date
    pub fn open(on_date: NaiveDate) -> Self {
        Self {
            on_date,
            off_date: None,
        }
    }

    /// Check whether the row is valid on `date`
    pub fn contains(&self, date: NaiveDate) -> bool {
        if date < self.on_date {
            return false;
        }
        match self.off_date {
            Some(off) => date <= off,
            None => true,
        }
    }

    /// Whether the interval has no off date
    pub fn is_open_ended(&self) -> bool {
        self.off_date.is_none()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.off_date {
            Some(off) => write!(f, "[{}, {}]", self.on_date, off),
            None => write!(f, "[{}, open]", self.on_date),
        }
    }
}

// =============================================================================
// Epoch Interval (sensors)
// =============================================================================

/// End of a sensor deployment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEnd {
    /// Sentinel endtime, the deployment has no defined end
    Open,
    /// Real closing timestamp in epoch seconds
    Closed(f64),
}

impl SensorEnd {
    /// Decode a stored endtime, recognising the sentinel
    pub fn from_raw(endtime: f64) -> Self {
        if endtime >= SENSOR_OPEN_END_THRESHOLD {
            Self::Open
        } else {
            Self::Closed(endtime)
        }
    }

    /// Encode back to the stored representation
    pub fn to_raw(self) -> f64 {
        match self {
            Self::Open => SENSOR_OPEN_END,
            Self::Closed(endtime) => endtime,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Inclusive sensor deployment window in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochInterval {
    /// Deployment start in epoch seconds
    pub time: f64,

    /// Deployment end
    pub endtime: SensorEnd,
}

impl EpochInterval {
    /// Build an interval from the raw `time`/`endtime` columns
    pub fn from_raw(time: f64, endtime: f64) -> Self {
        Self {
            time,
            endtime: SensorEnd::from_raw(endtime),
        }
    }

    /// Create an interval with the sentinel end
    pub fn open(time: f64) -> Self {
        Self {
            time,
            endtime: SensorEnd::Open,
        }
    }

    /// Check whether the deployment covers the instant `epoch`
    pub fn contains_epoch(&self, epoch: f64) -> bool {
        if epoch < self.time {
            return false;
        }
        match self.endtime {
            SensorEnd::Open => true,
            SensorEnd::Closed(end) => epoch <= end,
        }
    }

    /// Check whether the deployment covers midnight UTC of `date`
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains_epoch(date_to_epoch(date))
    }
}

impl fmt::Display for EpochInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = epoch_to_datetime(self.time)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| format!("{:.3}", self.time));
        match self.endtime {
            SensorEnd::Open => write!(f, "[{}, open]", start),
            SensorEnd::Closed(end) => {
                let end = epoch_to_datetime(end)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| format!("{:.3}", end));
                write!(f, "[{}, {}]", start, end)
            }
        }
    }
}

/// Validity window of any catalog row reached by a relationship hop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validity {
    Dates(DateInterval),
    Epoch(EpochInterval),
}

impl Validity {
    /// Check whether the row is valid on `date`
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Self::Dates(interval) => interval.contains(date),
            Self::Epoch(interval) => interval.contains_date(date),
        }
    }

    /// Apply an optional date filter; no date means every row passes
    pub fn valid_at(&self, at: Option<NaiveDate>) -> bool {
        at.is_none_or(|date| self.contains(date))
    }
}
