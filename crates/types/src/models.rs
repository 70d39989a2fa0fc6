use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;
use thiserror::Error;

/// Venue market segment. Part of the on-disk layout (`<kind>_<market>` directories),
/// so the lowercase rendering is a storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Perpetual / dated futures.
    Fut,
    /// Spot.
    Spot,
}

impl Market {
    /// Search order used when no market is specified.
    pub const ALL: [Market; 2] = [Market::Fut, Market::Spot];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("market must be 'fut' or 'spot', got '{0}'")]
pub struct ParseMarketError(pub String);

impl FromStr for Market {
    type Err = ParseMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fut" | "future" | "futures" => Ok(Market::Fut),
            "spot" => Ok(Market::Spot),
            _ => Err(ParseMarketError(s.to_string())),
        }
    }
}

/// What's stored (determines folder layout + schema columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Top-of-book snapshots. One file per **day**.
    Top,
    /// Executed trades. One file per **day**.
    Trade,
    /// Order-book depth deltas with ask/bid level lists. One file per **day**.
    Depth,
}

/// Sampling hint carried by the dataset configuration.
///
/// - [`Sampling::Px`] – price-change sampled top-of-book, stored in monthly files.
/// - [`Sampling::Ms100`], [`Sampling::S1`], [`Sampling::S60`] – time-sampled variants;
///   they share the daily layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Sampling {
    #[strum(serialize = "px")]
    #[serde(rename = "px")]
    Px,
    #[strum(serialize = "100ms")]
    #[serde(rename = "100ms")]
    Ms100,
    #[strum(serialize = "1s")]
    #[serde(rename = "1s")]
    S1,
    #[strum(serialize = "60s")]
    #[serde(rename = "60s")]
    S60,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sampling must be px, 100ms, 1s, or 60s, got '{0}'")]
pub struct ParseSamplingError(pub String);

impl FromStr for Sampling {
    type Err = ParseSamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" => Ok(Sampling::Px),
            "100ms" => Ok(Sampling::Ms100),
            "1s" => Ok(Sampling::S1),
            "60s" => Ok(Sampling::S60),
            _ => Err(ParseSamplingError(s.to_string())),
        }
    }
}

/// Half-open `[start_ns, end_ns)` window in UTC nanoseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_ns: i64,
    pub end_ns: i64,
}

impl TimeWindow {
    #[inline]
    pub fn new(start_ns: i64, end_ns: i64) -> Self {
        Self { start_ns, end_ns }
    }

    /// Window covering `[start, end)`; instants outside the i64 nanosecond range saturate.
    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let to_ns = |dt: DateTime<Utc>| {
            dt.timestamp_nanos_opt().unwrap_or(if dt.timestamp() < 0 {
                i64::MIN
            } else {
                i64::MAX
            })
        };
        Self::new(to_ns(start), to_ns(end))
    }

    #[inline]
    pub fn contains(&self, ts_ns: i64) -> bool {
        ts_ns >= self.start_ns && ts_ns < self.end_ns
    }

    /// True for empty and inverted windows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_ns >= self.end_ns
    }

    #[inline]
    pub fn overlaps(&self, start_ns: i64, end_ns: i64) -> bool {
        start_ns < self.end_ns && self.start_ns < end_ns
    }
}
