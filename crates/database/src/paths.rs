//! Shard discovery.
//!
//! The physical layout is fixed and part of the storage contract:
//!
//! ```text
//! daily:     <root>/<kind>_<market>/<SYMB>/<Y>/<M>/bn_<kind>_<market>_<SYMB>_<Y>_<M>_<D>.parquet
//! px top:    <root>/top_px_<market>/<SYMB>/bn_top_px_<market>_<SYMB>_<Y>_<M>.parquet
//! ```
//!
//! Month and day are not zero-padded (`2025/9/3`). A day without a file is expected and
//! simply yields no candidate.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use shard_types::{DataKind, Market, TimeWindow};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FILE_PREFIX: &str = "bn";
pub const FILE_EXT: &str = "parquet";
const DAY_NS: i64 = 86_400_000_000_000;

/// One shard that may hold rows for the query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// `[start_ns, end_ns)` covered by the file (a UTC day, or a month for px files).
    pub start_ns: i64,
    pub end_ns: i64,
}

pub(crate) fn iso_from_ns(ns: i64) -> String {
    DateTime::<Utc>::from_timestamp_nanos(ns)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

fn day_of(ns: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_nanos(ns).date_naive()
}

fn day_start_ns(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_nanos_opt()
}

pub fn daily_file_name(kind: DataKind, market: Market, symbol: &str, date: NaiveDate) -> String {
    format!(
        "{FILE_PREFIX}_{kind}_{market}_{symbol}_{}_{}_{}.{FILE_EXT}",
        date.year(),
        date.month(),
        date.day()
    )
}

pub fn daily_file_path(
    root: &Path,
    kind: DataKind,
    market: Market,
    symbol: &str,
    date: NaiveDate,
) -> PathBuf {
    root.join(format!("{kind}_{market}"))
        .join(symbol)
        .join(date.year().to_string())
        .join(date.month().to_string())
        .join(daily_file_name(kind, market, symbol, date))
}

/// Daily shards overlapping `window`, in market-then-date order.
///
/// With `market == None` both markets are searched (`fut` first, then `spot`).
/// Returns nothing for an empty or inverted window.
pub fn candidate_files(
    root: &Path,
    symbol: &str,
    kind: DataKind,
    market: Option<Market>,
    window: TimeWindow,
    debug: bool,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    if window.is_empty() {
        return out;
    }

    let markets: &[Market] = match market {
        Some(ref m) => std::slice::from_ref(m),
        None => &Market::ALL,
    };

    let first = day_of(window.start_ns);
    let last = day_of(window.end_ns - 1);

    for &mkt in markets {
        let mut day = first;
        while day <= last {
            let Some(start_ns) = day_start_ns(day) else {
                break;
            };
            let end_ns = start_ns.saturating_add(DAY_NS);
            let path = daily_file_path(root, kind, mkt, symbol, day);
            let exists = path.is_file();
            if debug {
                debug!(
                    "try: {} [{} .. {}] {}",
                    path.display(),
                    iso_from_ns(start_ns),
                    iso_from_ns(end_ns),
                    if exists { "EXISTS" } else { "missing" }
                );
            }
            if exists {
                out.push(Candidate {
                    path,
                    start_ns,
                    end_ns,
                });
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
    }

    if debug {
        log_candidates(&kind.to_string(), &out);
    }
    out
}

pub fn px_file_name(market: Market, symbol: &str, year: i32, month: u32) -> String {
    format!("{FILE_PREFIX}_top_px_{market}_{symbol}_{year}_{month}.{FILE_EXT}")
}

pub fn px_dir(root: &Path, market: Market, symbol: &str) -> PathBuf {
    root.join(format!("top_px_{market}")).join(symbol)
}

/// Parses `<Y>_<M>` out of a px file name; month may be one or two digits.
fn parse_px_month(name: &str, prefix: &str) -> Option<(i32, u32)> {
    let rest = name.strip_prefix(prefix)?.strip_suffix(".parquet")?;
    let (y, m) = rest.split_once('_')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if y.len() != 4 || !digits(y) || m.len() > 2 || !digits(m) {
        return None;
    }
    let (y, m) = (y.parse().ok()?, m.parse().ok()?);
    NaiveDate::from_ymd_opt(y, m, 1)?;
    Some((y, m))
}

/// Monthly price-sampled top-of-book shards overlapping `window`, ordered by (year, month).
///
/// Unlike the daily layout these are found by listing the symbol directory; a missing
/// directory yields no candidates.
pub fn px_candidate_files(
    root: &Path,
    symbol: &str,
    market: Market,
    window: TimeWindow,
    debug: bool,
) -> Vec<Candidate> {
    if window.is_empty() {
        return Vec::new();
    }
    let dir = px_dir(root, market, symbol);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            if debug {
                debug!("px: cannot list {}: {e}", dir.display());
            }
            return Vec::new();
        }
    };

    let prefix = format!("{FILE_PREFIX}_top_px_{market}_{symbol}_");
    let mut months: Vec<(i32, u32, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(|p| {
            let name = p.file_name()?.to_str()?;
            let (y, m) = parse_px_month(name, &prefix)?;
            Some((y, m, p))
        })
        .collect();
    months.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let out: Vec<Candidate> = months
        .into_iter()
        .filter_map(|(y, m, path)| {
            let first = NaiveDate::from_ymd_opt(y, m, 1)?;
            let next = first.checked_add_months(chrono::Months::new(1))?;
            let start_ns = day_start_ns(first)?;
            let end_ns = day_start_ns(next).unwrap_or(i64::MAX);
            window.overlaps(start_ns, end_ns).then_some(Candidate {
                path,
                start_ns,
                end_ns,
            })
        })
        .collect();

    if debug {
        log_candidates("top_px", &out);
    }
    out
}

fn log_candidates(tag: &str, files: &[Candidate]) {
    debug!("candidates({tag}): {}", files.len());
    for c in files {
        debug!(
            "  - {} [{} .. {})",
            c.path.display(),
            iso_from_ns(c.start_ns),
            iso_from_ns(c.end_ns)
        );
    }
}
