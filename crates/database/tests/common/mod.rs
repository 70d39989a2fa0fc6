#![allow(dead_code)]

use arrow::array::{ArrayRef, BooleanArray, Int64Array, ListArray, StructArray};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, TimeZone, Utc};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use shard_db::paths::{daily_file_path, px_dir, px_file_name};
use shard_types::{DataKind, Market};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;

pub const SEC: i64 = 1_000_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn temp_root() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// UTC midnight of the given day, in ns.
pub fn day_ns(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap()
        .timestamp_nanos_opt()
        .unwrap()
}

pub fn shard_path(
    root: &Path,
    kind: DataKind,
    market: Market,
    symbol: &str,
    y: i32,
    m: u32,
    d: u32,
) -> PathBuf {
    daily_file_path(root, kind, market, symbol, NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn px_path(root: &Path, market: Market, symbol: &str, y: i32, m: u32) -> PathBuf {
    px_dir(root, market, symbol).join(px_file_name(market, symbol, y, m))
}

// ---------- Writers ----------

pub fn write_batch(path: &Path, batch: &RecordBatch, max_row_group: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = File::create(path).unwrap();
    let props = WriterProperties::builder()
        .set_max_row_group_size(max_row_group)
        .build();
    let mut w = ArrowWriter::try_new(file, batch.schema(), Some(props)).unwrap();
    w.write(batch).unwrap();
    w.close().unwrap();
}

fn i64_col(name: &str, v: Vec<i64>) -> (Field, ArrayRef) {
    let array: ArrayRef = Arc::new(Int64Array::from(v));
    (Field::new(name, DataType::Int64, false), array)
}

fn batch(cols: Vec<(Field, ArrayRef)>) -> RecordBatch {
    let (fields, arrays): (Vec<_>, Vec<_>) = cols.into_iter().unzip();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Top rows with columns derived from the row index:
/// `ask_px = 1000 + i`, `ask_qty = 10 + i`, `bid_px = 990 + i`, `bid_qty = 20 + i`,
/// `valu = 7 * i`. Sampled files also carry the min/max extras.
pub fn top_batch(ts: &[i64], sampled: bool) -> RecordBatch {
    top_batch_without(ts, sampled, &[])
}

/// Like [`top_batch`] but leaves out the named columns.
pub fn top_batch_without(ts: &[i64], sampled: bool, skip: &[&str]) -> RecordBatch {
    let idx = |f: fn(i64) -> i64| (0..ts.len() as i64).map(f).collect::<Vec<_>>();
    let mut cols = vec![
        i64_col("ts", ts.to_vec()),
        i64_col("ask_px", idx(|i| 1000 + i)),
        i64_col("ask_qty", idx(|i| 10 + i)),
        i64_col("bid_px", idx(|i| 990 + i)),
        i64_col("bid_qty", idx(|i| 20 + i)),
        i64_col("valu", idx(|i| 7 * i)),
    ];
    if sampled {
        cols.extend([
            i64_col("min_bid_px", idx(|i| 980 + i)),
            i64_col("max_bid_px", idx(|i| 995 + i)),
            i64_col("min_ask_px", idx(|i| 1000 + i)),
            i64_col("max_ask_px", idx(|i| 1010 + i)),
            i64_col("min_bid_ts", ts.to_vec()),
            i64_col("max_bid_ts", ts.to_vec()),
            i64_col("min_ask_ts", ts.to_vec()),
            i64_col("max_ask_ts", ts.to_vec()),
        ]);
    }
    cols.retain(|(f, _)| !skip.contains(&f.name().as_str()));
    batch(cols)
}

/// Top rows with every scalar nullable, as pandas/pyarrow writes them.
/// `ask_qty`, `bid_px`, `bid_qty` and `valu` are all null.
pub fn nullable_top_batch(ts: &[Option<i64>], ask_px: &[Option<i64>]) -> RecordBatch {
    let col = |name: &str, v: Vec<Option<i64>>| {
        let array: ArrayRef = Arc::new(Int64Array::from(v));
        (Field::new(name, DataType::Int64, true), array)
    };
    let nulls = vec![None; ts.len()];
    batch(vec![
        col("ts", ts.to_vec()),
        col("ask_px", ask_px.to_vec()),
        col("ask_qty", nulls.clone()),
        col("bid_px", nulls.clone()),
        col("bid_qty", nulls.clone()),
        col("valu", nulls),
    ])
}

/// Trades with `px = 500 + i`, `qty = 1 + i`, `tradeId = 100 + i`, `buyerOrderId = 200 + i`,
/// `sellerOrderId = 300 + i`, `tradeTime = eventTime = ts` and `isMarket` alternating from true.
pub fn trade_batch(ts: &[i64]) -> RecordBatch {
    let n = ts.len() as i64;
    let idx = |f: fn(i64) -> i64| (0..n).map(f).collect::<Vec<_>>();
    let is_market: BooleanArray = (0..n).map(|i| Some(i % 2 == 0)).collect();
    batch(vec![
        i64_col("ts", ts.to_vec()),
        i64_col("px", idx(|i| 500 + i)),
        i64_col("qty", idx(|i| 1 + i)),
        i64_col("tradeId", idx(|i| 100 + i)),
        i64_col("buyerOrderId", idx(|i| 200 + i)),
        i64_col("sellerOrderId", idx(|i| 300 + i)),
        i64_col("tradeTime", ts.to_vec()),
        (
            Field::new("isMarket", DataType::Boolean, false),
            Arc::new(is_market) as ArrayRef,
        ),
        i64_col("eventTime", ts.to_vec()),
    ])
}

/// One depth row: timestamp plus ask and bid levels as `(px, qty)`.
#[derive(Debug, Clone, Default)]
pub struct DepthRow {
    pub ts: i64,
    pub asks: Vec<(i64, i64)>,
    pub bids: Vec<(i64, i64)>,
}

impl DepthRow {
    pub fn new(ts: i64, asks: &[(i64, i64)], bids: &[(i64, i64)]) -> Self {
        Self {
            ts,
            asks: asks.to_vec(),
            bids: bids.to_vec(),
        }
    }
}

fn level_fields() -> Fields {
    Fields::from(vec![
        Field::new("px", DataType::Int64, false),
        Field::new("qty", DataType::Int64, false),
    ])
}

fn side(name: &str, lists: Vec<&Vec<(i64, i64)>>) -> (Field, ArrayRef) {
    let fields = level_fields();
    let px: Vec<i64> = lists.iter().flat_map(|l| l.iter().map(|(p, _)| *p)).collect();
    let qty: Vec<i64> = lists.iter().flat_map(|l| l.iter().map(|(_, q)| *q)).collect();
    let values = StructArray::new(
        fields.clone(),
        vec![
            Arc::new(Int64Array::from(px)) as ArrayRef,
            Arc::new(Int64Array::from(qty)) as ArrayRef,
        ],
        None,
    );
    let item = Arc::new(Field::new("element", DataType::Struct(fields), false));
    let offsets = OffsetBuffer::from_lengths(lists.iter().map(|l| l.len()));
    let list = ListArray::new(item.clone(), offsets, Arc::new(values), None);
    (Field::new(name, DataType::List(item), true), Arc::new(list) as ArrayRef)
}

/// Depth rows; `firstId = 10 * i`, `lastId = 10 * i + 9`, `eventTime = ts`.
pub fn depth_batch(rows: &[DepthRow]) -> RecordBatch {
    let n = rows.len() as i64;
    batch(vec![
        i64_col("ts", rows.iter().map(|r| r.ts).collect()),
        i64_col("firstId", (0..n).map(|i| 10 * i).collect()),
        i64_col("lastId", (0..n).map(|i| 10 * i + 9).collect()),
        i64_col("eventTime", rows.iter().map(|r| r.ts).collect()),
        side("ask", rows.iter().map(|r| &r.asks).collect()),
        side("bid", rows.iter().map(|r| &r.bids).collect()),
    ])
}

// ---------- Convenience ----------

pub fn write_top_day(
    root: &Path,
    market: Market,
    symbol: &str,
    (y, m, d): (i32, u32, u32),
    ts: &[i64],
) -> PathBuf {
    let path = shard_path(root, DataKind::Top, market, symbol, y, m, d);
    write_batch(&path, &top_batch(ts, false), 1024);
    path
}

pub fn write_trade_day(
    root: &Path,
    market: Market,
    symbol: &str,
    (y, m, d): (i32, u32, u32),
    ts: &[i64],
) -> PathBuf {
    let path = shard_path(root, DataKind::Trade, market, symbol, y, m, d);
    write_batch(&path, &trade_batch(ts), 1024);
    path
}

pub fn write_depth_day(
    root: &Path,
    market: Market,
    symbol: &str,
    (y, m, d): (i32, u32, u32),
    rows: &[DepthRow],
    max_row_group: usize,
) -> PathBuf {
    let path = shard_path(root, DataKind::Depth, market, symbol, y, m, d);
    write_batch(&path, &depth_batch(rows), max_row_group);
    path
}

/// `n` timestamps spaced one second apart, starting at `start`.
pub fn seconds(start: i64, n: usize) -> Vec<i64> {
    (0..n as i64).map(|i| start + i * SEC).collect()
}
