use super::{pick, scan_ts, BatchBuffers, RowGroupScan, RowGroupStreamer, ShardFile};
use crate::error::Result;
use shard_types::{DataKind, TimeWindow, TopSelect, TopView};
use std::path::Path;

pub const ASK_PX: &str = "ask_px";
pub const ASK_QTY: &str = "ask_qty";
pub const BID_PX: &str = "bid_px";
pub const BID_QTY: &str = "bid_qty";
pub const VALU: &str = "valu";
pub const MIN_BID_PX: &str = "min_bid_px";
pub const MAX_BID_PX: &str = "max_bid_px";
pub const MIN_ASK_PX: &str = "min_ask_px";
pub const MAX_ASK_PX: &str = "max_ask_px";
pub const MIN_BID_TS: &str = "min_bid_ts";
pub const MAX_BID_TS: &str = "max_bid_ts";
pub const MIN_ASK_TS: &str = "min_ask_ts";
pub const MAX_ASK_TS: &str = "max_ask_ts";

/// Top-of-book snapshots, one row per book update (or per sampling bucket).
pub struct TopStreamer {
    file: ShardFile,
    ts: Vec<i64>,
    scratch: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct TopBuffers {
    pub(crate) ts: Vec<i64>,
    pub(crate) ask_px: Vec<i64>,
    pub(crate) ask_qty: Vec<i64>,
    pub(crate) bid_px: Vec<i64>,
    pub(crate) bid_qty: Vec<i64>,
    pub(crate) valu: Vec<i64>,
    pub(crate) min_bid_px: Vec<i64>,
    pub(crate) max_bid_px: Vec<i64>,
    pub(crate) min_ask_px: Vec<i64>,
    pub(crate) max_ask_px: Vec<i64>,
    pub(crate) min_bid_ts: Vec<i64>,
    pub(crate) max_bid_ts: Vec<i64>,
    pub(crate) min_ask_ts: Vec<i64>,
    pub(crate) max_ask_ts: Vec<i64>,
}

impl BatchBuffers for TopBuffers {
    fn rows(&self) -> usize {
        self.ts.len()
    }
}

impl TopBuffers {
    pub(crate) fn view<'a>(&'a self, sel: &TopSelect, file: &'a str) -> TopView<'a> {
        TopView {
            ts: pick(sel.ts, &self.ts),
            ask_px: pick(sel.ask_px, &self.ask_px),
            ask_qty: pick(sel.ask_qty, &self.ask_qty),
            bid_px: pick(sel.bid_px, &self.bid_px),
            bid_qty: pick(sel.bid_qty, &self.bid_qty),
            valu: pick(sel.valu, &self.valu),
            min_bid_px: pick(sel.min_bid_px, &self.min_bid_px),
            max_bid_px: pick(sel.max_bid_px, &self.max_bid_px),
            min_ask_px: pick(sel.min_ask_px, &self.min_ask_px),
            max_ask_px: pick(sel.max_ask_px, &self.max_ask_px),
            min_bid_ts: pick(sel.min_bid_ts, &self.min_bid_ts),
            max_bid_ts: pick(sel.max_bid_ts, &self.max_bid_ts),
            min_ask_ts: pick(sel.min_ask_ts, &self.min_ask_ts),
            max_ask_ts: pick(sel.max_ask_ts, &self.max_ask_ts),
            file,
            n: self.rows(),
        }
    }
}

impl RowGroupStreamer for TopStreamer {
    type Select = TopSelect;
    type Buffers = TopBuffers;

    const KIND: DataKind = DataKind::Top;

    fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            file: ShardFile::open(path, Self::KIND)?,
            ts: Vec::new(),
            scratch: Vec::new(),
        })
    }

    fn next_row_group(
        &mut self,
        window: TimeWindow,
        sel: &TopSelect,
        out: &mut TopBuffers,
    ) -> Result<bool> {
        while let Some(i) = self.file.advance() {
            let rg = self.file.row_group(i)?;
            let in_window = scan_ts(&self.file, &*rg, window, &mut self.ts)?;
            if in_window == 0 {
                continue;
            }

            let scan = RowGroupScan {
                file: &self.file,
                rg: &*rg,
                rows: self.ts.len(),
                ts: &self.ts,
                window,
                in_window,
            };
            let s = &mut self.scratch;

            scan.copy_ts(&mut out.ts);
            scan.i64_into(ASK_PX, sel.ask_px, s, &mut out.ask_px)?;
            scan.i64_into(ASK_QTY, sel.ask_qty, s, &mut out.ask_qty)?;
            scan.i64_into(BID_PX, sel.bid_px, s, &mut out.bid_px)?;
            scan.i64_into(BID_QTY, sel.bid_qty, s, &mut out.bid_qty)?;
            scan.i64_into(VALU, sel.valu, s, &mut out.valu)?;

            scan.i64_into(MIN_BID_PX, sel.min_bid_px, s, &mut out.min_bid_px)?;
            scan.i64_into(MAX_BID_PX, sel.max_bid_px, s, &mut out.max_bid_px)?;
            scan.i64_into(MIN_ASK_PX, sel.min_ask_px, s, &mut out.min_ask_px)?;
            scan.i64_into(MAX_ASK_PX, sel.max_ask_px, s, &mut out.max_ask_px)?;
            scan.i64_into(MIN_BID_TS, sel.min_bid_ts, s, &mut out.min_bid_ts)?;
            scan.i64_into(MAX_BID_TS, sel.max_bid_ts, s, &mut out.max_bid_ts)?;
            scan.i64_into(MIN_ASK_TS, sel.min_ask_ts, s, &mut out.min_ask_ts)?;
            scan.i64_into(MAX_ASK_TS, sel.max_ask_ts, s, &mut out.max_ask_ts)?;
            return Ok(true);
        }
        Ok(false)
    }
}
