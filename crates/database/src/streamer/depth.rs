//! Depth deltas: scalar header columns plus two repeated `{px, qty}` groups.
//!
//! Lists are flattened per side into one offsets vector (`n + 1` entries, starting at 0)
//! and one value vector per selected leg. A side whose legs are both unselected is not
//! read at all and yields an empty offsets vector.

use super::{pick, scan_ts, BatchBuffers, RowGroupScan, RowGroupStreamer, ShardFile};
use crate::error::Result;
use crate::lists::{append_list, append_list_pairs};
use shard_types::{DataKind, DepthSelect, DepthView, TimeWindow};
use std::path::Path;

pub const FIRST_ID: &str = "firstId";
pub const LAST_ID: &str = "lastId";
pub const EVENT_TIME: &str = "eventTime";

/// Leaf paths of one side of the book.
#[derive(Debug, Clone, Copy)]
pub struct ListSide {
    pub px: &'static str,
    pub qty: &'static str,
}

pub const ASK: ListSide = ListSide {
    px: "ask.list.element.px",
    qty: "ask.list.element.qty",
};
pub const BID: ListSide = ListSide {
    px: "bid.list.element.px",
    qty: "bid.list.element.qty",
};

pub struct DepthStreamer {
    file: ShardFile,
    ts: Vec<i64>,
    scratch: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct DepthBuffers {
    pub(crate) ts: Vec<i64>,
    pub(crate) first_id: Vec<i64>,
    pub(crate) last_id: Vec<i64>,
    pub(crate) event_time: Vec<i64>,

    pub(crate) ask_offsets: Vec<u32>,
    pub(crate) ask_px: Vec<i64>,
    pub(crate) ask_qty: Vec<i64>,

    pub(crate) bid_offsets: Vec<u32>,
    pub(crate) bid_px: Vec<i64>,
    pub(crate) bid_qty: Vec<i64>,
}

impl BatchBuffers for DepthBuffers {
    fn rows(&self) -> usize {
        self.ts.len()
    }
}

impl DepthBuffers {
    pub(crate) fn view<'a>(&'a self, sel: &DepthSelect, file: &'a str) -> DepthView<'a> {
        DepthView {
            ts: pick(sel.ts, &self.ts),
            first_id: pick(sel.first_id, &self.first_id),
            last_id: pick(sel.last_id, &self.last_id),
            event_time: pick(sel.event_time, &self.event_time),
            ask_offsets: pick(sel.needs_asks(), &self.ask_offsets),
            ask_px: pick(sel.ask_px, &self.ask_px),
            ask_qty: pick(sel.ask_qty, &self.ask_qty),
            bid_offsets: pick(sel.needs_bids(), &self.bid_offsets),
            bid_px: pick(sel.bid_px, &self.bid_px),
            bid_qty: pick(sel.bid_qty, &self.bid_qty),
            file,
            n: self.rows(),
        }
    }
}

/// Walk one side's lists row by row, keeping in-window rows only.
///
/// Cursors are consumed up to the last in-window row; the rest of the row group is
/// never decoded.
fn decode_side(
    scan: &RowGroupScan<'_>,
    side: ListSide,
    want_px: bool,
    want_qty: bool,
    offsets: &mut Vec<u32>,
    px_out: &mut Vec<i64>,
    qty_out: &mut Vec<i64>,
) -> Result<()> {
    offsets.clear();
    px_out.clear();
    qty_out.clear();
    if !want_px && !want_qty {
        return Ok(());
    }

    let mut px = if want_px {
        Some(scan.file.cursor_i64(scan.rg, side.px)?)
    } else {
        None
    };
    let mut qty = if want_qty {
        Some(scan.file.cursor_i64(scan.rg, side.qty)?)
    } else {
        None
    };

    offsets.reserve(scan.in_window + 1);
    offsets.push(0);
    let mut total = 0u32;

    for row in 0..scan.end() {
        let keep = scan.keep(row);
        let n = match (px.as_mut(), qty.as_mut()) {
            (Some(p), Some(q)) => append_list_pairs(
                p,
                q,
                keep.then_some(&mut *px_out),
                keep.then_some(&mut *qty_out),
            )?,
            (Some(p), None) => append_list(p, keep.then_some(&mut *px_out))?,
            (None, Some(q)) => append_list(q, keep.then_some(&mut *qty_out))?,
            (None, None) => 0,
        };
        if keep {
            total += n;
            offsets.push(total);
        }
    }
    Ok(())
}

impl RowGroupStreamer for DepthStreamer {
    type Select = DepthSelect;
    type Buffers = DepthBuffers;

    const KIND: DataKind = DataKind::Depth;

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
        sel: &DepthSelect,
        out: &mut DepthBuffers,
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
            scan.i64_into(FIRST_ID, sel.first_id, s, &mut out.first_id)?;
            scan.i64_into(LAST_ID, sel.last_id, s, &mut out.last_id)?;
            scan.i64_into(EVENT_TIME, sel.event_time, s, &mut out.event_time)?;

            decode_side(
                &scan,
                ASK,
                sel.ask_px,
                sel.ask_qty,
                &mut out.ask_offsets,
                &mut out.ask_px,
                &mut out.ask_qty,
            )?;
            decode_side(
                &scan,
                BID,
                sel.bid_px,
                sel.bid_qty,
                &mut out.bid_offsets,
                &mut out.bid_px,
                &mut out.bid_qty,
            )?;
            return Ok(true);
        }
        Ok(false)
    }
}
