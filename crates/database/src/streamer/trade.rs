use super::{pick, scan_ts, BatchBuffers, RowGroupScan, RowGroupStreamer, ShardFile};
use crate::error::Result;
use shard_types::{DataKind, TimeWindow, TradeSelect, TradeView};
use std::path::Path;

pub const PX: &str = "px";
pub const QTY: &str = "qty";
pub const TRADE_ID: &str = "tradeId";
pub const BUYER_ORDER_ID: &str = "buyerOrderId";
pub const SELLER_ORDER_ID: &str = "sellerOrderId";
pub const TRADE_TIME: &str = "tradeTime";
pub const IS_MARKET: &str = "isMarket";
pub const EVENT_TIME: &str = "eventTime";

/// Executed trades.
pub struct TradeStreamer {
    file: ShardFile,
    ts: Vec<i64>,
    scratch: Vec<i64>,
    scratch_bool: Vec<bool>,
}

#[derive(Debug, Default)]
pub struct TradeBuffers {
    pub(crate) ts: Vec<i64>,
    pub(crate) px: Vec<i64>,
    pub(crate) qty: Vec<i64>,
    pub(crate) trade_id: Vec<i64>,
    pub(crate) buyer_order_id: Vec<i64>,
    pub(crate) seller_order_id: Vec<i64>,
    pub(crate) trade_time: Vec<i64>,
    pub(crate) is_market: Vec<u8>,
    pub(crate) event_time: Vec<i64>,
}

impl BatchBuffers for TradeBuffers {
    fn rows(&self) -> usize {
        self.ts.len()
    }
}

impl TradeBuffers {
    pub(crate) fn view<'a>(&'a self, sel: &TradeSelect, file: &'a str) -> TradeView<'a> {
        TradeView {
            ts: pick(sel.ts, &self.ts),
            px: pick(sel.px, &self.px),
            qty: pick(sel.qty, &self.qty),
            trade_id: pick(sel.trade_id, &self.trade_id),
            buyer_order_id: pick(sel.buyer_order_id, &self.buyer_order_id),
            seller_order_id: pick(sel.seller_order_id, &self.seller_order_id),
            trade_time: pick(sel.trade_time, &self.trade_time),
            is_market: pick(sel.is_market, &self.is_market),
            event_time: pick(sel.event_time, &self.event_time),
            file,
            n: self.rows(),
        }
    }
}

impl RowGroupStreamer for TradeStreamer {
    type Select = TradeSelect;
    type Buffers = TradeBuffers;

    const KIND: DataKind = DataKind::Trade;

    fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            file: ShardFile::open(path, Self::KIND)?,
            ts: Vec::new(),
            scratch: Vec::new(),
            scratch_bool: Vec::new(),
        })
    }

    fn next_row_group(
        &mut self,
        window: TimeWindow,
        sel: &TradeSelect,
        out: &mut TradeBuffers,
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
            scan.i64_into(PX, sel.px, s, &mut out.px)?;
            scan.i64_into(QTY, sel.qty, s, &mut out.qty)?;
            scan.i64_into(TRADE_ID, sel.trade_id, s, &mut out.trade_id)?;
            scan.i64_into(BUYER_ORDER_ID, sel.buyer_order_id, s, &mut out.buyer_order_id)?;
            scan.i64_into(SELLER_ORDER_ID, sel.seller_order_id, s, &mut out.seller_order_id)?;
            scan.i64_into(TRADE_TIME, sel.trade_time, s, &mut out.trade_time)?;
            scan.bool_into(IS_MARKET, sel.is_market, &mut self.scratch_bool, &mut out.is_market)?;
            scan.i64_into(EVENT_TIME, sel.event_time, s, &mut out.event_time)?;
            return Ok(true);
        }
        Ok(false)
    }
}
