//! Column selections (projection pushdown).
//!
//! One flag per logical field; an unselected field is never decoded from storage.
//! Every select also parses from a comma-separated column list, e.g.
//! `"ts,ask_px,bid_px".parse::<TopSelect>()`. Tokens are matched case- and
//! punctuation-insensitively and unknown tokens are ignored.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

fn tokens(csv: &str) -> impl Iterator<Item = String> + '_ {
    csv.split(',').filter_map(|t| {
        let k: String = t
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        (!k.is_empty()).then_some(k)
    })
}

/// Top-of-book columns. The sampled min/max extras are only present in sampled files
/// and are off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSelect {
    pub ts: bool,
    pub ask_px: bool,
    pub ask_qty: bool,
    pub bid_px: bool,
    pub bid_qty: bool,
    pub valu: bool,

    pub min_bid_px: bool,
    pub max_bid_px: bool,
    pub min_ask_px: bool,
    pub max_ask_px: bool,
    pub min_bid_ts: bool,
    pub max_bid_ts: bool,
    pub min_ask_ts: bool,
    pub max_ask_ts: bool,
}

impl Default for TopSelect {
    fn default() -> Self {
        Self {
            ts: true,
            ask_px: true,
            ask_qty: true,
            bid_px: true,
            bid_qty: true,
            valu: true,
            ..Self::none()
        }
    }
}

impl TopSelect {
    pub const fn none() -> Self {
        Self {
            ts: false,
            ask_px: false,
            ask_qty: false,
            bid_px: false,
            bid_qty: false,
            valu: false,
            min_bid_px: false,
            max_bid_px: false,
            min_ask_px: false,
            max_ask_px: false,
            min_bid_ts: false,
            max_bid_ts: false,
            min_ask_ts: false,
            max_ask_ts: false,
        }
    }

    /// This selection plus every sampled extra.
    pub fn with_sampled_extras(self) -> Self {
        Self {
            min_bid_px: true,
            max_bid_px: true,
            min_ask_px: true,
            max_ask_px: true,
            min_bid_ts: true,
            max_bid_ts: true,
            min_ask_ts: true,
            max_ask_ts: true,
            ..self
        }
    }
}

impl FromStr for TopSelect {
    type Err = Infallible;

    fn from_str(csv: &str) -> Result<Self, Self::Err> {
        let mut sel = Self::none();
        for k in tokens(csv) {
            match k.as_str() {
                "ts" | "time" => sel.ts = true,
                "askpx" | "px" | "ask" | "askprice" => sel.ask_px = true,
                "askqty" | "qty" | "asksize" => sel.ask_qty = true,
                "bidpx" | "bid" | "bidprice" => sel.bid_px = true,
                "bidqty" | "bidsize" => sel.bid_qty = true,
                "valu" | "value" | "vol" | "volume" => sel.valu = true,
                "minbidpx" => sel.min_bid_px = true,
                "maxbidpx" => sel.max_bid_px = true,
                "minaskpx" => sel.min_ask_px = true,
                "maxaskpx" => sel.max_ask_px = true,
                "minbidts" => sel.min_bid_ts = true,
                "maxbidts" => sel.max_bid_ts = true,
                "minaskts" => sel.min_ask_ts = true,
                "maxaskts" => sel.max_ask_ts = true,
                _ => {}
            }
        }
        Ok(sel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSelect {
    pub ts: bool,
    pub px: bool,
    pub qty: bool,
    pub trade_id: bool,
    pub buyer_order_id: bool,
    pub seller_order_id: bool,
    pub trade_time: bool,
    pub is_market: bool,
    pub event_time: bool,
}

impl Default for TradeSelect {
    fn default() -> Self {
        Self {
            ts: true,
            px: true,
            qty: true,
            trade_id: true,
            buyer_order_id: true,
            seller_order_id: true,
            trade_time: true,
            is_market: true,
            event_time: true,
        }
    }
}

impl TradeSelect {
    pub const fn none() -> Self {
        Self {
            ts: false,
            px: false,
            qty: false,
            trade_id: false,
            buyer_order_id: false,
            seller_order_id: false,
            trade_time: false,
            is_market: false,
            event_time: false,
        }
    }
}

impl FromStr for TradeSelect {
    type Err = Infallible;

    fn from_str(csv: &str) -> Result<Self, Self::Err> {
        let mut sel = Self::none();
        for k in tokens(csv) {
            match k.as_str() {
                "ts" | "time" => sel.ts = true,
                "px" | "price" => sel.px = true,
                "qty" | "size" | "quantity" => sel.qty = true,
                "tradeid" | "tid" => sel.trade_id = true,
                "buyerorderid" | "boid" => sel.buyer_order_id = true,
                "sellerorderid" | "soid" => sel.seller_order_id = true,
                "tradetime" | "ttime" => sel.trade_time = true,
                "ismarket" | "market" => sel.is_market = true,
                "eventtime" | "evt" | "event" => sel.event_time = true,
                _ => {}
            }
        }
        Ok(sel)
    }
}

/// Depth-delta columns. The ask/bid flags pick the legs of each repeated
/// price/quantity group; a side with neither leg selected produces no offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSelect {
    pub ts: bool,
    pub first_id: bool,
    pub last_id: bool,
    pub event_time: bool,

    pub ask_px: bool,
    pub ask_qty: bool,
    pub bid_px: bool,
    pub bid_qty: bool,
}

impl Default for DepthSelect {
    fn default() -> Self {
        Self {
            ts: true,
            first_id: true,
            last_id: true,
            event_time: true,
            ask_px: true,
            ask_qty: true,
            bid_px: true,
            bid_qty: true,
        }
    }
}

impl DepthSelect {
    pub const fn none() -> Self {
        Self {
            ts: false,
            first_id: false,
            last_id: false,
            event_time: false,
            ask_px: false,
            ask_qty: false,
            bid_px: false,
            bid_qty: false,
        }
    }

    /// Scalars only: every list leg off.
    pub fn without_lists(self) -> Self {
        Self {
            ask_px: false,
            ask_qty: false,
            bid_px: false,
            bid_qty: false,
            ..self
        }
    }

    #[inline]
    pub fn needs_asks(&self) -> bool {
        self.ask_px || self.ask_qty
    }

    #[inline]
    pub fn needs_bids(&self) -> bool {
        self.bid_px || self.bid_qty
    }
}

impl FromStr for DepthSelect {
    type Err = Infallible;

    fn from_str(csv: &str) -> Result<Self, Self::Err> {
        let mut sel = Self::none();
        for k in tokens(csv) {
            match k.as_str() {
                "ts" | "time" => sel.ts = true,
                "firstid" | "fid" => sel.first_id = true,
                "lastid" | "lid" => sel.last_id = true,
                "eventtime" | "evt" | "event" => sel.event_time = true,
                "askpx" | "px" | "ask" | "askprice" => sel.ask_px = true,
                "askqty" | "qty" | "asksize" => sel.ask_qty = true,
                "bidpx" | "bid" | "bidprice" => sel.bid_px = true,
                "bidqty" | "bidsize" => sel.bid_qty = true,
                _ => {}
            }
        }
        Ok(sel)
    }
}
