//! Zero-copy batch views.
//!
//! A view borrows the reader's internal buffers; it stays valid until the reader is
//! advanced again, which the borrow checker enforces. Unselected fields are `None`.
//! List fields carry an offsets slice of length `n + 1`: row `i` owns the elements
//! `offsets[i]..offsets[i + 1]` of the matching value slices.

#[derive(Debug, Clone, Copy, Default)]
pub struct TopView<'a> {
    pub ts: Option<&'a [i64]>,
    pub ask_px: Option<&'a [i64]>,
    pub ask_qty: Option<&'a [i64]>,
    pub bid_px: Option<&'a [i64]>,
    pub bid_qty: Option<&'a [i64]>,
    pub valu: Option<&'a [i64]>,

    // present when reading sampled files
    pub min_bid_px: Option<&'a [i64]>,
    pub max_bid_px: Option<&'a [i64]>,
    pub min_ask_px: Option<&'a [i64]>,
    pub max_ask_px: Option<&'a [i64]>,
    pub min_bid_ts: Option<&'a [i64]>,
    pub max_bid_ts: Option<&'a [i64]>,
    pub min_ask_ts: Option<&'a [i64]>,
    pub max_ask_ts: Option<&'a [i64]>,

    /// Basename of the file this batch came from.
    pub file: &'a str,
    pub n: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TradeView<'a> {
    pub ts: Option<&'a [i64]>,
    pub px: Option<&'a [i64]>,
    pub qty: Option<&'a [i64]>,
    pub trade_id: Option<&'a [i64]>,
    pub buyer_order_id: Option<&'a [i64]>,
    pub seller_order_id: Option<&'a [i64]>,
    pub trade_time: Option<&'a [i64]>,
    /// 0/1
    pub is_market: Option<&'a [u8]>,
    pub event_time: Option<&'a [i64]>,

    pub file: &'a str,
    pub n: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthView<'a> {
    pub ts: Option<&'a [i64]>,
    pub first_id: Option<&'a [i64]>,
    pub last_id: Option<&'a [i64]>,
    pub event_time: Option<&'a [i64]>,

    pub ask_offsets: Option<&'a [u32]>,
    pub ask_px: Option<&'a [i64]>,
    pub ask_qty: Option<&'a [i64]>,

    pub bid_offsets: Option<&'a [u32]>,
    pub bid_px: Option<&'a [i64]>,
    pub bid_qty: Option<&'a [i64]>,

    pub file: &'a str,
    pub n: usize,
}

impl<'a> DepthView<'a> {
    /// Element range of row `i` in the ask value slices.
    pub fn ask_range(&self, i: usize) -> Option<std::ops::Range<usize>> {
        list_range(self.ask_offsets, i)
    }

    pub fn bid_range(&self, i: usize) -> Option<std::ops::Range<usize>> {
        list_range(self.bid_offsets, i)
    }
}

fn list_range(offsets: Option<&[u32]>, i: usize) -> Option<std::ops::Range<usize>> {
    let off = offsets?;
    let lo = *off.get(i)? as usize;
    let hi = *off.get(i + 1)? as usize;
    Some(lo..hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_ranges_follow_offsets() {
        let offs = [0u32, 2, 2, 3];
        let px = [10i64, 11, 12];
        let v = DepthView {
            ask_offsets: Some(&offs),
            ask_px: Some(&px),
            n: 3,
            ..Default::default()
        };
        assert_eq!(v.ask_range(0), Some(0..2));
        assert_eq!(v.ask_range(1), Some(2..2));
        assert_eq!(v.ask_range(2), Some(2..3));
        assert_eq!(v.ask_range(3), None);
        assert_eq!(v.bid_range(0), None);
    }
}
