//! Shared data contract for the sharded market-data reader.
//!
//! Only plain data lives here: the layout tokens ([`Market`], [`DataKind`], [`Sampling`]),
//! the query window, per-kind column selections and the borrowed batch views handed out
//! by `shard_db`'s batch readers. Nothing in this crate knows about Parquet.

pub mod models;
pub mod select;
pub mod view;

pub use models::{DataKind, Market, ParseMarketError, ParseSamplingError, Sampling, TimeWindow};
pub use select::{DepthSelect, TopSelect, TradeSelect};
pub use view::{DepthView, TopView, TradeView};
