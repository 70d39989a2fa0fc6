//! Sharded market-data reader
//!
//! Read-only columnar access to market data stored as one Parquet file per UTC day per
//! symbol, for three record kinds: top-of-book snapshots, trades and depth deltas.
//! Readers stream across day and file boundaries, decode nested list columns row by row
//! without materialising whole columns, and skip shards that fail to open or decode
//! instead of aborting the scan.
//!
//! Layout overview (see `paths`):
//! `<root>/<kind>_<market>/<SYMB>/<Y>/<M>/bn_<kind>_<market>_<SYMB>_<Y>_<M>_<D>.parquet`
//!
//! Key modules:
//! - `paths`: Deterministic file naming and candidate discovery (daily and monthly px layouts).
//! - `cursor`: Pull cursor over one leaf column's definition/repetition levels and values.
//! - `lists`: Row-wise reconstruction of repeated columns into offsets plus flat values.
//! - `streamer`: Per-kind row-group decoders with window filtering and projection pushdown.
//! - `reader`: Multi-file batch readers and the skip-and-continue policy.
//! - `db`: The `ShardedDb` facade.
//! - `config`: Reader options, including loading from the environment.
//!
//! ```no_run
//! use shard_db::{ShardedDb, ShardedDbConfig};
//! use shard_types::{DepthSelect, Market, TimeWindow};
//!
//! let db = ShardedDb::new(ShardedDbConfig::from_env()?);
//! let window = TimeWindow::new(1_735_689_600_000_000_000, 1_735_776_000_000_000_000);
//! let mut reader = db.depth_cols(window, "BTCUSDT", Some(Market::Spot), DepthSelect::default())?;
//! while let Some(batch) = reader.next_batch() {
//!     println!("{}: {} rows", batch.file, batch.n);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod cursor;
pub mod db;
pub mod error;
pub mod lists;
pub mod paths;
pub mod prefetch;
pub mod reader;
pub mod streamer;

pub use config::ShardedDbConfig;
pub use db::ShardedDb;
pub use error::{Result, ShardError};
pub use paths::Candidate;
pub use reader::{BatchReader, DepthBatchReader, SkippedFile, TopBatchReader, TradeBatchReader};
