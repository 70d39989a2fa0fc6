use crate::config::ShardedDbConfig;
use crate::error::{Result, ShardError};
use crate::paths::{candidate_files, px_candidate_files, Candidate};
use crate::reader::{BatchReader, DepthBatchReader, TopBatchReader, TradeBatchReader};
use crate::streamer::RowGroupStreamer;
use shard_types::{DataKind, DepthSelect, Market, Sampling, TimeWindow, TopSelect, TradeSelect};
use std::path::Path;
use tracing::debug;

/// Entry point: a root directory of shards plus fixed read options.
///
/// Cheap to construct and holds no open files; every `*_cols` call discovers its own
/// candidates and returns an independent reader.
#[derive(Debug, Clone)]
pub struct ShardedDb {
    config: ShardedDbConfig,
}

impl ShardedDb {
    pub fn new(config: ShardedDbConfig) -> Self {
        Self { config }
    }

    /// Default options over `root`.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self::new(ShardedDbConfig::new(root.as_ref()))
    }

    pub fn config(&self) -> &ShardedDbConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    fn reader<S: RowGroupStreamer>(
        &self,
        files: Vec<Candidate>,
        window: TimeWindow,
        select: S::Select,
    ) -> BatchReader<S> {
        BatchReader::new(
            files,
            window,
            select,
            self.config.prefetch,
            self.config.debug,
        )
    }

    fn daily(
        &self,
        kind: DataKind,
        window: TimeWindow,
        symbol: &str,
        market: Option<Market>,
    ) -> Vec<Candidate> {
        candidate_files(
            &self.config.root,
            symbol,
            kind,
            market,
            window,
            self.config.debug,
        )
    }

    /// Top-of-book columns for `symbol` over `[start, end)`.
    ///
    /// With `Sampling::Px` configured the monthly sampled files are read instead of the
    /// daily ones, which needs an explicit market.
    pub fn top_cols(
        &self,
        window: TimeWindow,
        symbol: &str,
        market: Option<Market>,
        select: TopSelect,
    ) -> Result<TopBatchReader> {
        let files = match self.config.sampling {
            Some(Sampling::Px) => {
                let market = market.ok_or(ShardError::SamplingRequiresMarket)?;
                px_candidate_files(&self.config.root, symbol, market, window, self.config.debug)
            }
            Some(other) => {
                if self.config.debug {
                    debug!("sampling={other} does not change discovery; using the daily layout");
                }
                self.daily(DataKind::Top, window, symbol, market)
            }
            None => self.daily(DataKind::Top, window, symbol, market),
        };
        Ok(self.reader(files, window, select))
    }

    /// Trade columns. Sampling does not apply to trades.
    pub fn trade_cols(
        &self,
        window: TimeWindow,
        symbol: &str,
        market: Option<Market>,
        select: TradeSelect,
    ) -> Result<TradeBatchReader> {
        let files = self.daily(DataKind::Trade, window, symbol, market);
        Ok(self.reader(files, window, select))
    }

    /// Depth-delta columns. Sampling does not apply to depth.
    pub fn depth_cols(
        &self,
        window: TimeWindow,
        symbol: &str,
        market: Option<Market>,
        select: DepthSelect,
    ) -> Result<DepthBatchReader> {
        let files = self.daily(DataKind::Depth, window, symbol, market);
        Ok(self.reader(files, window, select))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_sampling_needs_a_market() {
        let dir = tempfile::tempdir().unwrap();
        let db = ShardedDb::new(ShardedDbConfig::new(dir.path()).with_sampling(Some(Sampling::Px)));
        let w = TimeWindow::new(0, 1);
        match db.top_cols(w, "BTCUSDT", None, TopSelect::default()) {
            Err(ShardError::SamplingRequiresMarket) => {}
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected an error"),
        }
        let mut r = db
            .top_cols(w, "BTCUSDT", Some(Market::Spot), TopSelect::default())
            .unwrap();
        assert!(r.files().is_empty());
        assert!(r.next_batch().is_none());
    }

    #[test]
    fn time_sampling_keeps_daily_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let db = ShardedDb::new(
            ShardedDbConfig::new(dir.path())
                .with_sampling(Some(Sampling::S1))
                .with_debug(true),
        );
        let r = db
            .top_cols(TimeWindow::new(0, 1), "ETHUSDT", None, TopSelect::default())
            .unwrap();
        assert!(r.files().is_empty());
        assert_eq!(db.root(), dir.path());
    }
}
