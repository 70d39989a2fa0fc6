//! Multi-file batch reader.
//!
//! Walks the candidate shards in order and yields one batch per row group that has
//! in-window rows. A shard that cannot be opened or decoded is logged, recorded in
//! [`BatchReader::skipped`] and passed over; the iteration itself never fails.
//! Decoder panics on malformed pages count as decode failures.

use crate::error::ShardError;
use crate::paths::Candidate;
use crate::prefetch;
use crate::streamer::{BatchBuffers, DepthStreamer, RowGroupStreamer, TopStreamer, TradeStreamer};
use shard_types::{DepthView, TimeWindow, TopView, TradeView};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A shard passed over during iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

pub type TopBatchReader = BatchReader<TopStreamer>;
pub type TradeBatchReader = BatchReader<TradeStreamer>;
pub type DepthBatchReader = BatchReader<DepthStreamer>;

pub struct BatchReader<S: RowGroupStreamer> {
    files: Vec<Candidate>,
    file_idx: usize,
    streamer: Option<S>,
    window: TimeWindow,
    select: S::Select,
    buffers: S::Buffers,
    current_file: String,
    skipped: Vec<SkippedFile>,
    prefetch: bool,
    debug: bool,
}

impl<S: RowGroupStreamer> BatchReader<S> {
    pub(crate) fn new(
        files: Vec<Candidate>,
        window: TimeWindow,
        select: S::Select,
        prefetch: bool,
        debug: bool,
    ) -> Self {
        if debug {
            debug!(
                "{} reader: {} candidate file(s), select={:?}",
                S::KIND,
                files.len(),
                select
            );
        }
        Self {
            files,
            file_idx: 0,
            streamer: None,
            window,
            select,
            buffers: S::Buffers::default(),
            current_file: String::new(),
            skipped: Vec::new(),
            prefetch,
            debug,
        }
    }

    /// Candidate shards, in visiting order.
    pub fn files(&self) -> &[Candidate] {
        &self.files
    }

    /// Shards passed over so far because they failed to open or decode.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    fn skip_current(&mut self, stage: &str, err: ShardError) {
        let path = self.files[self.file_idx].path.clone();
        warn!("{} {stage} failed, skipping {}: {err}", S::KIND, path.display());
        self.skipped.push(SkippedFile {
            path,
            reason: format!("{stage}: {err}"),
        });
        self.streamer = None;
        self.file_idx += 1;
    }

    fn open_current(&mut self) -> bool {
        if self.prefetch {
            if let Some(next) = self.files.get(self.file_idx + 1) {
                prefetch::advise_sequential(&next.path);
            }
        }
        let path = &self.files[self.file_idx].path;
        let opened = panic::catch_unwind(AssertUnwindSafe(|| S::open(path)))
            .unwrap_or_else(|p| Err(ShardError::from_panic(p)));
        match opened {
            Ok(s) => {
                self.current_file = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if self.debug {
                    debug!("{} reader: opened {}", S::KIND, path.display());
                }
                self.streamer = Some(s);
                true
            }
            Err(e) => {
                self.skip_current("open", e);
                false
            }
        }
    }

    /// Fill the buffers with the next non-empty row group. Owns the skip policy.
    fn advance(&mut self) -> bool {
        while self.file_idx < self.files.len() {
            if self.streamer.is_none() && !self.open_current() {
                continue;
            }
            let Some(streamer) = self.streamer.as_mut() else {
                continue;
            };
            let (window, select, buffers) = (self.window, &self.select, &mut self.buffers);
            let step = panic::catch_unwind(AssertUnwindSafe(|| {
                streamer.next_row_group(window, select, buffers)
            }))
            .unwrap_or_else(|p| Err(ShardError::from_panic(p)));
            match step {
                Ok(true) if self.buffers.rows() > 0 => return true,
                Ok(true) => continue,
                Ok(false) => {
                    self.streamer = None;
                    self.file_idx += 1;
                }
                Err(e) => self.skip_current("read", e),
            }
        }
        false
    }
}

impl BatchReader<TopStreamer> {
    /// Next batch of top-of-book rows; the view is valid until the next call.
    pub fn next_batch(&mut self) -> Option<TopView<'_>> {
        if !self.advance() {
            return None;
        }
        Some(self.buffers.view(&self.select, &self.current_file))
    }
}

impl BatchReader<TradeStreamer> {
    pub fn next_batch(&mut self) -> Option<TradeView<'_>> {
        if !self.advance() {
            return None;
        }
        Some(self.buffers.view(&self.select, &self.current_file))
    }
}

impl BatchReader<DepthStreamer> {
    pub fn next_batch(&mut self) -> Option<DepthView<'_>> {
        if !self.advance() {
            return None;
        }
        Some(self.buffers.view(&self.select, &self.current_file))
    }
}
