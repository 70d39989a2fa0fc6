//! Per-file row-group streamers.
//!
//! A streamer owns one open shard and yields row groups that have at least one row in
//! the query window. For each such row group it decodes the `ts` column in full, counts
//! the in-window rows and then copies only those rows of the selected columns into the
//! caller's buffers. Unselected columns are never read.

pub mod depth;
pub mod top;
pub mod trade;

pub use depth::{DepthBuffers, DepthStreamer};
pub use top::{TopBuffers, TopStreamer};
pub use trade::{TradeBuffers, TradeStreamer};

use crate::cursor::{ColumnCursor, LevelSource};
use crate::error::{Result, ShardError};
use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::{BoolType, Int64Type};
use parquet::file::reader::{FileReader, RowGroupReader, SerializedFileReader};
use parquet::schema::types::ColumnDescPtr;
use shard_types::{DataKind, TimeWindow};
use std::fs::File;
use std::path::Path;

pub(crate) const TS: &str = "ts";

/// Decoded columns of the current row group.
pub trait BatchBuffers: Default {
    /// Rows in the last filled row group.
    fn rows(&self) -> usize;
}

/// One open shard of a given data kind.
pub trait RowGroupStreamer: Sized {
    type Select: Copy + std::fmt::Debug;
    type Buffers: BatchBuffers;

    const KIND: DataKind;

    fn open(path: &Path) -> Result<Self>;

    /// Fill `out` from the next row group with in-window rows.
    ///
    /// Returns `false` once the file is exhausted. Row groups with no in-window row are
    /// skipped without touching any column other than `ts`.
    fn next_row_group(
        &mut self,
        window: TimeWindow,
        select: &Self::Select,
        out: &mut Self::Buffers,
    ) -> Result<bool>;
}

// ---------- File ----------

pub(crate) struct ShardFile {
    reader: SerializedFileReader<File>,
    kind: DataKind,
    next_rg: usize,
}

impl ShardFile {
    pub fn open(path: &Path, kind: DataKind) -> Result<Self> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        Ok(Self {
            reader,
            kind,
            next_rg: 0,
        })
    }

    /// Index of the next unread row group.
    pub fn advance(&mut self) -> Option<usize> {
        if self.next_rg >= self.reader.metadata().num_row_groups() {
            return None;
        }
        let i = self.next_rg;
        self.next_rg += 1;
        Some(i)
    }

    pub fn row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
        Ok(self.reader.get_row_group(i)?)
    }

    /// Leaf index and descriptor by dotted path (`ask.list.element.px`).
    pub fn column(&self, name: &str) -> Result<(usize, ColumnDescPtr)> {
        let schema = self.reader.metadata().file_metadata().schema_descr();
        schema
            .columns()
            .iter()
            .position(|c| c.path().string() == name)
            .map(|i| (i, schema.column(i)))
            .ok_or_else(|| ShardError::MissingColumn {
                kind: self.kind,
                column: name.to_string(),
            })
    }

    /// Whole-column read of a non-repeated INT64 leaf.
    pub fn read_i64(
        &self,
        rg: &dyn RowGroupReader,
        name: &str,
        rows: usize,
        out: &mut Vec<i64>,
    ) -> Result<()> {
        let (idx, descr) = self.column(name)?;
        read_column(i64_reader(rg, idx, name)?, &descr, name, rows, out)
    }

    pub fn read_bool(
        &self,
        rg: &dyn RowGroupReader,
        name: &str,
        rows: usize,
        out: &mut Vec<bool>,
    ) -> Result<()> {
        let (idx, descr) = self.column(name)?;
        read_column(bool_reader(rg, idx, name)?, &descr, name, rows, out)
    }

    /// Cursor over a (possibly repeated) INT64 leaf.
    pub fn cursor_i64(
        &self,
        rg: &dyn RowGroupReader,
        name: &str,
    ) -> Result<ColumnCursor<ColumnReaderImpl<Int64Type>>> {
        let (idx, descr) = self.column(name)?;
        Ok(ColumnCursor::new(
            i64_reader(rg, idx, name)?,
            name,
            descr.max_def_level(),
            descr.max_rep_level(),
        ))
    }
}

fn i64_reader(
    rg: &dyn RowGroupReader,
    idx: usize,
    name: &str,
) -> Result<ColumnReaderImpl<Int64Type>> {
    match rg.get_column_reader(idx)? {
        ColumnReader::Int64ColumnReader(r) => Ok(r),
        _ => Err(ShardError::ColumnType {
            column: name.to_string(),
            expected: "INT64",
        }),
    }
}

fn bool_reader(
    rg: &dyn RowGroupReader,
    idx: usize,
    name: &str,
) -> Result<ColumnReaderImpl<BoolType>> {
    match rg.get_column_reader(idx)? {
        ColumnReader::BoolColumnReader(r) => Ok(r),
        _ => Err(ShardError::ColumnType {
            column: name.to_string(),
            expected: "BOOLEAN",
        }),
    }
}

/// Read exactly `rows` values of a scalar column into `out`.
///
/// Required columns are read straight into `out`. Optional ones go through a cursor and
/// nulls become the type's default.
fn read_column<S: LevelSource>(
    mut source: S,
    descr: &parquet::schema::types::ColumnDescriptor,
    name: &str,
    rows: usize,
    out: &mut Vec<S::Value>,
) -> Result<()> {
    out.clear();
    out.reserve(rows);

    if descr.max_rep_level() > 0 {
        return Err(ShardError::ColumnType {
            column: name.to_string(),
            expected: "a non-repeated column",
        });
    }

    if descr.max_def_level() == 0 {
        while out.len() < rows {
            let before = out.len();
            source.read_into(rows - before, None, None, out)?;
            if out.len() == before {
                break;
            }
        }
    } else {
        let mut cursor = ColumnCursor::new(source, name, descr.max_def_level(), 0);
        while out.len() < rows {
            match cursor.take()? {
                Some(e) => out.push(e.value),
                None => break,
            }
        }
    }

    if out.len() != rows {
        return Err(ShardError::ShortRead {
            column: name.to_string(),
            expected: rows,
            got: out.len(),
        });
    }
    Ok(())
}

// ---------- Row group scan ----------

/// One row group whose `ts` column has been decoded and found to overlap the window.
pub(crate) struct RowGroupScan<'a> {
    pub file: &'a ShardFile,
    pub rg: &'a dyn RowGroupReader,
    pub rows: usize,
    pub ts: &'a [i64],
    pub window: TimeWindow,
    pub in_window: usize,
}

impl<'a> RowGroupScan<'a> {
    pub fn keep(&self, i: usize) -> bool {
        self.window.contains(self.ts[i])
    }

    /// One past the last in-window row.
    pub fn end(&self) -> usize {
        self.ts
            .iter()
            .rposition(|t| self.window.contains(*t))
            .map_or(0, |i| i + 1)
    }

    fn scatter<T: Copy, U>(&self, src: &[T], out: &mut Vec<U>, f: impl Fn(T) -> U) {
        out.clear();
        out.reserve(self.in_window);
        out.extend(
            self.ts
                .iter()
                .zip(src)
                .filter(|(t, _)| self.window.contains(**t))
                .map(|(_, v)| f(*v)),
        );
    }

    pub fn copy_ts(&self, out: &mut Vec<i64>) {
        self.scatter(self.ts, out, |v| v);
    }

    /// Decode `name` if `selected` and keep its in-window rows; clears `out` otherwise.
    pub fn i64_into(
        &self,
        name: &str,
        selected: bool,
        scratch: &mut Vec<i64>,
        out: &mut Vec<i64>,
    ) -> Result<()> {
        if !selected {
            out.clear();
            return Ok(());
        }
        self.file.read_i64(self.rg, name, self.rows, scratch)?;
        self.scatter(scratch, out, |v| v);
        Ok(())
    }

    pub fn bool_into(
        &self,
        name: &str,
        selected: bool,
        scratch: &mut Vec<bool>,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        if !selected {
            out.clear();
            return Ok(());
        }
        self.file.read_bool(self.rg, name, self.rows, scratch)?;
        self.scatter(scratch, out, u8::from);
        Ok(())
    }
}

/// Row count of a row group as reported by its metadata.
pub(crate) fn row_count(rg: &dyn RowGroupReader) -> usize {
    usize::try_from(rg.metadata().num_rows()).unwrap_or(0)
}

/// Decode `ts` for row group `i` and return the number of rows in `window`.
pub(crate) fn scan_ts(
    file: &ShardFile,
    rg: &dyn RowGroupReader,
    window: TimeWindow,
    ts: &mut Vec<i64>,
) -> Result<usize> {
    file.read_i64(rg, TS, row_count(rg), ts)?;
    Ok(ts.iter().filter(|t| window.contains(**t)).count())
}

#[inline]
pub(crate) fn pick<T>(selected: bool, v: &[T]) -> Option<&[T]> {
    selected.then_some(v)
}
