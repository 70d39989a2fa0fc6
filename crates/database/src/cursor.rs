//! Pull cursor over one physical leaf column.
//!
//! Parquet hands out values in batches: a run of definition levels, repetition levels
//! and the densely packed non-null values. [`ColumnCursor`] turns that into a sequence
//! of [`Entry`] slots, one per level, refilling its buffers from the underlying
//! [`LevelSource`] whenever they run dry.

use crate::error::{Result, ShardError};
use parquet::column::reader::ColumnReaderImpl;
use parquet::data_type::{BoolType, Int64Type};

/// Records requested from the source per refill.
pub const BATCH: usize = 65_536;

/// One decoded slot of a leaf column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entry<T> {
    pub def: i16,
    pub rep: i16,
    /// `def == max_def`; otherwise the slot is null at some level of nesting.
    pub present: bool,
    /// Only meaningful when `present`.
    pub value: T,
}

/// Batched-read primitive behind a cursor.
///
/// Implementations append up to `max_records` records to the buffers. Level buffers are
/// only passed for columns whose max level is above zero. Appending nothing signals the
/// end of the column.
pub trait LevelSource {
    type Value: Copy + Default;

    fn read_into(
        &mut self,
        max_records: usize,
        def: Option<&mut Vec<i16>>,
        rep: Option<&mut Vec<i16>>,
        values: &mut Vec<Self::Value>,
    ) -> Result<()>;
}

impl LevelSource for ColumnReaderImpl<Int64Type> {
    type Value = i64;

    fn read_into(
        &mut self,
        max_records: usize,
        def: Option<&mut Vec<i16>>,
        rep: Option<&mut Vec<i16>>,
        values: &mut Vec<i64>,
    ) -> Result<()> {
        self.read_records(max_records, def, rep, values)?;
        Ok(())
    }
}

impl LevelSource for ColumnReaderImpl<BoolType> {
    type Value = bool;

    fn read_into(
        &mut self,
        max_records: usize,
        def: Option<&mut Vec<i16>>,
        rep: Option<&mut Vec<i16>>,
        values: &mut Vec<bool>,
    ) -> Result<()> {
        self.read_records(max_records, def, rep, values)?;
        Ok(())
    }
}

/// Explicit state machine: owned level/value buffers, read indices and a one-slot
/// look-ahead. Buffers are allocated once and reused across refills.
pub struct ColumnCursor<S: LevelSource> {
    source: S,
    column: String,
    max_def: i16,
    max_rep: i16,
    batch: usize,

    def: Vec<i16>,
    rep: Vec<i16>,
    values: Vec<S::Value>,
    level_idx: usize,
    value_idx: usize,

    pending: Option<Entry<S::Value>>,
    eof: bool,
}

impl<S: LevelSource> ColumnCursor<S> {
    pub fn new(source: S, column: impl Into<String>, max_def: i16, max_rep: i16) -> Self {
        Self::with_batch(source, column, max_def, max_rep, BATCH)
    }

    pub fn with_batch(
        source: S,
        column: impl Into<String>,
        max_def: i16,
        max_rep: i16,
        batch: usize,
    ) -> Self {
        let batch = batch.max(1);
        let cap = batch.min(BATCH);
        Self {
            source,
            column: column.into(),
            max_def,
            max_rep,
            batch,
            def: if max_def > 0 {
                Vec::with_capacity(cap)
            } else {
                Vec::new()
            },
            rep: if max_rep > 0 {
                Vec::with_capacity(cap)
            } else {
                Vec::new()
            },
            values: Vec::with_capacity(cap),
            level_idx: 0,
            value_idx: 0,
            pending: None,
            eof: false,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn max_def(&self) -> i16 {
        self.max_def
    }

    pub fn max_rep(&self) -> i16 {
        self.max_rep
    }

    #[inline]
    fn levels_in_buf(&self) -> usize {
        if self.max_def > 0 {
            self.def.len()
        } else if self.max_rep > 0 {
            self.rep.len()
        } else {
            self.values.len()
        }
    }

    fn refill(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }
        self.def.clear();
        self.rep.clear();
        self.values.clear();
        self.level_idx = 0;
        self.value_idx = 0;

        let def = (self.max_def > 0).then_some(&mut self.def);
        let rep = (self.max_rep > 0).then_some(&mut self.rep);
        self.source
            .read_into(self.batch, def, rep, &mut self.values)?;

        if self.levels_in_buf() == 0 {
            self.eof = true;
            return Ok(false);
        }
        Ok(true)
    }

    fn ensure_pending(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        if self.level_idx >= self.levels_in_buf() && !self.refill()? {
            return Ok(false);
        }

        let i = self.level_idx;
        let def = if self.max_def > 0 { self.def[i] } else { 0 };
        let rep = if self.max_rep > 0 {
            self.rep.get(i).copied().unwrap_or(0)
        } else {
            0
        };

        let mut entry = Entry {
            def,
            rep,
            present: false,
            value: S::Value::default(),
        };
        if def == self.max_def {
            let Some(&v) = self.values.get(self.value_idx) else {
                return Err(ShardError::ValueUnderflow {
                    column: self.column.clone(),
                });
            };
            entry.present = true;
            entry.value = v;
            self.value_idx += 1;
        }

        self.level_idx += 1;
        self.pending = Some(entry);
        Ok(true)
    }

    /// Next entry without consuming it; `None` at end of column.
    pub fn peek(&mut self) -> Result<Option<Entry<S::Value>>> {
        Ok(if self.ensure_pending()? {
            self.pending
        } else {
            None
        })
    }

    /// Consume and return the next entry; `None` at end of column.
    pub fn take(&mut self) -> Result<Option<Entry<S::Value>>> {
        self.ensure_pending()?;
        Ok(self.pending.take())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::LevelSource;
    use crate::error::Result;

    /// In-memory column: full level streams plus the packed values.
    pub struct VecSource {
        pub def: Vec<i16>,
        pub rep: Vec<i16>,
        pub values: Vec<i64>,
        pub max_def: i16,
        /// Values withheld from the end, to provoke an underflow.
        pub drop_values: usize,
        level_pos: usize,
        value_pos: usize,
    }

    impl VecSource {
        pub fn required(values: Vec<i64>) -> Self {
            Self {
                def: Vec::new(),
                rep: Vec::new(),
                values,
                max_def: 0,
                drop_values: 0,
                level_pos: 0,
                value_pos: 0,
            }
        }

        pub fn nested(def: Vec<i16>, rep: Vec<i16>, values: Vec<i64>, max_def: i16) -> Self {
            Self {
                def,
                rep,
                values,
                max_def,
                drop_values: 0,
                level_pos: 0,
                value_pos: 0,
            }
        }

        /// Optional list of required elements (max_def 2, max_rep 1), one `Option<Vec>`
        /// per row: `None` is a null list, `Some(vec![])` an empty one.
        pub fn from_lists(rows: &[Option<Vec<i64>>]) -> Self {
            let (mut def, mut rep, mut values) = (Vec::new(), Vec::new(), Vec::new());
            for row in rows {
                match row {
                    None => {
                        def.push(0);
                        rep.push(0);
                    }
                    Some(items) if items.is_empty() => {
                        def.push(1);
                        rep.push(0);
                    }
                    Some(items) => {
                        for (i, v) in items.iter().enumerate() {
                            def.push(2);
                            rep.push(if i == 0 { 0 } else { 1 });
                            values.push(*v);
                        }
                    }
                }
            }
            Self::nested(def, rep, values, 2)
        }

        fn total_levels(&self) -> usize {
            if self.max_def > 0 {
                self.def.len()
            } else {
                self.values.len()
            }
        }
    }

    impl LevelSource for VecSource {
        type Value = i64;

        fn read_into(
            &mut self,
            max_records: usize,
            def: Option<&mut Vec<i16>>,
            rep: Option<&mut Vec<i16>>,
            values: &mut Vec<i64>,
        ) -> Result<()> {
            let total = self.total_levels();
            let start = self.level_pos;
            let mut end = start;
            let mut records = 0;
            while end < total {
                let starts_record = self.rep.get(end).map_or(true, |r| *r == 0);
                if starts_record {
                    if records == max_records {
                        break;
                    }
                    records += 1;
                }
                end += 1;
            }

            let present = if self.max_def > 0 {
                self.def[start..end]
                    .iter()
                    .filter(|d| **d == self.max_def)
                    .count()
            } else {
                end - start
            };
            let available = self.values.len().saturating_sub(self.drop_values);
            let take_to = (self.value_pos + present).min(available);
            values.extend_from_slice(&self.values[self.value_pos.min(take_to)..take_to]);
            self.value_pos += present;

            if let Some(d) = def {
                d.extend_from_slice(&self.def[start..end]);
            }
            if let Some(r) = rep {
                r.extend_from_slice(&self.rep[start..end]);
            }
            self.level_pos = end;
            Ok(())
        }
    }
}
