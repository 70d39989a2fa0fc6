//! Row-wise list assembly on top of [`ColumnCursor`].
//!
//! Each call consumes exactly one row's worth of entries from the leaf cursor(s) and
//! reports how many elements the row holds. Output vectors are optional so rows outside
//! the time window can be consumed without being copied.

use crate::cursor::{ColumnCursor, LevelSource};
use crate::error::Result;
use tracing::warn;

/// A row is an empty (or null) list when its first entry is absent and starts a record.
#[inline]
fn is_empty_row<T>(first: &crate::cursor::Entry<T>) -> bool {
    !first.present && first.rep == 0
}

/// Consume one row of a single repeated leaf, appending its values to `out`.
///
/// Returns the element count; `0` at end of column or for an empty/null list.
pub fn append_list<S>(leaf: &mut ColumnCursor<S>, mut out: Option<&mut Vec<i64>>) -> Result<u32>
where
    S: LevelSource<Value = i64>,
{
    let Some(first) = leaf.peek()? else {
        return Ok(0);
    };
    if is_empty_row(&first) {
        leaf.take()?;
        return Ok(0);
    }

    let mut count = 0u32;
    while let Some(e) = leaf.take()? {
        if let Some(out) = out.as_deref_mut() {
            out.push(e.value);
        }
        count += 1;
        match leaf.peek()? {
            Some(next) if next.rep != 0 => continue,
            _ => break,
        }
    }
    Ok(count)
}

/// Consume one row from two sibling leaves (price and quantity of the same list) in
/// lockstep.
///
/// Stops at the end of either column, at the next record boundary, or when the two
/// repetition streams disagree. A disagreement means the file is inconsistent; the row
/// is truncated at the last common element.
pub fn append_list_pairs<S>(
    px: &mut ColumnCursor<S>,
    qty: &mut ColumnCursor<S>,
    mut out_px: Option<&mut Vec<i64>>,
    mut out_qty: Option<&mut Vec<i64>>,
) -> Result<u32>
where
    S: LevelSource<Value = i64>,
{
    let (Some(p), Some(q)) = (px.peek()?, qty.peek()?) else {
        return Ok(0);
    };
    if is_empty_row(&p) && is_empty_row(&q) {
        px.take()?;
        qty.take()?;
        return Ok(0);
    }

    let mut count = 0u32;
    loop {
        let (Some(ep), Some(eq)) = (px.take()?, qty.take()?) else {
            break;
        };
        if let Some(out) = out_px.as_deref_mut() {
            out.push(ep.value);
        }
        if let Some(out) = out_qty.as_deref_mut() {
            out.push(eq.value);
        }
        count += 1;

        let (Some(np), Some(nq)) = (px.peek()?, qty.peek()?) else {
            break;
        };
        if np.rep == 0 {
            break;
        }
        if np.rep != nq.rep {
            warn!(
                "repetition levels diverge between '{}' ({}) and '{}' ({}); truncating row at {} elements",
                px.column(),
                np.rep,
                qty.column(),
                nq.rep,
                count
            );
            break;
        }
    }
    Ok(count)
}
