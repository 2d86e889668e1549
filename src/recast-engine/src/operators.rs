//! Sequence operators over row streams.
//!
//! `Where`, `Select`, `Skip` and `Take` stream rows lazily. Ordering is
//! blocking: it buffers its whole input, bounded by the configured row limit.

use std::cmp::Ordering;

use common_error::{RecastError, RecastResult};
use recast_core::Value;
use recast_provider::RowStream;

use crate::lambda::CompiledLambda;

/// Keep rows for which `predicate` holds.
pub(crate) fn filter(input: RowStream, predicate: CompiledLambda) -> RowStream {
    Box::new(input.filter_map(move |row| {
        let row = match row {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        match predicate.test(std::slice::from_ref(&row)) {
            Ok(true) => Some(Ok(row)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Map every row through `selector`.
pub(crate) fn project(input: RowStream, selector: CompiledLambda) -> RowStream {
    Box::new(input.map(move |row| row.and_then(|row| selector.invoke(&[row]))))
}

/// Bypass `count` rows; a negative count bypasses nothing.
pub(crate) fn skip(input: RowStream, count: i64) -> RowStream {
    Box::new(input.skip(clamp_count(count)))
}

/// Keep at most `count` rows; a negative count keeps nothing.
pub(crate) fn take(input: RowStream, count: i64) -> RowStream {
    Box::new(input.take(clamp_count(count)))
}

fn clamp_count(count: i64) -> usize {
    usize::try_from(count.max(0)).unwrap_or(usize::MAX)
}

/// One key of a multi-key sort.
#[derive(Debug)]
pub(crate) struct SortKey {
    pub key: CompiledLambda,
    pub descending: bool,
}

/// Buffer `input` and sort it by `keys`, most significant first.
///
/// The sort is stable. Fails with a resource exhausted error once more than
/// `max_rows` rows have been buffered.
pub(crate) fn sort(
    input: RowStream,
    keys: &[SortKey],
    max_rows: Option<usize>,
) -> RecastResult<RowStream> {
    let mut buffered: Vec<(Vec<Value>, Value)> = Vec::new();

    for row in input {
        let row = row?;
        if let Some(max) = max_rows {
            if buffered.len() >= max {
                return Err(RecastError::resource_exhausted(format!(
                    "sort buffered more than {max} rows"
                )));
            }
        }
        let sort_values = keys
            .iter()
            .map(|k| k.key.invoke(std::slice::from_ref(&row)))
            .collect::<RecastResult<Vec<_>>>()?;
        buffered.push((sort_values, row));
    }

    buffered.sort_by(|(a, _), (b, _)| compare_keys(keys, a, b));

    Ok(Box::new(buffered.into_iter().map(|(_, row)| Ok(row))))
}

fn compare_keys(keys: &[SortKey], a: &[Value], b: &[Value]) -> Ordering {
    for ((key, a), b) in keys.iter().zip(a).zip(b) {
        let ordering = a.compare(b).unwrap_or(Ordering::Equal);
        let ordering = if key.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
