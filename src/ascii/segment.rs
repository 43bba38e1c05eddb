//! Row partitioning for parallel workers.

use std::ops::Range;

/// Split `rows` into `workers` contiguous ranges.
///
/// Range `i` is `[rows*i/workers, rows*(i+1)/workers)`. The ranges are in
/// order, never overlap and together cover exactly `0..rows`. When there are
/// more workers than rows some ranges are empty; they are dropped.
pub fn partition_rows(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    (0..workers)
        .map(|i| rows * i / workers..rows * (i + 1) / workers)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Split a flat row-major buffer into one mutable slice per row range.
///
/// `segments` must be ordered and contiguous from row 0, as produced by
/// [`partition_rows`]; `row_len` is the number of elements per row.
pub fn split_rows_mut<'a, T>(
    mut buffer: &'a mut [T],
    segments: &[Range<usize>],
    row_len: usize,
) -> Vec<&'a mut [T]> {
    let mut parts = Vec::with_capacity(segments.len());
    for segment in segments {
        let (head, tail) = buffer.split_at_mut(segment.len() * row_len);
        parts.push(head);
        buffer = tail;
    }
    parts
}
