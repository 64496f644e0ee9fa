use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The destination does not hold exactly the rows covered by the ranges.
    #[error("destination length {0} does not match the {1} elements covered by the row ranges")]
    SizeMismatch(usize, usize),
}

/// A half-open interval `[start, end)` of image rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// First row of the range.
    pub start: usize,
    /// One past the last row of the range.
    pub end: usize,
}

impl RowRange {
    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Iterate over the row indices of the range.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Split `num_rows` rows into exactly `num_workers` contiguous, non-overlapping ranges.
///
/// Every worker gets `num_rows / num_workers` rows and the last one also takes the
/// remainder. The split is not load balanced: the last worker can get up to
/// `num_workers - 1` extra rows.
///
/// When there are more workers than rows the base size is 0, which would hand every row to
/// the last worker. That case bypasses the rule instead: the first `num_rows` workers get one
/// row each and the trailing workers get the empty range `[num_rows, num_rows)`.
///
/// # Arguments
///
/// * `num_rows` - The number of rows to distribute.
/// * `num_workers` - The number of workers, must be > 0.
///
/// # Returns
///
/// The row range of each worker, in worker order.
///
/// # Example
///
/// ```
/// use parblur_imgproc::parallel::{partition_rows, RowRange};
///
/// let ranges = partition_rows(10, 3).unwrap();
/// assert_eq!(ranges[0], RowRange { start: 0, end: 3 });
/// assert_eq!(ranges[1], RowRange { start: 3, end: 6 });
/// assert_eq!(ranges[2], RowRange { start: 6, end: 10 });
/// ```
pub fn partition_rows(
    num_rows: usize,
    num_workers: usize,
) -> Result<Vec<RowRange>, ParallelError> {
    if num_workers == 0 {
        return Err(ParallelError::InvalidThreadCount(num_workers));
    }

    if num_workers > num_rows {
        return Ok((0..num_workers)
            .map(|t| RowRange {
                start: t.min(num_rows),
                end: (t + 1).min(num_rows),
            })
            .collect());
    }

    let rows_per_worker = num_rows / num_workers;
    Ok((0..num_workers)
        .map(|t| {
            let start = t * rows_per_worker;
            let end = if t == num_workers - 1 {
                num_rows
            } else {
                start + rows_per_worker
            };
            RowRange { start, end }
        })
        .collect())
}

/// Build a dedicated thread pool with exactly `num_threads` workers.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidThreadCount`] for zero threads and
/// [`ParallelError::BuildError`] if the operating system refuses to spawn the threads.
pub fn build_thread_pool(num_threads: usize) -> Result<ThreadPool, ParallelError> {
    if num_threads == 0 {
        return Err(ParallelError::InvalidThreadCount(num_threads));
    }

    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("parblur-worker-{i}"))
        .build()
        .map_err(|e| ParallelError::BuildError(e.to_string()))
}

/// Run `f` once per non-empty row range on the given pool and wait for all of them.
///
/// `dst` is split into disjoint chunks of `range.len() * row_stride` elements, one per range,
/// so each call of `f` gets exclusive access to the rows it owns. The function returns only
/// after every call has finished, which makes it a barrier between consecutive passes.
///
/// # Arguments
///
/// * `pool` - The pool running the workers.
/// * `dst` - The destination buffer, row-major.
/// * `row_stride` - Number of elements in one row of `dst`.
/// * `ranges` - Contiguous row ranges starting at row 0, e.g. from [`partition_rows`].
/// * `f` - The work of one range, receiving the range and its rows of `dst`.
pub fn par_iter_row_ranges<T, F>(
    pool: &ThreadPool,
    dst: &mut [T],
    row_stride: usize,
    ranges: &[RowRange],
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(RowRange, &mut [T]) + Sync,
{
    let covered = ranges.iter().map(RowRange::len).sum::<usize>() * row_stride;
    if covered != dst.len() {
        return Err(ParallelError::SizeMismatch(dst.len(), covered));
    }

    let f = &f;
    pool.scope(|s| {
        let mut rest = dst;
        for &range in ranges {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * row_stride);
            rest = tail;
            if range.is_empty() {
                continue;
            }
            log::trace!("dispatching rows {}..{}", range.start, range.end);
            s.spawn(move |_| f(range, chunk));
        }
    });

    Ok(())
}
