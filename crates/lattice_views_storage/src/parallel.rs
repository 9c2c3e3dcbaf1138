//! Fork-join execution of bulk operations.
//!
//! A bulk operation hands a flat slice (or just a length) to `Parallelism`, which partitions it into contiguous chunks, runs
//! every chunk as one task, and returns once all tasks have finished. Each task sees only its own chunk, so tasks never write
//! the same memory. Within a chunk, elements are visited in linear order. There is no ordering between chunks.
//!
//! ```
//! use lattice_views_storage::{ChunkError, Parallelism};
//!
//! let mut cells = vec![0u64; 1000];
//! let policy = Parallelism::with_threads(4);
//!
//! // Each chunk writes its own cells and reports a partial count, which is reduced after the join.
//! let partial_counts = policy
//!     .for_each_chunk_mut(&mut cells, |_ctx, chunk| {
//!         chunk.iter_mut().for_each(|c| *c = 1);
//!         Ok::<_, ChunkError>(chunk.len())
//!     })
//!     .unwrap();
//! assert_eq!(partial_counts.iter().sum::<usize>(), 1000);
//! ```
//!
//! A failure or panic inside any task raises an interrupt that sibling tasks observe through `ChunkContext::advance` or
//! `ChunkContext::is_interrupted`.
//! Once every task has stopped, all failures are returned together in `OverlayError::Parallel`. Work already completed by other
//! tasks is kept.

use crate::{OverlayError, WorkerFailure};

use core::ops::Range;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::any::Any;
use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Processing policy for bulk operations: how many workers, how many chunks, and which pool runs them.
#[derive(Clone, Debug)]
pub struct Parallelism {
    threads: usize,
    chunks: Option<usize>,
    pool: Option<Arc<ThreadPool>>,
}

impl Default for Parallelism {
    /// One worker per thread of rayon's global pool.
    fn default() -> Self {
        Self::with_threads(rayon::current_num_threads())
    }
}

impl Parallelism {
    /// A single chunk, run on the calling thread.
    pub fn sequential() -> Self {
        Self::with_threads(1)
    }

    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            chunks: None,
            pool: None,
        }
    }

    /// Run on a dedicated pool, shared with every other policy holding the same `Arc`.
    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        Self {
            threads: pool.current_num_threads().max(1),
            chunks: None,
            pool: Some(pool),
        }
    }

    /// Override the number of chunks a bulk operation is partitioned into. Defaults to one chunk per worker.
    pub fn chunks(mut self, chunks: usize) -> Self {
        self.chunks = Some(chunks.max(1));

        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_sequential(&self) -> bool {
        self.threads == 1 && self.pool.is_none()
    }

    /// The number of chunks `len` elements are split into.
    pub fn num_chunks(&self, len: usize) -> usize {
        self.chunks.unwrap_or(self.threads).min(len).max(1)
    }

    fn chunk_len(&self, len: usize) -> usize {
        let num_chunks = self.num_chunks(len);

        (len + num_chunks - 1) / num_chunks
    }

    /// Partition `cells` into contiguous chunks and run `task` on each, returning one result per chunk in chunk order.
    pub fn for_each_chunk_mut<T, R, F>(&self, cells: &mut [T], task: F) -> Result<Vec<R>, OverlayError>
    where
        T: Send,
        R: Send,
        F: Fn(&ChunkContext<'_>, &mut [T]) -> Result<R, ChunkError> + Sync,
    {
        if cells.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_len = self.chunk_len(cells.len());
        let interrupt = AtomicBool::new(false);
        let run_chunk = |(chunk, slice): (usize, &mut [T])| {
            let ctx = ChunkContext::new(chunk, chunk * chunk_len, &interrupt);
            ctx.run(|| task(&ctx, slice))
        };

        let outcomes: Vec<Result<R, ChunkError>> = match &self.pool {
            _ if self.is_sequential() => cells.chunks_mut(chunk_len).enumerate().map(&run_chunk).collect(),
            Some(pool) => pool.install(|| {
                cells
                    .par_chunks_mut(chunk_len)
                    .enumerate()
                    .map(&run_chunk)
                    .collect()
            }),
            None => cells
                .par_chunks_mut(chunk_len)
                .enumerate()
                .map(&run_chunk)
                .collect(),
        };

        collect_outcomes(outcomes)
    }

    /// Partition `0..len` into contiguous ranges and run `task` on each, returning one result per range in chunk order.
    pub fn for_each_range<R, F>(&self, len: usize, task: F) -> Result<Vec<R>, OverlayError>
    where
        R: Send,
        F: Fn(&ChunkContext<'_>, Range<usize>) -> Result<R, ChunkError> + Sync,
    {
        if len == 0 {
            return Ok(Vec::new());
        }

        let chunk_len = self.chunk_len(len);
        let ranges: Vec<Range<usize>> = (0..len)
            .step_by(chunk_len)
            .map(|start| start..(start + chunk_len).min(len))
            .collect();
        let interrupt = AtomicBool::new(false);
        let run_chunk = |(chunk, range): (usize, Range<usize>)| {
            let ctx = ChunkContext::new(chunk, range.start, &interrupt);
            ctx.run(|| task(&ctx, range))
        };

        let outcomes: Vec<Result<R, ChunkError>> = match &self.pool {
            _ if self.is_sequential() => ranges.into_iter().enumerate().map(&run_chunk).collect(),
            Some(pool) => pool.install(|| {
                ranges
                    .into_par_iter()
                    .enumerate()
                    .map(&run_chunk)
                    .collect()
            }),
            None => ranges
                .into_par_iter()
                .enumerate()
                .map(&run_chunk)
                .collect(),
        };

        collect_outcomes(outcomes)
    }
}

impl PartialEq for Parallelism {
    fn eq(&self, other: &Self) -> bool {
        let same_pool = match (&self.pool, &other.pool) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };

        same_pool && self.threads == other.threads && self.chunks == other.chunks
    }
}

impl Eq for Parallelism {}

impl Hash for Parallelism {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.threads.hash(state);
        self.chunks.hash(state);
        self.pool.as_ref().map(Arc::as_ptr).hash(state);
    }
}

/// What a task knows about its place in the partition.
pub struct ChunkContext<'a> {
    /// Position of this chunk in the partition.
    pub chunk: usize,
    /// Linear offset of the chunk's first element.
    pub offset: usize,
    cursor: Cell<usize>,
    interrupt: &'a AtomicBool,
}

impl<'a> ChunkContext<'a> {
    fn new(chunk: usize, offset: usize, interrupt: &'a AtomicBool) -> Self {
        Self {
            chunk,
            offset,
            cursor: Cell::new(offset),
            interrupt,
        }
    }

    /// Records that the task is now processing the element at linear offset `stride`, so a panic is reported there.
    /// Returns `ChunkError::Interrupted` once a sibling task has failed.
    #[inline]
    pub fn advance(&self, stride: usize) -> Result<(), ChunkError> {
        self.cursor.set(stride);
        if self.is_interrupted() {
            return Err(ChunkError::Interrupted);
        }

        Ok(())
    }

    /// Returns `true` once any task of the same operation has failed. Tasks should poll this between elements and return
    /// `ChunkError::Interrupted` when it is set.
    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    fn run<R>(&self, task: impl FnOnce() -> Result<R, ChunkError>) -> Result<R, ChunkError> {
        let outcome = catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
            Err(ChunkError::Failed {
                stride: self.cursor.get(),
                reason: panic_message(payload),
            })
        });
        if let Err(ChunkError::Failed { .. }) = outcome {
            self.interrupt.store(true, Ordering::Relaxed);
        }

        outcome
    }
}

/// Why a chunk stopped early.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkError {
    /// The element at linear offset `stride` could not be processed.
    Failed { stride: usize, reason: String },
    /// Another chunk failed, and this one stopped in response.
    Interrupted,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

fn collect_outcomes<R>(outcomes: Vec<Result<R, ChunkError>>) -> Result<Vec<R>, OverlayError> {
    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    let mut interrupted = 0;
    for (chunk, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(result) => results.push(result),
            Err(ChunkError::Interrupted) => interrupted += 1,
            Err(ChunkError::Failed { stride, reason }) => {
                tracing::error!(chunk, stride, %reason, "bulk operation chunk failed");
                failures.push(WorkerFailure {
                    chunk,
                    stride,
                    reason,
                });
            }
        }
    }

    if failures.is_empty() && interrupted == 0 {
        Ok(results)
    } else {
        Err(OverlayError::Parallel {
            failures,
            interrupted,
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    fn policies() -> Vec<Parallelism> {
        let pool = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(3)
                .build()
                .unwrap(),
        );

        vec![
            Parallelism::sequential(),
            Parallelism::sequential().chunks(7),
            Parallelism::with_threads(4),
            Parallelism::with_threads(2).chunks(1000),
            Parallelism::with_pool(pool),
        ]
    }

    #[test]
    fn chunks_cover_every_cell_exactly_once() {
        for policy in policies() {
            let mut cells = vec![0u32; 101];
            let partials = policy
                .for_each_chunk_mut(&mut cells, |ctx, chunk| {
                    for (i, c) in chunk.iter_mut().enumerate() {
                        *c += (ctx.offset + i) as u32;
                    }
                    Ok(chunk.len())
                })
                .unwrap();

            assert_eq!(partials.iter().sum::<usize>(), 101);
            assert_eq!(partials.len(), policy.num_chunks(101));
            assert_eq!(cells, (0..101).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn ranges_are_contiguous_and_ordered() {
        for policy in policies() {
            let ranges = policy
                .for_each_range(23, |_ctx, range| Ok(range))
                .unwrap();

            let flattened: Vec<usize> = ranges.into_iter().flatten().collect();
            assert_eq!(flattened, (0..23).collect::<Vec<_>>());
        }
    }

    #[test]
    fn empty_input_runs_nothing() {
        let mut cells: Vec<u8> = Vec::new();
        let results = Parallelism::with_threads(4)
            .for_each_chunk_mut(&mut cells, |_ctx, _chunk| -> Result<(), ChunkError> {
                panic!("no chunk should run")
            })
            .unwrap();

        assert!(results.is_empty());
    }

    #[test]
    fn chunk_count_never_exceeds_length() {
        let policy = Parallelism::with_threads(8);
        assert_eq!(policy.num_chunks(3), 3);
        assert_eq!(policy.num_chunks(0), 1);
        assert_eq!(Parallelism::sequential().num_chunks(100), 1);
    }

    #[test]
    fn failure_is_reported_after_all_chunks_stop() {
        for policy in policies() {
            let mut cells = vec![0u8; 64];
            let result = policy.for_each_chunk_mut(&mut cells, |ctx, chunk| {
                for (i, c) in chunk.iter_mut().enumerate() {
                    if ctx.is_interrupted() {
                        return Err(ChunkError::Interrupted);
                    }
                    let stride = ctx.offset + i;
                    if stride == 10 {
                        return Err(ChunkError::Failed {
                            stride,
                            reason: "bad sample".to_string(),
                        });
                    }
                    *c = 1;
                }
                Ok(())
            });

            match result {
                Err(OverlayError::Parallel { failures, .. }) => {
                    assert_eq!(failures.len(), 1);
                    assert_eq!(failures[0].stride, 10);
                    assert_eq!(failures[0].reason, "bad sample");
                }
                other => panic!("expected a parallel failure, got {:?}", other),
            }
            // Cells written before the failure are not rolled back.
            if policy.is_sequential() {
                assert_eq!(cells[..10], [1; 10]);
            }
        }
    }

    #[test]
    fn panics_are_captured_as_failures() {
        let mut cells = vec![0u8; 16];
        let result = Parallelism::with_threads(4).for_each_chunk_mut(&mut cells, |ctx, _chunk| {
            if ctx.chunk == 2 {
                panic!("worker exploded");
            }
            Ok(())
        });

        match result {
            Err(OverlayError::Parallel { failures, .. }) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].chunk, 2);
                assert_eq!(failures[0].reason, "worker exploded");
            }
            other => panic!("expected a parallel failure, got {:?}", other),
        }
    }

    #[test]
    fn panics_report_the_element_being_processed() {
        for policy in policies() {
            let mut cells = vec![0u8; 50];
            let result = policy.for_each_chunk_mut(&mut cells, |ctx, chunk| {
                for (i, c) in chunk.iter_mut().enumerate() {
                    let stride = ctx.offset + i;
                    ctx.advance(stride)?;
                    if stride == 33 {
                        panic!("bad cell");
                    }
                    *c = 1;
                }
                Ok(())
            });

            match result {
                Err(OverlayError::Parallel { failures, .. }) => {
                    assert_eq!(failures.len(), 1);
                    assert_eq!(failures[0].stride, 33);
                }
                other => panic!("expected a parallel failure, got {:?}", other),
            }
        }
    }

    #[test]
    fn sequential_failure_interrupts_later_chunks() {
        let policy = Parallelism::sequential().chunks(4);
        let result = policy.for_each_range(8, |ctx, range| {
            if ctx.is_interrupted() {
                return Err(ChunkError::Interrupted);
            }
            if ctx.chunk == 1 {
                return Err(ChunkError::Failed {
                    stride: range.start,
                    reason: "stop".to_string(),
                });
            }
            Ok(())
        });

        assert_eq!(
            result,
            Err(OverlayError::Parallel {
                failures: vec![WorkerFailure {
                    chunk: 1,
                    stride: 2,
                    reason: "stop".to_string(),
                }],
                interrupted: 2,
            })
        );
    }
}
