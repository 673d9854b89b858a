//! Execution of (candidate, fold) units, sequentially or on a worker pool.
//!
//! Units are numbered candidate-major, fold-minor. Whatever order the pool
//! completes them in, results come back slotted by that number.

use crossbeam_channel::{bounded, unbounded};
use hs_types::{config_error, consistency_error, SearchError, SearchResult};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// One unit of work, tagged with where its result belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub candidate_index: usize,
    pub fold_index: usize,
}

/// Every (candidate, fold) pair: all folds of candidate 0, then candidate 1, ...
pub fn plan(n_candidates: usize, n_folds: usize) -> Vec<WorkUnit> {
    (0..n_candidates)
        .flat_map(|candidate_index| {
            (0..n_folds).map(move |fold_index| WorkUnit {
                candidate_index,
                fold_index,
            })
        })
        .collect()
}

/// Run `eval` on every unit and return the outcomes in unit order.
///
/// With one worker the units run in order on the calling thread and the
/// first error stops the run. With more, a pool of `workers` threads pulls
/// units from a bounded queue of `queue_capacity`; after the first error no
/// new unit is started and units already running finish. Of the errors
/// collected, the one from the earliest unit is returned.
pub fn execute<T, F>(
    units: &[WorkUnit],
    workers: usize,
    queue_capacity: usize,
    eval: F,
) -> SearchResult<Vec<T>>
where
    T: Send,
    F: Fn(WorkUnit) -> SearchResult<T> + Sync,
{
    if workers <= 1 {
        return units.iter().map(|&unit| eval(unit)).collect();
    }
    run_pool(units, workers.min(units.len()).max(1), queue_capacity, eval)
}

fn run_pool<T, F>(
    units: &[WorkUnit],
    workers: usize,
    queue_capacity: usize,
    eval: F,
) -> SearchResult<Vec<T>>
where
    T: Send,
    F: Fn(WorkUnit) -> SearchResult<T> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("hs-worker-{i}"))
        .build()
        .map_err(|e| config_error!("cannot start a pool of {workers} workers: {e}"))?;

    let (work_tx, work_rx) = bounded::<(usize, WorkUnit)>(queue_capacity.max(1));
    let (result_tx, result_rx) = unbounded::<(usize, usize, SearchResult<T>)>();
    let abort = AtomicBool::new(false);

    let mut slots: Vec<Option<T>> = units.iter().map(|_| None).collect();
    let mut failure: Option<(usize, SearchError)> = None;

    pool.in_place_scope(|scope| {
        for worker in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let abort = &abort;
            let eval = &eval;
            scope.spawn(move |_| {
                for (position, unit) in work_rx.iter() {
                    if abort.load(Ordering::Acquire) {
                        break;
                    }
                    let outcome = eval(unit);
                    if outcome.is_err() {
                        abort.store(true, Ordering::Release);
                    }
                    if result_tx.send((position, worker, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        // Workers hold the only remaining ends, so the channels close when
        // they exit.
        drop(work_rx);
        drop(result_tx);

        for (position, &unit) in units.iter().enumerate() {
            if abort.load(Ordering::Acquire) {
                break;
            }
            if work_tx.send((position, unit)).is_err() {
                break;
            }
        }
        drop(work_tx);

        for (position, worker, outcome) in result_rx.iter() {
            match outcome {
                Ok(value) => {
                    debug!(position, worker, "unit completed");
                    slots[position] = Some(value);
                }
                Err(err) => {
                    debug!(position, worker, error = %err, "unit failed");
                    if failure.as_ref().map_or(true, |(first, _)| position < *first) {
                        failure = Some((position, err));
                    }
                }
            }
        }
    });

    if let Some((_, err)) = failure {
        return Err(err);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            slot.ok_or_else(|| consistency_error!("no result was collected for unit {position}"))
        })
        .collect()
}
