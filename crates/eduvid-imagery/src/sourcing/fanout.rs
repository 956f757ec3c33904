//! Bounded fan-out with partial-result collection.
//!
//! Tasks run on a fixed number of permits and report back keyed by slot.
//! Collection stops at the deadline; anything still running is aborted and
//! its slot is reported as a miss for the next tier.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Outcome of one fan-out phase.
#[derive(Debug)]
pub struct FanOutResult<T> {
    pub filled: BTreeMap<usize, T>,
    pub misses: Vec<usize>,
}

impl<T> FanOutResult<T> {
    pub fn filled_count(&self) -> usize {
        self.filled.len()
    }
}

/// Worker pool size plus overall collection deadline.
#[derive(Debug, Clone, Copy)]
pub struct FanOut {
    workers: usize,
    deadline: Duration,
}

impl FanOut {
    pub fn new(workers: usize, deadline: Duration) -> Self {
        Self {
            workers: workers.max(1),
            deadline,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task(slot)` for every slot, at most `workers` at a time.
    ///
    /// A task yielding `None` or panicking is a miss. Slots still pending at
    /// the deadline are misses too.
    pub async fn run<T, F, Fut>(&self, phase: &'static str, slots: &[usize], task: F) -> FanOutResult<T>
    where
        T: Send + 'static,
        F: Fn(usize) -> Fut,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();

        for &slot in slots {
            let permits = Arc::clone(&permits);
            let fut = task(slot);
            set.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (slot, None);
                };
                (slot, fut.await)
            });
        }

        let deadline = Instant::now() + self.deadline;
        let mut filled = BTreeMap::new();

        loop {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok((slot, Some(value))))) => {
                    debug!(phase, slot, "Slot filled");
                    filled.insert(slot, value);
                }
                Ok(Some(Ok((slot, None)))) => {
                    debug!(phase, slot, "Slot missed");
                }
                Ok(Some(Err(e))) => {
                    warn!(phase, error = %e, "Fan-out task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        phase,
                        pending = set.len(),
                        deadline_secs = self.deadline.as_secs_f64(),
                        "Fan-out deadline reached, abandoning pending work"
                    );
                    break;
                }
            }
        }
        set.abort_all();

        let misses = slots.iter().copied().filter(|s| !filled.contains_key(s)).collect();
        FanOutResult { filled, misses }
    }
}
