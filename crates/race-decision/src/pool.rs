//! A fixed-size worker pool for oracle calls with one-shot result handoff.
//!
//! Every job gets its own `flume::bounded(1)` channel; the caller keeps the
//! receiver and checks it with `try_recv`, so nothing on the race loop ever
//! blocks on a job.  Dropping the receiver abandons the job: its result, if
//! it ever arrives, is discarded by the failed `send`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::warn;

use crate::DecisionResult;

pub struct WorkerPool {
    pool:      rayon::ThreadPool,
    in_flight: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
    done_tx:   flume::Sender<()>,
    done_rx:   flume::Receiver<()>,
}

/// Decrements the in-flight count and signals completion however the job
/// ends, unwinding included.
struct JobGuard {
    in_flight: Arc<AtomicUsize>,
    done:      flume::Sender<()>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        let _ = self.done.send(());
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> DecisionResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("oracle-worker-{i}"))
            .panic_handler(|_| warn!("oracle worker panicked; request dropped"))
            .build()?;
        let (done_tx, done_rx) = flume::unbounded();
        Ok(Self {
            pool,
            in_flight: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
            done_tx,
            done_rx,
        })
    }

    /// Jobs queued or running, abandoned ones included.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Queue `job` and return the receiving end of its one-shot channel.
    ///
    /// After [`cancel`][Self::cancel], queued jobs are skipped and their
    /// channel disconnects without a value.
    pub fn submit<T, F>(&self, job: F) -> flume::Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = flume::bounded(1);
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = JobGuard {
            in_flight: Arc::clone(&self.in_flight),
            done:      self.done_tx.clone(),
        };
        let cancelled = Arc::clone(&self.cancelled);

        self.pool.spawn(move || {
            let _guard = guard;
            if cancelled.load(Ordering::Acquire) {
                return;
            }
            // The receiver may have been dropped; the result is then discarded.
            let _ = tx.send(job());
        });
        rx
    }

    /// Stop queued jobs from running.  Jobs already inside `job()` finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Wait up to `timeout` for every job to finish.  Returns `true` if the
    /// pool is idle.
    pub fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        // Completion signals from earlier jobs carry no information now.
        self.done_rx.try_iter().for_each(drop);
        while self.in_flight() > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            let _ = self.done_rx.recv_timeout(left);
        }
        true
    }
}
