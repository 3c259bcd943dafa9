//! Worker Pool
//!
//! Fixed set of threads running queued jobs to completion.
//!
//! ## Shutdown
//! ```text
//! close queue ──► wait ≤ timeout ──► done (Graceful)
//!                      │
//!                      ▼ expired
//!        cancel flag + cancel hooks ──► wait ≤ timeout ──► done (Forced)
//! ```
//! Threads can't be killed, so "force" means: jobs still queued are dropped
//! unrun, and cancel hooks get a chance to unblock jobs already running
//! (the server shuts down their sockets). Anything still stuck after the
//! second wait is detached.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{DbError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;
type CancelHook = Box<dyn Fn() + Send + Sync + 'static>;

/// How a pool shutdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every job finished inside the first wait
    Graceful,

    /// The first wait expired and the pool was force-cancelled
    Forced,
}

/// Fixed-size thread pool over an unbounded job queue
pub struct WorkerPool {
    /// Job queue; `None` once shutdown has begun
    sender: Option<Sender<Job>>,

    /// One message per worker thread as it exits
    done: Receiver<usize>,

    /// Worker threads still running
    running: usize,

    workers: Vec<JoinHandle<()>>,

    /// Set on force-cancel; workers skip whatever is still queued
    cancelled: Arc<AtomicBool>,

    cancel_hooks: Vec<CancelHook>,
}

impl WorkerPool {
    /// Spawn `size` worker threads
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(DbError::Config(
                "worker pool needs at least one thread".to_string(),
            ));
        }

        let (sender, receiver) = channel::unbounded::<Job>();
        let (done_tx, done_rx) = channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            let done_tx = done_tx.clone();
            let cancelled = Arc::clone(&cancelled);
            let handle = thread::Builder::new()
                .name(format!("jsondb-worker-{}", id))
                .spawn(move || {
                    worker_loop(id, receiver, cancelled);
                    let _ = done_tx.send(id);
                })?;
            workers.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            done: done_rx,
            running: size,
            workers,
            cancelled,
            cancel_hooks: Vec::new(),
        })
    }

    /// Queue a job. Never blocks; fails only once shutdown has begun.
    pub fn execute<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| DbError::Network("worker pool is shut down".to_string()))?;
        sender
            .send(Box::new(job))
            .map_err(|_| DbError::Network("worker pool is shut down".to_string()))
    }

    /// Register a callback run when shutdown turns forceful
    pub fn on_cancel<F>(&mut self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cancel_hooks.push(Box::new(hook));
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Jobs waiting for a free worker
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map(|s| s.len()).unwrap_or(0)
    }

    /// Stop taking jobs, wait for the queue to drain, force-cancel if it
    /// takes longer than `timeout`
    pub fn shutdown(&mut self, timeout: Duration) -> ShutdownOutcome {
        drop(self.sender.take());

        if self.wait_for_workers(timeout) {
            self.join_finished();
            tracing::debug!("worker pool drained");
            return ShutdownOutcome::Graceful;
        }

        tracing::warn!(
            "{} worker(s) still busy after {:?}, cancelling",
            self.running,
            timeout
        );
        self.cancelled.store(true, Ordering::SeqCst);
        for hook in &self.cancel_hooks {
            hook();
        }

        if !self.wait_for_workers(timeout) {
            tracing::error!("{} worker(s) did not terminate, detaching", self.running);
        }
        self.join_finished();
        ShutdownOutcome::Forced
    }

    fn wait_for_workers(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.running > 0 {
            match self.done.recv_deadline(deadline) {
                Ok(_) => self.running -= 1,
                Err(_) => return false,
            }
        }
        true
    }

    /// Join threads that have exited; dropping the rest detaches them
    fn join_finished(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers finish the queue and exit on their own
        drop(self.sender.take());
    }
}

fn worker_loop(id: usize, jobs: Receiver<Job>, cancelled: Arc<AtomicBool>) {
    for job in jobs.iter() {
        if cancelled.load(Ordering::SeqCst) {
            tracing::trace!("worker {} dropping queued job after cancel", id);
            continue;
        }
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("worker {}: job panicked", id);
        }
    }
}
