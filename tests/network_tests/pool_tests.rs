//! Tests for WorkerPool
//!
//! These tests verify:
//! - Every queued job runs on a graceful shutdown
//! - Up to `size` jobs run at once, the rest queue
//! - Forced shutdown runs cancel hooks and drops queued jobs
//! - A panicking job does not take its worker down

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crossbeam::channel;
use jsondb::network::{ShutdownOutcome, WorkerPool};
use jsondb::DbError;

#[test]
fn test_zero_workers_rejected() {
    assert!(matches!(WorkerPool::new(0), Err(DbError::Config(_))));
}

#[test]
fn test_all_jobs_run_before_graceful_shutdown() {
    let mut pool = WorkerPool::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..100 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    assert_eq!(pool.shutdown(Duration::from_secs(5)), ShutdownOutcome::Graceful);
    assert_eq!(counter.load(Ordering::SeqCst), 100);
}

#[test]
fn test_jobs_run_concurrently_up_to_pool_size() {
    let size = 4;
    let mut pool = WorkerPool::new(size).unwrap();
    let barrier = Arc::new(Barrier::new(size));
    let (done_tx, done_rx) = channel::unbounded();

    for _ in 0..size {
        let barrier = Arc::clone(&barrier);
        let done_tx = done_tx.clone();
        pool.execute(move || {
            // Only passes once every worker is inside a job at the same time
            barrier.wait();
            done_tx.send(()).unwrap();
        })
        .unwrap();
    }

    for _ in 0..size {
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
    assert_eq!(pool.shutdown(Duration::from_secs(5)), ShutdownOutcome::Graceful);
}

#[test]
fn test_excess_jobs_queue_instead_of_failing() {
    let mut pool = WorkerPool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            thread::sleep(Duration::from_millis(10));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    assert_eq!(pool.shutdown(Duration::from_secs(5)), ShutdownOutcome::Graceful);
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn test_execute_after_shutdown_fails() {
    let mut pool = WorkerPool::new(2).unwrap();
    pool.shutdown(Duration::from_secs(1));

    assert!(matches!(pool.execute(|| {}), Err(DbError::Network(_))));
}

#[test]
fn test_forced_shutdown_runs_hooks_and_drops_queue() {
    let mut pool = WorkerPool::new(1).unwrap();
    let (release_tx, release_rx) = channel::unbounded::<()>();
    let (started_tx, started_rx) = channel::unbounded::<()>();
    let queued_ran = Arc::new(AtomicUsize::new(0));

    // Occupies the only worker until the cancel hook releases it
    pool.execute(move || {
        started_tx.send(()).unwrap();
        let _ = release_rx.recv();
    })
    .unwrap();
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    for _ in 0..3 {
        let queued_ran = Arc::clone(&queued_ran);
        pool.execute(move || {
            queued_ran.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    assert_eq!(pool.queued(), 3);

    let hook_calls = Arc::new(AtomicUsize::new(0));
    {
        let hook_calls = Arc::clone(&hook_calls);
        pool.on_cancel(move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
            let _ = release_tx.send(());
        });
    }

    let outcome = pool.shutdown(Duration::from_millis(100));

    assert_eq!(outcome, ShutdownOutcome::Forced);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    assert_eq!(queued_ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_job_does_not_kill_worker() {
    let mut pool = WorkerPool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    pool.execute(|| panic!("job failure")).unwrap();
    {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    assert_eq!(pool.shutdown(Duration::from_secs(5)), ShutdownOutcome::Graceful);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
