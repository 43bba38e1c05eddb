//! Single-slot frame queue feeding a processing thread.
//!
//! At most one item waits behind the one being processed. A newer item
//! replaces the waiting one, so a slow consumer always sees the latest frame.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the processing thread sleeps before rechecking for shutdown.
const WAIT_TIMEOUT: Duration = Duration::from_millis(250);

struct Shared<T> {
    next: Mutex<Option<T>>,
    ready: Condvar,
    running: AtomicBool,
    paused: AtomicBool,
    processed: AtomicU64,
    dropped: AtomicU64,
}

/// A producer/consumer queue holding at most one pending item.
pub struct FrameQueue<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> FrameQueue<T> {
    /// Start a named thread that calls `processor` for each item.
    pub fn start<F>(name: &str, processor: F) -> std::io::Result<Self>
    where
        F: FnMut(T) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            next: Mutex::new(None),
            ready: Condvar::new(),
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            processed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        });
        let worker = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_queue(&worker, processor))?;
        log::debug!("Started queue thread {}", name);
        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    /// Queue an item, replacing any item still waiting.
    pub fn push(&self, item: T) {
        let mut next = self.shared.next.lock().unwrap_or_else(PoisonError::into_inner);
        if next.replace(item).is_some() {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.shared.ready.notify_one();
    }

    /// Skip items instead of processing them. The thread keeps running.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Items handed to the processor.
    pub fn processed(&self) -> u64 {
        self.shared.processed.load(Ordering::Relaxed)
    }

    /// Items replaced before processing, or skipped while paused.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// True if an item is waiting.
    pub fn has_pending(&self) -> bool {
        self.shared
            .next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop the thread and wait for it. An item being processed finishes
    /// first; a waiting item is discarded.
    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.shared.running.store(false, Ordering::SeqCst);
            {
                let _next = self.shared.next.lock().unwrap_or_else(PoisonError::into_inner);
                self.shared.ready.notify_all();
            }
            if thread.join().is_err() {
                log::warn!("Queue thread exited with a panic");
            }
        }
    }
}

impl<T: Send + 'static> Drop for FrameQueue<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_queue<T, F>(shared: &Shared<T>, mut processor: F)
where
    F: FnMut(T),
{
    loop {
        let item = {
            let mut next = shared.next.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                if !shared.running.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(item) = next.take() {
                    break item;
                }
                next = shared
                    .ready
                    .wait_timeout(next, WAIT_TIMEOUT)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        };

        if shared.paused.load(Ordering::SeqCst) {
            shared.dropped.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        if panic::catch_unwind(AssertUnwindSafe(|| processor(item))).is_err() {
            log::error!("Frame processor panicked, skipping frame");
        }
        shared.processed.fetch_add(1, Ordering::Relaxed);
    }
}
