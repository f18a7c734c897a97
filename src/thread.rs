//! Thread groups, timed locking and a notify/wait signal.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::utils::error::Result;

pub fn millisleep(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Named threads that are joined together.
#[derive(Debug, Default)]
pub struct ThreadGroup {
    handles: Vec<JoinHandle<()>>,
}

impl ThreadGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.into()).spawn(f)?;
        self.handles.push(handle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Joins every thread in the group, returning how many panicked.
    pub fn join_all(&mut self) -> usize {
        let mut panicked = 0;
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
            if handle.join().is_err() {
                tracing::warn!("thread {} panicked", name);
                panicked += 1;
            }
        }
        panicked
    }
}

/// A condition variable paired with its own generation counter, so a
/// waiter only returns once it has been notified after it started waiting.
#[derive(Debug, Default)]
pub struct Signal {
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify_one(&self) {
        *self.generation.lock() += 1;
        self.condvar.notify_one();
    }

    pub fn notify_all(&self) {
        *self.generation.lock() += 1;
        self.condvar.notify_all();
    }

    pub fn wait(&self) {
        let mut generation = self.generation.lock();
        let start = *generation;
        while *generation == start {
            self.condvar.wait(&mut generation);
        }
    }

    /// Waits at most `ms` milliseconds. Returns `false` on timeout.
    pub fn wait_timeout(&self, ms: u64) -> bool {
        let deadline = Instant::now() + Duration::from_millis(ms);
        let mut generation = self.generation.lock();
        let start = *generation;
        while *generation == start {
            if self.condvar.wait_until(&mut generation, deadline).timed_out() {
                return *generation != start;
            }
        }
        true
    }
}

/// Tries to lock `mutex` for up to `ms` milliseconds.
pub fn timed_lock<T>(mutex: &Mutex<T>, ms: u64) -> Option<MutexGuard<'_, T>> {
    mutex.try_lock_for(Duration::from_millis(ms))
}

pub fn timed_read<T>(lock: &RwLock<T>, ms: u64) -> Option<RwLockReadGuard<'_, T>> {
    lock.try_read_for(Duration::from_millis(ms))
}

pub fn timed_write<T>(lock: &RwLock<T>, ms: u64) -> Option<RwLockWriteGuard<'_, T>> {
    lock.try_write_for(Duration::from_millis(ms))
}
