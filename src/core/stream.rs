//! Replay-latest value streams
//!
//! A [`ReplayLatest`] holds the most recently published value. New subscribers
//! receive that value synchronously before any later publication, and every
//! subscriber observes publications in the order they were made.

use std::sync::{Mutex, MutexGuard, PoisonError};

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    subscribers: Vec<Callback<T>>,
    closed: bool,
}

pub struct ReplayLatest<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> ReplayLatest<T>
where
    T: Clone + Send,
{
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                value: initial,
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Registers `callback` and immediately hands it the latest value.
    ///
    /// Callbacks run while the stream is locked, so they must not publish to
    /// the same stream.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        callback(&inner.value);
        inner.subscribers.push(Box::new(callback));
    }

    /// Stores `value` and forwards it to every subscriber.
    ///
    /// Returns `false` without storing anything once the stream is closed.
    pub fn publish(&self, value: T) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.closed {
            return false;
        }
        inner.value = value;
        for callback in &inner.subscribers {
            callback(&inner.value);
        }
        true
    }

    pub fn latest(&self) -> T {
        self.lock().value.clone()
    }

    /// Drops all subscribers and rejects further publications.
    ///
    /// Blocks until an in-progress publication has been delivered.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    // A panicking subscriber must not wedge the stream for everybody else.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
