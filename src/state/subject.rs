//! Replay-latest broadcast cell.
//!
//! DESIGN
//! ======
//! A [`Subject`] holds the latest value and an ordered list of subscriber
//! callbacks. New subscribers are called immediately with the latest value,
//! then once per [`Subject::publish`], in registration order. Callbacks get a
//! shared reference only; the held value changes solely through `publish`.
//!
//! Callbacks run after the internal lock is released, so they may call
//! [`Subject::get`], subscribe further, or publish again.
//!
//! DELIVERY
//! ========
//! At most one thread fans out at a time. A publish that lands while another
//! delivery is running only replaces the held value; the running deliverer
//! notices the newer version when its pass ends and delivers again. Values
//! superseded in the meantime are skipped, so the last value every subscriber
//! sees is always the one [`Subject::get`] returns once publishing settles.

#[cfg(test)]
#[path = "subject_test.rs"]
mod subject_test;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SubjectInner<T> {
    latest: T,
    version: u64,
    delivering: bool,
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
}

/// Shared handle; clones observe and publish to the same cell.
pub struct Subject<T> {
    inner: Arc<Mutex<SubjectInner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SubjectInner {
                latest: initial,
                version: 0,
                delivering: false,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Latest published value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.inner).latest.clone()
    }

    /// Replace the held value and notify every subscriber.
    ///
    /// If another delivery is in flight, this returns once the value is held
    /// and leaves the fan-out to that deliverer.
    pub fn publish(&self, value: T) {
        {
            let mut inner = lock(&self.inner);
            inner.latest = value;
            inner.version += 1;
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }

        let guard = DeliveryGuard { inner: &self.inner };
        loop {
            let (version, current, callbacks) = {
                let inner = lock(&self.inner);
                let callbacks: Vec<Callback<T>> = inner.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect();
                (inner.version, inner.latest.clone(), callbacks)
            };
            for callback in callbacks {
                callback(&current);
            }

            let mut inner = lock(&self.inner);
            if inner.version == version {
                inner.delivering = false;
                break;
            }
        }
        guard.disarm();
    }

    /// Register `callback`; it is invoked right away with the latest value.
    /// The callback stays registered until the returned handle is dropped or
    /// [`Subscription::unsubscribe`]d; use [`Subscription::detach`] to keep it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::clone(&callback)));
            (id, inner.latest.clone())
        };
        callback(&current);

        let weak: Weak<Mutex<SubjectInner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).subscribers.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Subject")
            .field("latest", &inner.latest)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the delivery slot if a callback panics mid fan-out.
struct DeliveryGuard<'a, T> {
    inner: &'a Mutex<SubjectInner<T>>,
}

impl<T> DeliveryGuard<'_, T> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl<T> Drop for DeliveryGuard<'_, T> {
    fn drop(&mut self) {
        lock(self.inner).delivering = false;
    }
}

/// Handle that removes its callback from the [`Subject`] when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the callback registered for the subject's lifetime.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
