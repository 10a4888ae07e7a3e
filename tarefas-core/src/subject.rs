//! Subject: a value cell that multicasts every change to its subscribers.
//!
//! New subscribers receive the current value immediately, then every later
//! `next`. Only the latest value is replayed. Notification is synchronous
//! and happens outside the internal lock, so listeners may subscribe or
//! unsubscribe from inside a callback.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Clones share the same value and subscriber list.
pub struct Subject<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

fn lock<T>(m: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    // A panicking listener never runs under the lock, so poisoning is benign.
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: initial,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(f);
        let (id, current) = {
            let mut g = lock(&self.inner);
            let id = g.next_id;
            g.next_id += 1;
            g.listeners.push((id, listener.clone()));
            (id, g.value.clone())
        };
        listener(&current);

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Store `value` and notify every live subscriber.
    pub fn next(&self, value: T) {
        let listeners: Vec<Listener<T>> = {
            let mut g = lock(&self.inner);
            g.value = value.clone();
            g.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for l in listeners {
            l(&value);
        }
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject").finish_non_exhaustive()
    }
}

/// Handle returned by [`Subject::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    /// False once unsubscribed.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
