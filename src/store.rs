use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};

type Listener<T> = Arc<Mutex<dyn FnMut(&T) + Send>>;

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A shared, observable value.
///
/// Clones share the same state. Listeners are only called when the value (or the
/// slice picked by their selector) actually changed. They may subscribe and
/// unsubscribe while being notified; a listener is not re-entered by a change it
/// makes itself.
pub struct Store<T> {
    inner: Arc<RwLock<StoreInner<T>>>,
    listeners: Arc<Mutex<Vec<(SubscriptionId, Listener<T>)>>>,
}

struct StoreInner<T> {
    value: T,
    /// Version counter to detect changes
    version: u64,
    next_subscription: u64,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Store")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish_non_exhaustive()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                value,
                version: 0,
                next_subscription: 0,
            })),
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .clone()
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Replace the value. Returns true and notifies listeners if it changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if inner.value == value {
                return false;
            }
            inner.value = value.clone();
            inner.version = inner.version.wrapping_add(1);
        }
        let snapshot: Vec<(SubscriptionId, Listener<T>)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();
        for (id, listener) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            let mut listener = match listener.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            };
            (*listener)(&value);
        }
        true
    }

    /// Modify the value in place; notifies only if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Subscribe to every change of the value.
    pub fn subscribe(&self, listener: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription();
        let listener: Listener<T> = Arc::new(Mutex::new(listener));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Subscribe to a derived slice of the value; the listener only runs when the
    /// selected slice changes.
    pub fn subscribe_with<S, F, L>(&self, selector: F, mut listener: L) -> SubscriptionId
    where
        S: PartialEq + Send + 'static,
        F: Fn(&T) -> S + Send + 'static,
        L: FnMut(&S) + Send + 'static,
    {
        let mut last = selector(&self.get());
        self.subscribe(move |value| {
            let next = selector(value);
            if next != last {
                listener(&next);
                last = next;
            }
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    fn next_subscription(&self) -> SubscriptionId {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_subscription += 1;
        SubscriptionId(inner.next_subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Pair {
        a: u32,
        b: u32,
    }

    #[test]
    fn set_skips_equal_values() {
        let store = Store::new(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        assert!(!store.set(1));
        assert!(store.set(2));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn selector_gates_notifications() {
        let store = Store::new(Pair::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe_with(|p: &Pair| p.a, move |a| sink.lock().unwrap().push(*a));

        store.update(|p| p.b = 5);
        store.update(|p| p.a = 3);
        store.update(|p| p.b = 6);
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Store::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        store.set(1);
        store.unsubscribe(id);
        store.set(2);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn listener_can_unsubscribe_itself() {
        let store = Store::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(Mutex::new(None));
        let id = store.subscribe({
            let store = store.clone();
            let calls = Arc::clone(&calls);
            let slot = Arc::clone(&slot);
            move |_| {
                calls.fetch_add(1, Ordering::Relaxed);
                if let Some(id) = slot.lock().unwrap().take() {
                    store.unsubscribe(id);
                }
            }
        });
        *slot.lock().unwrap() = Some(id);

        assert!(store.set(1));
        assert!(store.set(2));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn listener_can_subscribe_and_write_back() {
        let store = Store::new(0);
        let late = Arc::new(AtomicUsize::new(0));
        store.subscribe({
            let store = store.clone();
            let late = Arc::clone(&late);
            move |value: &i32| {
                if *value == 1 {
                    let late = Arc::clone(&late);
                    store.subscribe(move |_| {
                        late.fetch_add(1, Ordering::Relaxed);
                    });
                    store.set(10);
                }
            }
        });
        store.set(1);
        assert_eq!(store.get(), 10);
        assert_eq!(late.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = Store::new(String::from("a"));
        let other = store.clone();
        other.set(String::from("b"));
        assert_eq!(store.get(), "b");
    }
}
