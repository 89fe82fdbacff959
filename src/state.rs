// Observable value holder: every write is an explicit set-and-notify
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// A value plus the subscribers watching it. Writes never fail, even with no
/// subscribers attached.
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<T>,
    version: AtomicU64,
}

impl<T> StateCell<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self {
            tx,
            version: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Read through a borrow instead of cloning. Do not call `set` or `update`
    /// from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    // Number of writes so far
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl<T: Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_without_subscribers() {
        let cell = StateCell::new(1);
        assert_eq!(cell.get(), 1);
        assert_eq!(cell.version(), 0);

        cell.set(2);
        cell.update(|v| *v += 40);
        assert_eq!(cell.get(), 42);
        assert_eq!(cell.with(|v| *v * 2), 84);
        assert_eq!(cell.version(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let cell = StateCell::new(String::from("loading"));
        let mut rx = cell.subscribe();
        assert!(!rx.has_changed().unwrap());

        cell.set(String::from("ready"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "ready");

        cell.update(|s| s.push_str(" (3 offers)"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "ready (3 offers)");
    }
}
