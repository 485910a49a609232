//! Observable values for the presentation layer.

use std::fmt;

/// A value plus the callbacks interested in it. Single-threaded: the panel
/// runs on one event loop, so subscribers are plain `FnMut` closures.
pub struct Signal<T> {
    value: T,
    subscribers: Vec<Box<dyn FnMut(&T)>>,
}

impl<T: Clone + PartialEq> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Store `value`, notifying subscribers if it differs from the current
    /// one. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.value);
        }
        true
    }

    pub fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next)
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }
}

impl<T: Clone + PartialEq + Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Read-and-subscribe view of a [`Signal`] owned by someone else.
pub struct Observable<'a, T>(&'a mut Signal<T>);

impl<'a, T: Clone + PartialEq> Observable<'a, T> {
    pub fn new(signal: &'a mut Signal<T>) -> Self {
        Self(signal)
    }

    pub fn get(&self) -> T {
        self.0.get()
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.0.subscribe(subscriber);
    }
}
