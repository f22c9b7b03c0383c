use std::{error::Error as StdError, fmt, sync::Arc};

use log::warn;
use thiserror::Error;

pub type ListenerResult = Result<(), Box<dyn StdError + Send + Sync>>;

/// A registered callback. Clones share identity: registering a clone of a
/// listener that is already registered is a no-op, and removing any clone
/// removes it.
pub struct Listener<A: ?Sized>(Arc<dyn Fn(&A) -> ListenerResult + Send + Sync>);

impl<A: ?Sized> Listener<A> {
    pub fn new(callback: impl Fn(&A) -> ListenerResult + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    /// A listener that cannot fail
    pub fn infallible(callback: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self::new(move |args| {
            callback(args);
            Ok(())
        })
    }

    pub fn call(&self, args: &A) -> ListenerResult {
        (self.0)(args)
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl<A: ?Sized> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: ?Sized> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<A: ?Sized> Eq for Listener<A> {}

impl<A: ?Sized> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", self.address())
    }
}

/// One listener that returned an error during [`CallbackDispatcher::fire`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Registration position of the listener at the time it was fired
    pub index: usize,
    pub message: String,
}

/// Aggregated listener failures of one or more dispatches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} of {total} listeners failed: {}", .failures.len(), summary(.failures))]
pub struct DispatchError {
    pub failures: Vec<ListenerFailure>,
    pub total: usize,
}

fn summary(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("#{}: {}", failure.index, failure.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DispatchError {
    pub fn merge(&mut self, other: DispatchError) {
        self.failures.extend(other.failures);
        self.total += other.total;
    }

    /// Folds the error of a later dispatch into `result`
    pub fn accumulate(result: &mut Result<(), DispatchError>, next: Result<(), DispatchError>) {
        if let Err(next) = next {
            match result {
                Ok(()) => *result = Err(next),
                Err(error) => error.merge(next),
            }
        }
    }
}

/// Ordered, register-once list of listeners
pub struct CallbackDispatcher<A: ?Sized> {
    listeners: Vec<Listener<A>>,
}

impl<A: ?Sized> Default for CallbackDispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> CallbackDispatcher<A> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends `listener` unless already present, or with `remove` drops its
    /// first occurrence. Removing an absent listener does nothing.
    pub fn register(&mut self, listener: &Listener<A>, remove: bool) {
        let position = self.listeners.iter().position(|existing| existing == listener);
        match (position, remove) {
            (Some(index), true) => {
                self.listeners.remove(index);
            }
            (None, false) => self.listeners.push(listener.clone()),
            _ => {}
        }
    }

    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.listeners.contains(listener)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Calls every listener in registration order. A failing listener does not
    /// stop the ones after it.
    pub fn fire(&self, args: &A) -> Result<(), DispatchError> {
        let mut failures = Vec::new();
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(error) = listener.call(args) {
                warn!("Listener #{} failed: {}", index, error);
                failures.push(ListenerFailure {
                    index,
                    message: error.to_string(),
                });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                failures,
                total: self.listeners.len(),
            })
        }
    }
}

impl<A: ?Sized> Clone for CallbackDispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}
