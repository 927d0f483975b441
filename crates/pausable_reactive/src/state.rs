//! High-level state handles
//!
//! [`State<T>`] wraps a signal with thread-safe access to a shared
//! [`ReactiveGraph`]. It is the two-way binding type used by callers:
//! the animated value and the pause flag are both `State` handles.

use crate::graph::{ReactiveGraph, Signal, SignalId, WatcherId};
use std::any::Any;
use std::sync::{Arc, Mutex};

/// Shared reactive graph for thread-safe access
pub type SharedReactiveGraph = Arc<Mutex<ReactiveGraph>>;

/// A bound state value with direct get/set methods
///
/// Cloning a `State` yields another handle to the same signal. Writes
/// notify watchers only on an actual value transition; watchers run
/// after the graph lock has been released, so a watcher may read or
/// write any state, including the signal it observes.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use pausable_reactive::{ReactiveGraph, State};
///
/// let graph = Arc::new(Mutex::new(ReactiveGraph::new()));
/// let angle: State<f32> = State::new(0.0, graph);
///
/// angle.set(90.0);
/// assert_eq!(angle.get(), 90.0);
/// ```
#[derive(Clone)]
pub struct State<T> {
    signal: Signal<T>,
    graph: SharedReactiveGraph,
}

impl<T: Clone + PartialEq + Send + 'static> State<T> {
    /// Create a new state value backed by the given graph
    pub fn new(initial: T, graph: SharedReactiveGraph) -> Self {
        let signal = graph.lock().unwrap().create_signal(initial);
        Self { signal, graph }
    }

    /// Get the current value
    pub fn get(&self) -> T
    where
        T: Default,
    {
        self.graph
            .lock()
            .unwrap()
            .get(self.signal)
            .unwrap_or_default()
    }

    /// Get the current value, returning None if the signal is gone
    pub fn try_get(&self) -> Option<T> {
        self.graph.lock().unwrap().get(self.signal)
    }

    /// Set a new value
    ///
    /// Watchers fire only when the value actually changed, after the
    /// graph lock has been released.
    pub fn set(&self, value: T) {
        let notifications = self.graph.lock().unwrap().set(self.signal, value.clone());
        for callback in notifications {
            callback(&value as &dyn Any);
        }
    }

    /// Update the value using a function
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        if let Some(current) = self.try_get() {
            self.set(f(current));
        }
    }

    /// Subscribe a watcher to this state's transitions
    ///
    /// Returns `None` if the signal is no longer registered.
    pub fn watch<F>(&self, callback: F) -> Option<WatcherId>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.graph.lock().unwrap().watch(self.signal, callback)
    }

    /// Remove a watcher subscription
    pub fn unwatch(&self, id: WatcherId) {
        self.graph.lock().unwrap().unwatch(id);
    }

    /// Get the signal ID (for keying per-binding bookkeeping)
    pub fn signal_id(&self) -> SignalId {
        self.signal.id()
    }
}
