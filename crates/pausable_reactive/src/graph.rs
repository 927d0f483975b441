//! Signal graph with explicit watchers
//!
//! Signals hold type-erased values keyed by slotmap ids. Watchers are
//! explicit subscriptions on a single signal; there is no dependency
//! tracking and no derived values. A write only notifies when the value
//! actually changed, which makes repeated writes of the same value
//! no-ops by construction.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::sync::Arc;

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for a watcher subscription
    pub struct WatcherId;
}

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    /// Get the signal's internal ID
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Reconstruct a Signal from a raw SignalId
    ///
    /// The caller must ensure the SignalId refers to a signal of type T.
    pub(crate) fn from_id(id: SignalId) -> Self {
        Signal {
            id,
            _marker: std::marker::PhantomData,
        }
    }
}

/// Type-erased watcher callback, invoked with the new value
type WatcherFn = dyn Fn(&dyn Any) + Send + Sync;

/// Callbacks collected by a write, to be invoked after the graph lock
/// is released
pub(crate) type Notifications = SmallVec<[Arc<WatcherFn>; 2]>;

struct SignalNode {
    /// The signal value (type-erased)
    value: Box<dyn Any + Send>,
    /// Version counter for change detection
    version: u64,
    /// Watchers to notify on change
    watchers: SmallVec<[WatcherId; 2]>,
}

struct WatcherNode {
    signal: SignalId,
    callback: Arc<WatcherFn>,
}

/// The reactive graph that manages all signals and watchers
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
    watchers: SlotMap<WatcherId, WatcherNode>,
    /// Global version counter
    global_version: u64,
}

impl ReactiveGraph {
    /// Create a new reactive graph
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            watchers: SlotMap::with_key(),
            global_version: 0,
        }
    }

    /// Create a new signal with an initial value
    pub fn create_signal<T: Send + 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            version: 0,
            watchers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get the current value of a signal
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Write a new value, returning the watcher callbacks to invoke.
    ///
    /// Writing a value equal to the stored one is a no-op: nothing is
    /// stored and no watcher fires. The returned callbacks must be
    /// invoked by the caller with the new value, after any lock on the
    /// graph has been released.
    #[must_use]
    pub(crate) fn set<T: Send + PartialEq + 'static>(
        &mut self,
        signal: Signal<T>,
        value: T,
    ) -> Notifications {
        let watcher_ids: SmallVec<[WatcherId; 2]> = {
            let Some(node) = self.signals.get_mut(signal.id) else {
                return SmallVec::new();
            };
            if let Some(prev) = node.value.downcast_ref::<T>() {
                if *prev == value {
                    // Edge-trigger: same value, no transition
                    return SmallVec::new();
                }
            }
            node.value = Box::new(value);
            node.version += 1;
            node.watchers.clone()
        };
        self.global_version += 1;

        watcher_ids
            .iter()
            .filter_map(|id| self.watchers.get(*id))
            .map(|w| w.callback.clone())
            .collect()
    }

    /// Subscribe a watcher to a signal
    ///
    /// The callback fires on every actual value transition, with the
    /// new value. Returns `None` if the signal does not exist.
    pub fn watch<T, F>(&mut self, signal: Signal<T>, callback: F) -> Option<WatcherId>
    where
        T: 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        if !self.signals.contains_key(signal.id) {
            return None;
        }
        let erased: Arc<WatcherFn> = Arc::new(move |any: &dyn Any| {
            if let Some(value) = any.downcast_ref::<T>() {
                callback(value);
            }
        });
        let id = self.watchers.insert(WatcherNode {
            signal: signal.id,
            callback: erased,
        });
        self.signals[signal.id].watchers.push(id);
        Some(id)
    }

    /// Remove a watcher subscription
    pub fn unwatch(&mut self, id: WatcherId) {
        if let Some(node) = self.watchers.remove(id) {
            if let Some(sig) = self.signals.get_mut(node.signal) {
                sig.watchers.retain(|w| *w != id);
            }
        }
    }

    /// Get the version of a signal (for change detection)
    pub fn signal_version(&self, id: SignalId) -> Option<u64> {
        self.signals.get(id).map(|n| n.version)
    }

    /// Number of live watcher subscriptions
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn drain(notifications: Notifications, value: &dyn Any) {
        for cb in notifications {
            cb(value);
        }
    }

    #[test]
    fn signal_create_get_set() {
        let mut graph = ReactiveGraph::new();

        let count = graph.create_signal(0i32);
        assert_eq!(graph.get(count), Some(0));

        let _ = graph.set(count, 42);
        assert_eq!(graph.get(count), Some(42));
    }

    #[test]
    fn set_equal_value_is_noop() {
        let mut graph = ReactiveGraph::new();
        let count = graph.create_signal(7i32);
        let v0 = graph.signal_version(count.id()).unwrap();

        let notifications = graph.set(count, 7);
        assert!(notifications.is_empty());
        assert_eq!(graph.signal_version(count.id()), Some(v0));

        let notifications = graph.set(count, 8);
        assert!(notifications.is_empty()); // changed, but no watchers yet
        assert_eq!(graph.signal_version(count.id()), Some(v0 + 1));
    }

    #[test]
    fn watcher_fires_on_transition_only() {
        let mut graph = ReactiveGraph::new();
        let flag = graph.create_signal(false);
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        graph
            .watch(flag, move |v: &bool| {
                seen_clone.lock().unwrap().push(*v);
            })
            .unwrap();

        let n = graph.set(flag, true);
        drain(n, &true);
        let n = graph.set(flag, true); // no transition
        drain(n, &true);
        let n = graph.set(flag, false);
        drain(n, &false);

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn unwatch_stops_delivery() {
        let mut graph = ReactiveGraph::new();
        let flag = graph.create_signal(0i32);
        let hits = std::sync::Arc::new(Mutex::new(0));

        let hits_clone = hits.clone();
        let watcher = graph
            .watch(flag, move |_: &i32| {
                *hits_clone.lock().unwrap() += 1;
            })
            .unwrap();

        let n = graph.set(flag, 1);
        drain(n, &1i32);
        assert_eq!(*hits.lock().unwrap(), 1);

        graph.unwatch(watcher);
        assert_eq!(graph.watcher_count(), 0);

        let n = graph.set(flag, 2);
        assert!(n.is_empty());
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn watch_missing_signal_returns_none() {
        let mut graph = ReactiveGraph::new();
        let phantom: Signal<i32> = Signal::from_id(SignalId::default());
        assert!(graph.watch(phantom, |_: &i32| {}).is_none());
    }
}
