//! Reactive state primitives for pausable animations
//!
//! A small signal graph with explicit, edge-triggered watchers:
//! - Signals push change notifications to subscribed watchers
//! - Writes of an equal value are no-ops and notify nobody
//! - Watchers run after the graph lock is released, so they may freely
//!   read or write other state
//!
//! # State
//!
//! The [`State<T>`] type is the primary API: a clonable two-way handle
//! to a signal value, backed by a shared [`ReactiveGraph`].
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use pausable_reactive::{ReactiveGraph, State};
//!
//! let graph = Arc::new(Mutex::new(ReactiveGraph::new()));
//! let paused: State<bool> = State::new(false, graph.clone());
//!
//! let watcher = paused.watch(|v| println!("paused changed to {v}")).unwrap();
//! paused.set(true);  // fires the watcher
//! paused.set(true);  // same value: no notification
//! paused.unwatch(watcher);
//! ```

pub mod graph;
pub mod state;

pub use graph::{ReactiveGraph, Signal, SignalId, WatcherId};
pub use state::{SharedReactiveGraph, State};
