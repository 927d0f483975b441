//! Animation scheduler
//!
//! The interpolation engine: commits a value change on a binding and
//! interpolates it over the described duration, writing the current
//! interpolated value back into the binding on every tick. The binding
//! therefore always reads as the true current position of the
//! animation, which is what the pause logic relies on.
//!
//! At most one transition is in flight per binding. Committing a new
//! change for a binding supersedes the in-flight one; because the new
//! transition starts from the binding's current (interpolated) value,
//! re-targeting never produces a visible jump.

use crate::animation::Animation;
use crate::values::Animatable;
use pausable_reactive::{SignalId, State};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Handle to a registered transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionId(u64);

/// One in-flight interpolation
struct Transition {
    signal: SignalId,
    animation: Animation,
    elapsed_ms: f32,
    /// Writes the value for an eased progress into the binding
    apply: Box<dyn FnMut(f32) + Send>,
}

impl Transition {
    /// Degenerate durations (zero, negative, non-finite) compare as
    /// already elapsed and resolve to the end value on the first tick.
    fn is_finished(&self) -> bool {
        let duration = self.animation.duration_ms;
        !duration.is_finite() || self.elapsed_ms >= duration
    }
}

struct SchedulerInner {
    transitions: FxHashMap<TransitionId, Transition>,
    /// Supersession index: the one live transition per binding
    by_signal: FxHashMap<SignalId, TransitionId>,
    next_id: u64,
    last_frame: Instant,
}

/// Callback for waking up the main thread from the animation thread
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// The animation scheduler that ticks all active transitions
///
/// Typically owned by the host loop and shared via [`SchedulerHandle`].
/// Ticking can be driven three ways: deterministically with
/// [`advance`](Self::advance), from a render loop with
/// [`tick`](Self::tick), or on a background thread via
/// [`start_background`](Self::start_background).
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    /// Stop signal for the background thread
    stop_flag: Arc<AtomicBool>,
    /// Set by the background thread when a value changed and the host
    /// should redraw
    needs_redraw: Arc<AtomicBool>,
    /// Background thread handle (if running)
    thread_handle: Option<JoinHandle<()>>,
    /// Optional callback to wake up the host loop
    wake_callback: Option<WakeCallback>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                transitions: FxHashMap::default(),
                by_signal: FxHashMap::default(),
                next_id: 0,
                last_frame: Instant::now(),
            })),
            stop_flag: Arc::new(AtomicBool::new(false)),
            needs_redraw: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            wake_callback: None,
        }
    }

    /// Set a callback invoked from the background thread whenever
    /// transitions produced new values
    pub fn set_wake_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_callback = Some(Arc::new(callback));
    }

    /// Get a handle to this scheduler for committing animations
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Advance all transitions by an explicit time step
    ///
    /// Returns true if any transitions are still in flight. This is the
    /// deterministic entry point; [`tick`](Self::tick) derives the step
    /// from wall-clock time and calls this.
    pub fn advance(&self, dt_ms: f32) -> bool {
        advance_inner(&self.inner, dt_ms)
    }

    /// Advance by the wall-clock time elapsed since the previous tick
    pub fn tick(&self) -> bool {
        tick_inner(&self.inner)
    }

    /// Check if any transitions are in flight
    pub fn has_active_animations(&self) -> bool {
        !self.inner.lock().unwrap().transitions.is_empty()
    }

    /// Number of in-flight transitions
    pub fn transition_count(&self) -> usize {
        self.inner.lock().unwrap().transitions.len()
    }

    /// Start ticking on a background thread
    ///
    /// The thread runs at 120fps and keeps interpolating even when the
    /// host loop is idle. It sets the `needs_redraw` flag whenever a
    /// value changed; the host should call
    /// [`take_needs_redraw`](Self::take_needs_redraw) and redraw.
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let inner = Arc::clone(&self.inner);
        let stop_flag = Arc::clone(&self.stop_flag);
        let needs_redraw = Arc::clone(&self.needs_redraw);
        let wake_callback = self.wake_callback.clone();

        self.thread_handle = Some(thread::spawn(move || {
            let frame_duration = Duration::from_micros(1_000_000 / 120);

            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                if tick_inner(&inner) {
                    needs_redraw.store(true, Ordering::Release);
                    if let Some(ref callback) = wake_callback {
                        callback();
                    }
                }

                let elapsed = start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Check if the background thread is running
    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Check and clear the needs_redraw flag
    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Acquire)
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        self.stop_background();
    }
}

/// Advance by the wall-clock time elapsed since the previous frame
fn tick_inner(inner: &Arc<Mutex<SchedulerInner>>) -> bool {
    let dt_ms = {
        let mut guard = inner.lock().unwrap();
        let now = Instant::now();
        let dt = now.duration_since(guard.last_frame).as_secs_f32() * 1000.0;
        guard.last_frame = now;
        dt
    };
    advance_inner(inner, dt_ms)
}

fn advance_inner(inner: &Arc<Mutex<SchedulerInner>>, dt_ms: f32) -> bool {
    // Take the table out of the lock before writing values: binding
    // watchers run during `apply` and may commit new animations, which
    // needs the lock.
    let mut transitions = {
        let mut guard = inner.lock().unwrap();
        std::mem::take(&mut guard.transitions)
    };

    let mut finished: Vec<(TransitionId, SignalId)> = Vec::new();
    for (&id, transition) in transitions.iter_mut() {
        transition.elapsed_ms += dt_ms;
        if transition.is_finished() {
            // Land exactly on the end value
            (transition.apply)(1.0);
            finished.push((id, transition.signal));
        } else {
            let t = transition.elapsed_ms / transition.animation.duration_ms;
            (transition.apply)(transition.animation.easing.apply(t));
        }
    }
    for (id, _) in &finished {
        transitions.remove(id);
    }

    // Merge back, dropping anything superseded by commits made while
    // the table was out.
    let mut guard = inner.lock().unwrap();
    for (id, signal) in finished {
        if guard.by_signal.get(&signal) == Some(&id) {
            guard.by_signal.remove(&signal);
        }
    }
    for (id, transition) in transitions {
        if guard.by_signal.get(&transition.signal) == Some(&id) {
            guard.transitions.insert(id, transition);
        } else {
            tracing::trace!(?id, "transition superseded during tick");
        }
    }
    !guard.transitions.is_empty()
}

/// A weak handle to the animation scheduler
///
/// This is what components hold to commit animated value changes. It
/// won't prevent the scheduler from being dropped; every operation
/// no-ops once the scheduler is gone.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Commit a value change on a binding under an animation
    ///
    /// The interpolation starts from the binding's current value at the
    /// instant of the commit. Any in-flight transition on the same
    /// binding is superseded. Returns `None` if the scheduler or the
    /// binding's signal is gone.
    pub fn animate<T>(&self, state: &State<T>, to: T, animation: Animation) -> Option<TransitionId>
    where
        T: Animatable + PartialEq + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let from = state.try_get()?;
        let signal = state.signal_id();

        let binding = state.clone();
        let apply: Box<dyn FnMut(f32) + Send> = Box::new(move |t| {
            binding.set(from.lerp(&to, t));
        });

        let mut guard = inner.lock().unwrap();
        // Reset the frame clock so a commit from an idle state doesn't
        // see one huge first dt
        guard.last_frame = Instant::now();

        let id = TransitionId(guard.next_id);
        guard.next_id += 1;

        if let Some(prev) = guard.by_signal.insert(signal, id) {
            // May be mid-tick and absent from the table; the tick's
            // merge step drops it either way
            guard.transitions.remove(&prev);
            tracing::debug!(?prev, ?id, "superseding in-flight transition");
        }
        tracing::debug!(
            ?id,
            duration_ms = animation.duration_ms,
            easing = ?animation.easing,
            "committing animated value change"
        );
        guard.transitions.insert(
            id,
            Transition {
                signal,
                animation,
                elapsed_ms: 0.0,
                apply,
            },
        );
        Some(id)
    }

    /// Number of in-flight transitions (0 if the scheduler is gone)
    pub fn transition_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().transitions.len())
            .unwrap_or(0)
    }

    /// Check if a binding currently has an in-flight transition
    pub fn is_animating(&self, signal: SignalId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().by_signal.contains_key(&signal))
            .unwrap_or(false)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
