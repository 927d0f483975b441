//! Pause and resume an in-flight animation
//!
//! A [`PausableAnimation`] watches a pause flag and translates its
//! transitions into two opposite commits on the animated binding:
//!
//! - flag turns true: the binding's current interpolated value is
//!   committed back under [`Animation::instant`], which supersedes the
//!   in-flight interpolation exactly where it is; the displayed value
//!   freezes with no visible jump.
//! - flag turns false: the caller's remaining-duration function maps
//!   the current value to the animation time still needed, and the
//!   original target is committed under an animation of that duration;
//!   motion resumes toward the target at the correctly scaled pace.
//!
//! Each flag transition triggers exactly one engine commit. There are
//! no timers and no per-frame sampling here; the scheduler performs the
//! actual interpolation. Writes of an unchanged flag value are no-ops
//! because the reactive layer only notifies on actual transitions.
//!
//! The animator holds no value of its own: the scheduler writes the
//! interpolated value into the binding on every tick, so the binding
//! readout at the instant of a transition *is* the tracked in-flight
//! value.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use pausable_reactive::{ReactiveGraph, State};
//! use pausable_animation::{Animation, AnimationScheduler, PausableAnimation};
//!
//! let scheduler = AnimationScheduler::new();
//! let graph = Arc::new(Mutex::new(ReactiveGraph::new()));
//! let angle = State::new(0.0f32, graph.clone());
//! let paused = State::new(false, graph);
//!
//! let _animator = PausableAnimation::attach(
//!     scheduler.handle(),
//!     angle.clone(),
//!     360.0,
//!     Arc::new(|current: &f32| 6000.0 * (1.0 - current / 360.0)),
//!     Arc::new(Animation::linear),
//!     paused.clone(),
//! )
//! .unwrap();
//!
//! // Start the full rotation, as the host does on mount
//! scheduler.handle().animate(&angle, 360.0, Animation::linear(6000.0));
//! scheduler.advance(3000.0);
//!
//! paused.set(true);   // freezes at 180
//! paused.set(false);  // resumes toward 360 over the remaining 3000ms
//! ```

use crate::animation::Animation;
use crate::scheduler::SchedulerHandle;
use crate::values::Animatable;
use pausable_reactive::{State, WatcherId};
use std::sync::Arc;
use thiserror::Error;

/// Maps the current animated value to the animation time (in
/// milliseconds) still needed to reach the target
///
/// Must be total over the value's domain. A negative or non-finite
/// result is an unchecked precondition; the scheduler resolves such an
/// animation to its end value on the first tick.
pub type RemainingDurationFn<T> = Arc<dyn Fn(&T) -> f32 + Send + Sync>;

/// Builds the animation used for a resume, given a remaining duration
/// in milliseconds
pub type AnimationFn = Arc<dyn Fn(f32) -> Animation + Send + Sync>;

/// Failure to attach a pausable animation
#[derive(Debug, Error)]
pub enum AttachError {
    /// The animation scheduler was dropped before attaching
    #[error("animation scheduler is gone")]
    SchedulerGone,
    /// The pause flag's signal is no longer registered
    #[error("pause flag signal is no longer registered")]
    PauseFlagGone,
}

/// Pause/resume decoration on one animated binding
///
/// Attached for the lifetime of the returned value; dropping it removes
/// the flag watcher and leaves the binding untouched. The flag is
/// externally owned and is the sole trigger: the animator itself never
/// writes it.
pub struct PausableAnimation {
    paused: State<bool>,
    watcher: WatcherId,
}

impl std::fmt::Debug for PausableAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PausableAnimation")
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}

impl PausableAnimation {
    /// Attach pause/resume behavior to an animated binding
    ///
    /// `binding` is the live animated value, `target_value` the fixed
    /// destination the running animation converges to,
    /// `remaining_duration` the pure map from current value to the
    /// milliseconds left, `animation` the curve factory for the resumed
    /// transition, and `paused` the externally owned flag.
    ///
    /// The initial state is running: the caller starts the first
    /// animation toward `target_value` itself (typically right after
    /// attaching), exactly as the decorated view would on mount.
    pub fn attach<T>(
        handle: SchedulerHandle,
        binding: State<T>,
        target_value: T,
        remaining_duration: RemainingDurationFn<T>,
        animation: AnimationFn,
        paused: State<bool>,
    ) -> Result<Self, AttachError>
    where
        T: Animatable + PartialEq + Send + Sync + 'static,
    {
        if !handle.is_alive() {
            return Err(AttachError::SchedulerGone);
        }

        let watcher = paused
            .watch(move |is_paused: &bool| {
                let Some(current) = binding.try_get() else {
                    return;
                };
                if *is_paused {
                    // Freeze: resolve the in-flight interpolation at
                    // its current value
                    tracing::debug!("pause: freezing value in place");
                    handle.animate(&binding, current, Animation::instant());
                } else {
                    let remaining_ms = remaining_duration(&current);
                    tracing::debug!(remaining_ms, "resume: committing target");
                    handle.animate(&binding, target_value.clone(), animation(remaining_ms));
                }
            })
            .ok_or(AttachError::PauseFlagGone)?;

        Ok(Self { paused, watcher })
    }
}

impl Drop for PausableAnimation {
    fn drop(&mut self) {
        self.paused.unwatch(self.watcher);
    }
}

/// Attachment sugar on the binding itself
///
/// Mirrors decorating the animated value directly:
/// `angle.pausable_animation(handle, 360.0, remaining, animation, paused)`.
pub trait PausableExt<T>
where
    T: Animatable + PartialEq + Send + Sync + 'static,
{
    fn pausable_animation(
        &self,
        handle: SchedulerHandle,
        target_value: T,
        remaining_duration: RemainingDurationFn<T>,
        animation: AnimationFn,
        paused: State<bool>,
    ) -> Result<PausableAnimation, AttachError>;
}

impl<T> PausableExt<T> for State<T>
where
    T: Animatable + PartialEq + Send + Sync + 'static,
{
    fn pausable_animation(
        &self,
        handle: SchedulerHandle,
        target_value: T,
        remaining_duration: RemainingDurationFn<T>,
        animation: AnimationFn,
        paused: State<bool>,
    ) -> Result<PausableAnimation, AttachError> {
        PausableAnimation::attach(
            handle,
            self.clone(),
            target_value,
            remaining_duration,
            animation,
            paused,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::AnimationScheduler;
    use pausable_reactive::{ReactiveGraph, SharedReactiveGraph};
    use std::sync::Mutex;

    const FULL_DURATION_MS: f32 = 6000.0;
    const END_ANGLE: f32 = 360.0;

    fn graph() -> SharedReactiveGraph {
        Arc::new(Mutex::new(ReactiveGraph::new()))
    }

    /// Linear remaining-duration: duration * (1 - progress)
    fn remaining(current: &f32) -> f32 {
        FULL_DURATION_MS * (1.0 - current / END_ANGLE)
    }

    struct Fixture {
        scheduler: AnimationScheduler,
        angle: State<f32>,
        paused: State<bool>,
        _animator: PausableAnimation,
    }

    /// Mounts the rotating-view scenario: 0 -> 360 over 6s, linear
    fn mount() -> Fixture {
        let scheduler = AnimationScheduler::new();
        let shared = graph();
        let angle = State::new(0.0f32, shared.clone());
        let paused = State::new(false, shared);

        let remaining: RemainingDurationFn<f32> = Arc::new(remaining);
        let linear: AnimationFn = Arc::new(Animation::linear);
        let animator = angle
            .pausable_animation(
                scheduler.handle(),
                END_ANGLE,
                remaining,
                linear,
                paused.clone(),
            )
            .unwrap();

        scheduler
            .handle()
            .animate(&angle, END_ANGLE, Animation::linear(FULL_DURATION_MS));

        Fixture {
            scheduler,
            angle,
            paused,
            _animator: animator,
        }
    }

    #[test]
    fn pause_freezes_at_current_interpolated_value() {
        let fx = mount();

        fx.scheduler.advance(3000.0);
        assert!((fx.angle.get() - 180.0).abs() < 1e-3);

        fx.paused.set(true);
        // No jump at the pause boundary
        assert!((fx.angle.get() - 180.0).abs() < 1e-3);

        // The instant freeze resolves and the value stays put
        fx.scheduler.advance(16.0);
        fx.scheduler.advance(5000.0);
        assert_eq!(fx.angle.get(), 180.0);
        assert!(!fx.scheduler.has_active_animations());
    }

    #[test]
    fn resume_rescales_remaining_duration() {
        let fx = mount();

        fx.scheduler.advance(3000.0);
        fx.paused.set(true);
        fx.scheduler.advance(16.0);

        fx.paused.set(false);
        // remaining(180) = 3000ms; halfway through it the angle is 270
        fx.scheduler.advance(1500.0);
        assert!((fx.angle.get() - 270.0).abs() < 1e-3);

        fx.scheduler.advance(1500.0);
        assert_eq!(fx.angle.get(), END_ANGLE);
        assert!(!fx.scheduler.has_active_animations());
    }

    #[test]
    fn round_trip_preserves_total_duration() {
        // Pause at the midpoint: 3000ms elapsed before, 3000ms needed
        // after, 6000ms total to target.
        let fx = mount();

        fx.scheduler.advance(3000.0);
        fx.paused.set(true);
        fx.scheduler.advance(16.0);
        fx.paused.set(false);

        fx.scheduler.advance(2999.0);
        assert!(fx.angle.get() < END_ANGLE);
        fx.scheduler.advance(1.0);
        assert_eq!(fx.angle.get(), END_ANGLE);
    }

    #[test]
    fn repeated_flag_writes_are_noops() {
        let fx = mount();
        let handle = fx.scheduler.handle();

        // false -> false while running: the original transition keeps
        // flying, nothing new is committed
        fx.scheduler.advance(1000.0);
        fx.paused.set(false);
        assert_eq!(handle.transition_count(), 1);
        fx.scheduler.advance(2000.0);
        assert!((fx.angle.get() - 180.0).abs() < 1e-3);

        // true -> true once frozen: no new commit appears
        fx.paused.set(true);
        fx.scheduler.advance(16.0);
        assert_eq!(handle.transition_count(), 0);
        fx.paused.set(true);
        assert_eq!(handle.transition_count(), 0);
        assert_eq!(fx.angle.get(), 180.0);
    }

    #[test]
    fn pause_at_start_keeps_full_duration() {
        let fx = mount();

        fx.paused.set(true);
        fx.scheduler.advance(16.0);
        assert_eq!(fx.angle.get(), 0.0);

        // remaining(0) = full duration: resume replays the whole thing
        fx.paused.set(false);
        fx.scheduler.advance(FULL_DURATION_MS / 2.0);
        assert!((fx.angle.get() - 180.0).abs() < 1e-3);
        fx.scheduler.advance(FULL_DURATION_MS / 2.0);
        assert_eq!(fx.angle.get(), END_ANGLE);
    }

    #[test]
    fn pause_at_end_resumes_instantaneously() {
        let fx = mount();

        fx.scheduler.advance(FULL_DURATION_MS);
        assert_eq!(fx.angle.get(), END_ANGLE);

        fx.paused.set(true);
        fx.scheduler.advance(16.0);

        // remaining(360) = 0: the resume resolves on the first tick
        fx.paused.set(false);
        fx.scheduler.advance(0.0);
        assert_eq!(fx.angle.get(), END_ANGLE);
        assert!(!fx.scheduler.has_active_animations());
    }

    #[test]
    fn detach_stops_reacting() {
        let scheduler = AnimationScheduler::new();
        let shared = graph();
        let angle = State::new(0.0f32, shared.clone());
        let paused = State::new(false, shared);

        let animator = PausableAnimation::attach(
            scheduler.handle(),
            angle.clone(),
            END_ANGLE,
            Arc::new(remaining),
            Arc::new(Animation::linear),
            paused.clone(),
        )
        .unwrap();

        scheduler
            .handle()
            .animate(&angle, END_ANGLE, Animation::linear(FULL_DURATION_MS));
        scheduler.advance(3000.0);

        drop(animator);
        paused.set(true);
        // No freeze commit happened: the original transition is still
        // the one in flight and keeps moving
        scheduler.advance(1500.0);
        assert!((angle.get() - 270.0).abs() < 1e-3);
    }

    #[test]
    fn attach_fails_when_scheduler_gone() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };
        let shared = graph();
        let angle = State::new(0.0f32, shared.clone());
        let paused = State::new(false, shared);

        let err = PausableAnimation::attach(
            handle,
            angle,
            END_ANGLE,
            Arc::new(remaining),
            Arc::new(Animation::linear),
            paused,
        )
        .unwrap_err();
        assert!(matches!(err, AttachError::SchedulerGone));
    }

    #[test]
    fn works_for_vector_values() {
        use crate::values::Vec2;

        let scheduler = AnimationScheduler::new();
        let shared = graph();
        let offset = State::new(Vec2::ZERO, shared.clone());
        let paused = State::new(false, shared);
        let target = Vec2::new(100.0, 50.0);

        let _animator = offset
            .pausable_animation(
                scheduler.handle(),
                target,
                Arc::new(|current: &Vec2| 1000.0 * (1.0 - current.x / 100.0)),
                Arc::new(Animation::linear),
                paused.clone(),
            )
            .unwrap();

        scheduler
            .handle()
            .animate(&offset, target, Animation::linear(1000.0));
        scheduler.advance(400.0);
        assert!(offset.get().approx_eq(&Vec2::new(40.0, 20.0), 1e-3));

        paused.set(true);
        scheduler.advance(16.0);
        assert!(offset.get().approx_eq(&Vec2::new(40.0, 20.0), 1e-3));

        // remaining(x=40) = 600ms
        paused.set(false);
        scheduler.advance(300.0);
        assert!(offset.get().approx_eq(&Vec2::new(70.0, 35.0), 1e-3));
        scheduler.advance(300.0);
        assert!(offset.get().approx_eq(&target, 1e-6));
    }
}
