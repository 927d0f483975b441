//! Pausable Animation
//!
//! Pause and resume an in-flight value animation, preserving the
//! current interpolated value and rescaling the remaining duration on
//! resume.
//!
//! # Features
//!
//! - **PausableAnimation**: freezes the animated value in place on
//!   pause, resumes toward the original target over the caller-computed
//!   remaining duration
//! - **Reactive bindings**: the animated value and the pause flag are
//!   [`State`](pausable_reactive::State) handles; pause/resume is
//!   edge-triggered on actual flag transitions
//! - **Interpolation engine**: a tick-driven scheduler commits value
//!   changes and interpolates them under an [`Animation`] descriptor;
//!   re-committing a binding supersedes its in-flight transition with
//!   no jump
//! - **Typed values**: anything implementing [`Animatable`] can be
//!   animated (floats, vectors, colors)
//!
//! The scheduler stands in for the declarative host engine that the
//! pause/resume logic was designed against: current-value readout,
//! animated value commits, and change notification are the only
//! primitives the core uses.

pub mod animation;
pub mod easing;
pub mod pausable;
pub mod scheduler;
pub mod values;

pub use animation::Animation;
pub use easing::Easing;
pub use pausable::{
    AnimationFn, AttachError, PausableAnimation, PausableExt, RemainingDurationFn,
};
pub use scheduler::{AnimationScheduler, SchedulerHandle, TransitionId, WakeCallback};
pub use values::{Animatable, Color, Vec2, Vec3};
