//! Animation descriptors
//!
//! An [`Animation`] describes how a committed value change should be
//! interpolated: over which duration, under which easing curve. It
//! carries no state; the scheduler owns the in-flight interpolation.

use crate::easing::Easing;

/// Duration of the near-zero animation used to freeze a value in place
/// without a visible jump.
const INSTANT_DURATION_MS: f32 = 0.1;

/// Describes the duration and curve of one engine-driven interpolation
///
/// Durations are in milliseconds. A zero, negative, or non-finite
/// duration is an unchecked precondition: the scheduler treats such an
/// animation as already complete and resolves it to its end value on
/// the first tick. Callers producing durations from arbitrary
/// arithmetic are responsible for keeping them non-negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub duration_ms: f32,
    pub easing: Easing,
}

impl Animation {
    /// Create an animation with an explicit easing curve
    pub fn with_easing(duration_ms: f32, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }

    /// Linear interpolation over the given duration
    pub fn linear(duration_ms: f32) -> Self {
        Self::with_easing(duration_ms, Easing::Linear)
    }

    /// Ease-in interpolation over the given duration
    pub fn ease_in(duration_ms: f32) -> Self {
        Self::with_easing(duration_ms, Easing::EaseIn)
    }

    /// Ease-out interpolation over the given duration
    pub fn ease_out(duration_ms: f32) -> Self {
        Self::with_easing(duration_ms, Easing::EaseOut)
    }

    /// Ease-in-out interpolation over the given duration
    pub fn ease_in_out(duration_ms: f32) -> Self {
        Self::with_easing(duration_ms, Easing::EaseInOut)
    }

    /// Near-zero-duration linear animation
    ///
    /// Committing a binding's current value under `instant()` resolves
    /// the in-flight interpolation exactly where it is, which is how a
    /// pause freezes the displayed value without a jump.
    pub fn instant() -> Self {
        Self::linear(INSTANT_DURATION_MS)
    }
}
