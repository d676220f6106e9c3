#![forbid(unsafe_code)]

//! Deferred render scheduling.
//!
//! Deferral is control flow, not concurrency: a begun frame records a
//! one-shot [`ResumePoint`], and the host later calls back into the
//! controller (`end_of_frame` or `tick`) on the same thread. The
//! [`DeferredExecution`] hook only tells the host that such a call is wanted
//! (for example to queue an editor repaint); it never runs anything itself.

/// Where a deferred render resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResumePoint {
    /// After all per-frame work of the current host frame completes.
    EndOfFrame,
    /// On the host's next update tick.
    NextTick,
}

/// How the host drives frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// The host ticks continuously and offers an end-of-frame sync point.
    #[default]
    Continuous,
    /// The host ticks cooperatively (editor-style), one callback per event.
    Cooperative,
}

impl ExecutionMode {
    /// Resume point used for deferred renders in this mode.
    #[must_use]
    pub const fn resume_point(self) -> ResumePoint {
        match self {
            Self::Continuous => ResumePoint::EndOfFrame,
            Self::Cooperative => ResumePoint::NextTick,
        }
    }
}

/// Host hook notified when a deferred render is registered or withdrawn.
pub trait DeferredExecution {
    /// A render is now pending at `point`.
    fn request(&mut self, point: ResumePoint);

    /// The render pending at `point` will no longer fire.
    fn cancel(&mut self, point: ResumePoint);
}

/// Hook for hosts that call `end_of_frame`/`tick` unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualDeferral;

impl DeferredExecution for ManualDeferral {
    fn request(&mut self, _point: ResumePoint) {}

    fn cancel(&mut self, _point: ResumePoint) {}
}
