#![forbid(unsafe_code)]

//! Frame readiness decision.
//!
//! The gate answers one question: is the accumulated input for this frame
//! complete enough to hand to layout? Editor-style hosts evaluate the gate
//! once per raw event, so a "not ready" answer simply means "keep
//! accumulating".
//!
//! # Decision Rule
//!
//! A frame is ready when a repaint-class signal was observed either
//! 1) in the accumulated state (a `Repaint` event was folded), or
//! 2) in the evaluation call itself ([`RepaintSignal::Repaint`]).
//!
//! The rule is pure and deterministic. Guarding against a second frame-begin
//! after a ready answer is the lifecycle controller's job, not the gate's.

use crate::accumulator::AccumulatedFrameState;

/// The host's indication of whether the current dispatch pass is the drawing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepaintSignal {
    /// Ordinary input dispatch.
    #[default]
    Idle,
    /// The host is about to draw.
    Repaint,
}

impl From<bool> for RepaintSignal {
    fn from(repaint: bool) -> Self {
        if repaint { Self::Repaint } else { Self::Idle }
    }
}

/// Pure readiness decision.
#[must_use]
pub fn is_ready(state: &AccumulatedFrameState, signal: RepaintSignal) -> bool {
    state.ready_to_render || signal == RepaintSignal::Repaint
}

/// Counters describing the gate's decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub evaluations: u64,
    pub ready: u64,
    pub not_ready: u64,
}

/// [`is_ready`] plus decision counters.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    stats: GateStats,
}

impl FrameGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate readiness and record the decision.
    pub fn evaluate(&mut self, state: &AccumulatedFrameState, signal: RepaintSignal) -> bool {
        let ready = is_ready(state, signal);
        self.stats.evaluations += 1;
        if ready {
            self.stats.ready += 1;
        } else {
            self.stats.not_ready += 1;
        }
        crate::trace!(
            ready,
            signal = ?signal,
            folded = state.event_count,
            "frame gate evaluated"
        );
        ready
    }

    #[must_use]
    pub fn stats(&self) -> GateStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = GateStats::default();
    }
}
