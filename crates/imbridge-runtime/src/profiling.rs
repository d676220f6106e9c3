#![forbid(unsafe_code)]

//! Optional scoped timing of lifecycle phases.
//!
//! Each phase runs inside a [`PhaseTimer`]: a tracing span is always entered,
//! and when a [`PhaseTimingSink`] is configured the elapsed time is reported
//! on drop. Timers observe; they never influence control flow.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug_span;

/// A phase of the frame lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Prepare,
    Pump,
    Begin,
    Render,
    Teardown,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Pump => "pump",
            Self::Begin => "begin",
            Self::Render => "render",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSample {
    pub phase: Phase,
    pub frame_idx: u64,
    pub duration_us: u64,
}

/// Sink for phase timing samples.
pub trait PhaseTimingSink: Send + Sync {
    fn record_phase(&self, sample: &PhaseSample);
}

/// Configuration for phase timing capture.
#[derive(Clone)]
pub struct PhaseTimingConfig {
    pub sink: Arc<dyn PhaseTimingSink>,
}

impl PhaseTimingConfig {
    #[must_use]
    pub fn new(sink: Arc<dyn PhaseTimingSink>) -> Self {
        Self { sink }
    }
}

impl fmt::Debug for PhaseTimingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseTimingConfig")
            .field("sink", &"<dyn PhaseTimingSink>")
            .finish()
    }
}

/// Scoped timer for one phase. Reports to the sink when dropped.
#[must_use = "the phase is timed until the timer is dropped"]
pub struct PhaseTimer {
    phase: Phase,
    frame_idx: u64,
    sink: Option<Arc<dyn PhaseTimingSink>>,
    start: Instant,
    _span: tracing::span::EnteredSpan,
}

impl PhaseTimer {
    pub fn start(phase: Phase, frame_idx: u64, config: Option<&PhaseTimingConfig>) -> Self {
        let span = match phase {
            Phase::Prepare => debug_span!("imbridge.frame.prepare", frame_idx),
            Phase::Pump => debug_span!("imbridge.input.pump", frame_idx),
            Phase::Begin => debug_span!("imbridge.frame.begin", frame_idx),
            Phase::Render => debug_span!("imbridge.frame.render", frame_idx),
            Phase::Teardown => debug_span!("imbridge.teardown", frame_idx),
        };
        Self {
            phase,
            frame_idx,
            sink: config.map(|c| Arc::clone(&c.sink)),
            start: Instant::now(),
            _span: span.entered(),
        }
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.record_phase(&PhaseSample {
                phase: self.phase,
                frame_idx: self.frame_idx,
                duration_us: self.start.elapsed().as_micros() as u64,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<PhaseSample>>);

    impl PhaseTimingSink for Collect {
        fn record_phase(&self, sample: &PhaseSample) {
            self.0.lock().unwrap().push(*sample);
        }
    }

    #[test]
    fn timer_reports_on_drop() {
        let sink = Arc::new(Collect::default());
        let config = PhaseTimingConfig::new(sink.clone());
        {
            let _t = PhaseTimer::start(Phase::Render, 7, Some(&config));
            assert!(sink.0.lock().unwrap().is_empty());
        }
        let samples = sink.0.lock().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].phase, Phase::Render);
        assert_eq!(samples[0].frame_idx, 7);
    }

    #[test]
    fn timer_without_sink_is_silent() {
        let _t = PhaseTimer::start(Phase::Prepare, 0, None);
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::Pump.to_string(), "pump");
        assert_eq!(Phase::Teardown.as_str(), "teardown");
    }
}
