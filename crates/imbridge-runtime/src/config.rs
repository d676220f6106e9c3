#![forbid(unsafe_code)]

//! Controller configuration.

use crate::deferred::ExecutionMode;
use crate::profiling::PhaseTimingConfig;

/// What to do with a host event whose tag is outside the closed tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Reject the event with `BridgeError::UnknownEventTag`.
    #[default]
    Fail,
    /// Log a warning and ignore the event.
    Skip,
}

/// Configuration for a [`FrameLifecycleController`](crate::FrameLifecycleController).
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// How the host drives frames; selects the deferred render resume point.
    pub execution_mode: ExecutionMode,
    pub unknown_tag_policy: UnknownTagPolicy,
    /// Phase timing capture. `None` disables sample reporting (spans remain).
    pub phase_timing: Option<PhaseTimingConfig>,
}

impl BridgeConfig {
    #[must_use]
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    #[must_use]
    pub fn with_unknown_tag_policy(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tag_policy = policy;
        self
    }

    #[must_use]
    pub fn with_phase_timing(mut self, config: PhaseTimingConfig) -> Self {
        self.phase_timing = Some(config);
        self
    }

    /// Editor-style hosts: cooperative ticking.
    #[must_use]
    pub fn cooperative() -> Self {
        Self::default().with_execution_mode(ExecutionMode::Cooperative)
    }
}
