#![forbid(unsafe_code)]

//! imbridge public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a small
//! prelude for host integrations.
//!
//! ```
//! use imbridge::prelude::*;
//!
//! let mut sim = HostSimulator::new(BridgeConfig::default()).unwrap();
//! let rendered = sim
//!     .run_frame(SourceId(1), &[HostEvent::mouse_move(4.0, 2.0)])
//!     .unwrap();
//! assert!(rendered);
//! ```

// --- Core re-exports -------------------------------------------------------

pub use imbridge_core::accumulator::{
    AccumulatedFrameState, AccumulatorMap, ClassFlags, Classification, EventAccumulator, SourceId,
    Transition, classify,
};
pub use imbridge_core::event::{
    EventTag, HostEvent, KeyCode, KeyEvent, Modifiers, MouseButton, RawInputEvent, UnknownEventTag,
    Vec2,
};
pub use imbridge_core::frame_gate::{FrameGate, GateStats, RepaintSignal, is_ready};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use imbridge_runtime::{
    ActiveContext, BridgeConfig, BridgeError, BridgeResult, ControllerBuilder, ControllerStatus,
    DeferredExecution, ExecutionMode, FrameLifecycleController, FrameLifecycleState, FrameMetrics,
    FramePhase, GuiContext, HostSimulator, ManualDeferral, PhaseTimingConfig, PhaseTimingSink,
    Platform, Renderer, ResumePoint, UnknownTagPolicy,
};

#[cfg(feature = "tracing-json")]
pub use imbridge_core::logging::init_json_subscriber;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{HostEvent, KeyCode, Modifiers, MouseButton, RepaintSignal, SourceId, Vec2};

    #[cfg(feature = "runtime")]
    pub use crate::{
        BridgeConfig, BridgeError, BridgeResult, ExecutionMode, FrameLifecycleController,
        GuiContext, HostSimulator, Platform, Renderer, ResumePoint,
    };

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use imbridge_core as core;
#[cfg(feature = "runtime")]
pub use imbridge_runtime as runtime;
