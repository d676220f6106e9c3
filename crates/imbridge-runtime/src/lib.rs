#![forbid(unsafe_code)]

//! imbridge Runtime
//!
//! Drives an immediate-mode GUI library from a host that delivers input one
//! event per callback and repaints on its own schedule.
//!
//! # Key Components
//!
//! - [`FrameLifecycleController`] - per-frame prepare, begin, and render state machine
//! - [`GuiContext`], [`Platform`], [`Renderer`] - collaborator interfaces
//! - [`DeferredExecution`] - how the host schedules the deferred render
//! - [`BridgeConfig`] - execution mode, unknown-tag policy, phase timing
//! - [`HostSimulator`] - headless host for deterministic tests
//!
//! # How it fits in the system
//! `imbridge-core` folds raw host events into per-source snapshots and answers
//! "is this frame ready?". This crate decides what to do with that answer:
//! when to call into the GUI library, when to render, and what to do with
//! input that arrives mid-frame.

pub mod collab;
pub mod config;
pub mod context;
pub mod deferred;
pub mod error;
pub mod lifecycle;
pub mod profiling;
pub mod simulator;

pub use collab::{FrameMetrics, GuiContext, Platform, Renderer};
pub use config::{BridgeConfig, UnknownTagPolicy};
pub use context::ActiveContext;
pub use deferred::{DeferredExecution, ExecutionMode, ManualDeferral, ResumePoint};
pub use error::{BridgeError, BridgeResult};
pub use lifecycle::{
    ControllerBuilder, ControllerStats, ControllerStatus, DispatchOutcome, FrameLifecycleController,
    FrameLifecycleState, FramePhase, PumpOutcome,
};
pub use profiling::{Phase, PhaseSample, PhaseTimer, PhaseTimingConfig, PhaseTimingSink};
pub use simulator::{HostCall, HostSimulator};

pub use imbridge_core::accumulator::SourceId;
pub use imbridge_core::event::HostEvent;
pub use imbridge_core::frame_gate::RepaintSignal;
