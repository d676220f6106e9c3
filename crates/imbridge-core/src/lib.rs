#![forbid(unsafe_code)]

//! Core: input vocabulary, event accumulation, and frame gating.
//!
//! Nothing in this crate talks to a host or a GUI library. It turns a stream
//! of per-callback events into one per-frame input snapshot and decides when
//! that snapshot is ready; `imbridge-runtime` drives it.

pub mod accumulator;
pub mod event;
pub mod frame_gate;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};
