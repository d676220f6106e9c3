#![forbid(unsafe_code)]

//! Headless host simulator for deterministic testing.
//!
//! [`HostSimulator`] wires a [`FrameLifecycleController`] to recording
//! collaborators that append every call they receive to one shared, ordered
//! [`CallLog`]. Tests feed host events and then assert on the exact sequence
//! of GUI, renderer, and deferral calls.
//!
//! # Example
//!
//! ```
//! use imbridge_core::accumulator::SourceId;
//! use imbridge_core::event::HostEvent;
//! use imbridge_runtime::config::BridgeConfig;
//! use imbridge_runtime::simulator::HostSimulator;
//!
//! let mut sim = HostSimulator::new(BridgeConfig::cooperative()).unwrap();
//! let src = SourceId(1);
//! sim.dispatch(src, HostEvent::mouse_move(5.0, 5.0)).unwrap();
//! sim.dispatch(src, HostEvent::repaint()).unwrap();
//! assert_eq!(sim.new_frames(), 1);
//!
//! sim.controller_mut().tick().unwrap();
//! assert_eq!(sim.submissions(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use imbridge_core::accumulator::SourceId;
use imbridge_core::event::{HostEvent, KeyCode, Modifiers, MouseButton, Vec2};
use imbridge_core::frame_gate::RepaintSignal;

use crate::collab::{FrameMetrics, GuiContext, Platform, Renderer};
use crate::config::BridgeConfig;
use crate::deferred::{DeferredExecution, ResumePoint};
use crate::error::BridgeResult;
use crate::lifecycle::{DispatchOutcome, FrameLifecycleController, PumpOutcome};

/// One call received by a recording collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Activate,
    Deactivate,
    SetFrameMetrics(FrameMetrics),
    Key { code: KeyCode, down: bool },
    Modifiers(Modifiers),
    Character(char),
    MouseButton { button: MouseButton, down: bool },
    MousePos(Vec2),
    MouseWheel(Vec2),
    NewFrame,
    Render,
    Submit { frame: u64 },
    DeferRequest(ResumePoint),
    DeferCancel(ResumePoint),
    RendererShutdown,
    PlatformShutdown,
}

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<HostCall>>>);

impl CallLog {
    pub fn push(&self, call: HostCall) {
        self.0.borrow_mut().push(call);
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<HostCall> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    #[must_use]
    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|call| pred(call)).count()
    }
}

/// Draw data produced by [`RecordingGui`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimDrawData {
    /// Index of the rendered frame.
    pub frame: u64,
}

/// GUI context that records calls and flags use while inactive.
#[derive(Debug)]
pub struct RecordingGui {
    log: CallLog,
    active: bool,
    atlas_built: Cell<bool>,
    misuse: usize,
    new_frames: usize,
    draw_data: SimDrawData,
    rendered: u64,
}

impl RecordingGui {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            active: false,
            atlas_built: Cell::new(true),
            misuse: 0,
            new_frames: 0,
            draw_data: SimDrawData::default(),
            rendered: 0,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Simulate the font atlas being (un)built.
    pub fn set_atlas_built(&self, built: bool) {
        self.atlas_built.set(built);
    }

    /// Calls that arrived while the context was not current.
    #[must_use]
    pub fn misuse_count(&self) -> usize {
        self.misuse
    }

    #[must_use]
    pub fn new_frame_count(&self) -> usize {
        self.new_frames
    }

    fn record(&mut self, call: HostCall) {
        if !self.active {
            self.misuse += 1;
        }
        self.log.push(call);
    }
}

impl GuiContext for RecordingGui {
    type DrawData = SimDrawData;

    fn activate(&mut self) {
        self.active = true;
        self.log.push(HostCall::Activate);
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.log.push(HostCall::Deactivate);
    }

    fn is_ready_to_render(&self) -> bool {
        self.atlas_built.get()
    }

    fn set_frame_metrics(&mut self, metrics: &FrameMetrics) {
        self.record(HostCall::SetFrameMetrics(*metrics));
    }

    fn add_key_event(&mut self, key: KeyCode, down: bool) {
        self.record(HostCall::Key { code: key, down });
    }

    fn add_modifiers(&mut self, modifiers: Modifiers) {
        self.record(HostCall::Modifiers(modifiers));
    }

    fn add_input_character(&mut self, character: char) {
        self.record(HostCall::Character(character));
    }

    fn add_mouse_button_event(&mut self, button: MouseButton, down: bool) {
        self.record(HostCall::MouseButton { button, down });
    }

    fn add_mouse_pos_event(&mut self, position: Vec2) {
        self.record(HostCall::MousePos(position));
    }

    fn add_mouse_wheel_event(&mut self, delta: Vec2) {
        self.record(HostCall::MouseWheel(delta));
    }

    fn new_frame(&mut self) {
        self.new_frames += 1;
        self.record(HostCall::NewFrame);
    }

    fn render(&mut self) {
        self.draw_data = SimDrawData {
            frame: self.rendered,
        };
        self.rendered += 1;
        self.record(HostCall::Render);
    }

    fn draw_data(&self) -> &SimDrawData {
        &self.draw_data
    }
}

/// Platform with a fixed display and frame time.
#[derive(Debug)]
pub struct ScriptedPlatform {
    log: CallLog,
    metrics: FrameMetrics,
}

impl ScriptedPlatform {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            metrics: FrameMetrics {
                display_size: Vec2::new(1280.0, 720.0),
                ..FrameMetrics::default()
            },
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: FrameMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Platform for ScriptedPlatform {
    fn frame_metrics(&mut self) -> FrameMetrics {
        self.metrics
    }

    fn shutdown(&mut self) {
        self.log.push(HostCall::PlatformShutdown);
    }
}

/// Renderer that records submissions.
#[derive(Debug)]
pub struct RecordingRenderer {
    log: CallLog,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl Renderer<SimDrawData> for RecordingRenderer {
    fn submit(&mut self, draw_data: &SimDrawData) {
        self.log.push(HostCall::Submit {
            frame: draw_data.frame,
        });
    }

    fn shutdown(&mut self) {
        self.log.push(HostCall::RendererShutdown);
    }
}

/// Deferral hook that records requests and cancellations.
#[derive(Debug)]
pub struct RecordingDeferral {
    log: CallLog,
}

impl RecordingDeferral {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl DeferredExecution for RecordingDeferral {
    fn request(&mut self, point: ResumePoint) {
        self.log.push(HostCall::DeferRequest(point));
    }

    fn cancel(&mut self, point: ResumePoint) {
        self.log.push(HostCall::DeferCancel(point));
    }
}

/// A controller wired to recording collaborators.
pub struct HostSimulator {
    controller: FrameLifecycleController<RecordingGui>,
    log: CallLog,
}

impl HostSimulator {
    /// Build and initialize a simulator with `config`.
    pub fn new(config: BridgeConfig) -> BridgeResult<Self> {
        let log = CallLog::default();
        let mut controller = FrameLifecycleController::builder(RecordingGui::new(log.clone()))
            .platform(ScriptedPlatform::new(log.clone()))
            .renderer(RecordingRenderer::new(log.clone()))
            .deferral(RecordingDeferral::new(log.clone()))
            .config(config)
            .build();
        controller.init()?;
        Ok(Self { controller, log })
    }

    #[must_use]
    pub fn controller(&self) -> &FrameLifecycleController<RecordingGui> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FrameLifecycleController<RecordingGui> {
        &mut self.controller
    }

    pub fn dispatch(
        &mut self,
        source: SourceId,
        event: HostEvent,
    ) -> BridgeResult<DispatchOutcome> {
        self.controller.dispatch(source, event)
    }

    /// Dispatch events one callback at a time, stopping at the first error.
    pub fn dispatch_all(
        &mut self,
        source: SourceId,
        events: &[HostEvent],
    ) -> BridgeResult<Vec<DispatchOutcome>> {
        events
            .iter()
            .map(|event| self.controller.dispatch(source, *event))
            .collect()
    }

    pub fn pump(
        &mut self,
        source: SourceId,
        events: &[HostEvent],
        signal: RepaintSignal,
    ) -> BridgeResult<PumpOutcome> {
        self.controller.pump(source, events.iter().copied(), signal)
    }

    /// One continuously ticking host frame: pump with a repaint signal, then
    /// reach the end-of-frame sync point. Returns whether a frame rendered.
    pub fn run_frame(&mut self, source: SourceId, events: &[HostEvent]) -> BridgeResult<bool> {
        self.pump(source, events, RepaintSignal::Repaint)?;
        self.controller.end_of_frame()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.log.snapshot()
    }

    pub fn clear_calls(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.log.count(pred)
    }

    #[must_use]
    pub fn new_frames(&self) -> usize {
        self.count(|call| matches!(call, HostCall::NewFrame))
    }

    #[must_use]
    pub fn submissions(&self) -> usize {
        self.count(|call| matches!(call, HostCall::Submit { .. }))
    }

    /// Pointer positions forwarded to the GUI context, in order.
    #[must_use]
    pub fn forwarded_positions(&self) -> Vec<Vec2> {
        self.log
            .snapshot()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::MousePos(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::ExecutionMode;

    const SRC: SourceId = SourceId(1);

    #[test]
    fn new_simulator_is_enabled_and_idle() {
        let sim = HostSimulator::new(BridgeConfig::default()).unwrap();
        assert!(sim.calls().is_empty());
        assert_eq!(sim.controller().frame_index(), 0);
    }

    #[test]
    fn run_frame_renders_once() {
        let mut sim = HostSimulator::new(BridgeConfig::default()).unwrap();
        let events = [HostEvent::mouse_move(1.0, 2.0)];
        assert!(sim.run_frame(SRC, &events).unwrap());
        assert_eq!(sim.new_frames(), 1);
        assert_eq!(sim.submissions(), 1);
        assert_eq!(sim.forwarded_positions(), vec![Vec2::new(1.0, 2.0)]);
        assert_eq!(
            sim.count(|c| *c == HostCall::DeferRequest(ResumePoint::EndOfFrame)),
            1
        );
    }

    #[test]
    fn draw_data_frames_increase() {
        let mut sim = HostSimulator::new(BridgeConfig::default()).unwrap();
        sim.run_frame(SRC, &[]).unwrap();
        sim.run_frame(SRC, &[]).unwrap();
        let frames: Vec<u64> = sim
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Submit { frame } => Some(frame),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![0, 1]);
    }

    #[test]
    fn cooperative_mode_requests_next_tick() {
        let config = BridgeConfig::default().with_execution_mode(ExecutionMode::Cooperative);
        let mut sim = HostSimulator::new(config).unwrap();
        sim.dispatch(SRC, HostEvent::repaint()).unwrap();
        assert_eq!(
            sim.count(|c| *c == HostCall::DeferRequest(ResumePoint::NextTick)),
            1
        );
    }

    #[test]
    fn clear_calls_empties_log() {
        let mut sim = HostSimulator::new(BridgeConfig::default()).unwrap();
        sim.run_frame(SRC, &[]).unwrap();
        sim.clear_calls();
        assert!(sim.calls().is_empty());
    }
}
