#![forbid(unsafe_code)]

//! Frame lifecycle controller.
//!
//! [`FrameLifecycleController`] owns the per-frame transition sequence
//!
//! ```text
//! NotPrepared --ensure_frame--> Prepared --events--> InputPumping
//!      ^                                                  |
//!      |                                          gate says ready
//!      |                                                  v
//!      +------------ render (deferred or forced) ------ Begun
//! ```
//!
//! # Invariants
//!
//! - `begun` implies `prepared` and `ready`; `render_deferred` implies `begun`.
//! - At most one deferred render is registered at a time.
//! - Render happens at most once per begun frame, and only after begin.
//! - All four lifecycle flags reset together when a render completes.
//! - Every entry point activates the owning GUI context and leaves no context
//!   current on exit.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Platform or renderer missing at `init` | `MissingCollaborator`, stays disabled |
//! | Font atlas not built at begin/render | `Precondition`, controller faults |
//! | Unknown host tag | `UnknownEventTag` (or skipped, per policy) |
//! | `end_frame`/`resume` while not begun | No-op |
//! | Input event while begun | Carried over into the next frame |
//! | Repaint or layout pass while begun | Dropped; it belongs to the begun frame |

use imbridge_core::accumulator::{
    AccumulatedFrameState, AccumulatorMap, Classification, SourceId, classify,
};
use imbridge_core::event::{HostEvent, KeyCode, RawInputEvent};
use imbridge_core::frame_gate::{FrameGate, GateStats, RepaintSignal};
use tracing::{debug, error, info, warn};

use crate::collab::{GuiContext, Platform, Renderer};
use crate::config::{BridgeConfig, UnknownTagPolicy};
use crate::context::ActiveContext;
use crate::deferred::{DeferredExecution, ManualDeferral, ResumePoint};
use crate::error::{BridgeError, BridgeResult};
use crate::profiling::{Phase, PhaseTimer};

/// The controller's four lifecycle flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameLifecycleState {
    pub prepared: bool,
    pub begun: bool,
    /// The gate reported ready. Set before the begin preconditions are
    /// checked, so a frame that faulted while beginning stays observable.
    pub ready: bool,
    pub render_deferred: bool,
}

impl FrameLifecycleState {
    /// Whether the flag invariants hold.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (!self.begun || (self.prepared && self.ready)) && (!self.render_deferred || self.begun)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Coarse lifecycle phase derived from the flags and pending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    NotPrepared,
    Prepared,
    InputPumping,
    /// The gate said ready but the frame has not begun.
    Ready,
    Begun,
}

/// Whether the controller accepts work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerStatus {
    /// Not yet initialized, failed initialization, or shut down.
    #[default]
    Disabled,
    Enabled,
    /// A precondition failed; only `shutdown` is meaningful.
    Faulted,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub prepares: u64,
    pub begins: u64,
    pub renders: u64,
    /// Renders forced synchronously by `shutdown`.
    pub forced_renders: u64,
    /// Input events that arrived while a frame was begun.
    pub carried_events: u64,
    /// Events dropped under [`UnknownTagPolicy::Skip`].
    pub skipped_events: u64,
}

/// Result of [`FrameLifecycleController::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchOutcome {
    pub classification: Classification,
    /// The event arrived while a frame was begun and was held for the next frame.
    pub carried: bool,
    /// This call began the frame.
    pub began: bool,
    pub phase: FramePhase,
}

/// Result of [`FrameLifecycleController::pump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpOutcome {
    /// Events with GUI relevance folded into the accumulator.
    pub folded: u32,
    /// Events held for the next frame.
    pub carried: u32,
    pub began: bool,
    pub phase: FramePhase,
}

/// Builder for [`FrameLifecycleController`].
pub struct ControllerBuilder<G: GuiContext> {
    gui: G,
    platform: Option<Box<dyn Platform>>,
    renderer: Option<Box<dyn Renderer<G::DrawData>>>,
    deferral: Option<Box<dyn DeferredExecution>>,
    config: BridgeConfig,
}

impl<G: GuiContext> ControllerBuilder<G> {
    pub fn new(gui: G) -> Self {
        Self {
            gui,
            platform: None,
            renderer: None,
            deferral: None,
            config: BridgeConfig::default(),
        }
    }

    #[must_use]
    pub fn platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: impl Renderer<G::DrawData> + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    #[must_use]
    pub fn deferral(mut self, deferral: impl DeferredExecution + 'static) -> Self {
        self.deferral = Some(Box::new(deferral));
        self
    }

    #[must_use]
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a disabled controller; call [`FrameLifecycleController::init`] next.
    pub fn build(self) -> FrameLifecycleController<G> {
        FrameLifecycleController {
            gui: self.gui,
            core: Core {
                config: self.config,
                platform: self.platform,
                renderer: self.renderer,
                deferral: self.deferral.unwrap_or_else(|| Box::new(ManualDeferral)),
                status: ControllerStatus::Disabled,
                state: FrameLifecycleState::default(),
                accumulators: AccumulatorMap::new(),
                gate: FrameGate::new(),
                carried: Vec::new(),
                frame_idx: 0,
                stats: ControllerStats::default(),
            },
        }
    }
}

/// Reconciles per-event host input with the GUI library's per-frame model.
///
/// One controller per GUI context. Single-threaded.
pub struct FrameLifecycleController<G: GuiContext> {
    gui: G,
    core: Core<G::DrawData>,
}

/// Everything except the GUI context, so the context can be borrowed by an
/// [`ActiveContext`] guard while the rest of the state is mutated.
struct Core<D> {
    config: BridgeConfig,
    platform: Option<Box<dyn Platform>>,
    renderer: Option<Box<dyn Renderer<D>>>,
    deferral: Box<dyn DeferredExecution>,
    status: ControllerStatus,
    state: FrameLifecycleState,
    accumulators: AccumulatorMap,
    gate: FrameGate,
    carried: Vec<(SourceId, RawInputEvent)>,
    frame_idx: u64,
    stats: ControllerStats,
}

impl<G: GuiContext> FrameLifecycleController<G> {
    /// Shorthand for [`ControllerBuilder::new`].
    pub fn builder(gui: G) -> ControllerBuilder<G> {
        ControllerBuilder::new(gui)
    }

    /// Enable the controller.
    ///
    /// Fails with [`BridgeError::MissingCollaborator`] if the platform or
    /// renderer was never provided; the controller then stays disabled.
    /// No-op when already enabled.
    pub fn init(&mut self) -> BridgeResult<()> {
        match self.core.status {
            ControllerStatus::Enabled => return Ok(()),
            ControllerStatus::Faulted => return Err(BridgeError::Inactive),
            ControllerStatus::Disabled => {}
        }
        let missing = if self.core.platform.is_none() {
            Some("platform")
        } else if self.core.renderer.is_none() {
            Some("renderer")
        } else {
            None
        };
        if let Some(what) = missing {
            error!(collaborator = what, "cannot enable controller");
            return Err(BridgeError::MissingCollaborator(what));
        }
        self.core.state.reset();
        self.core.status = ControllerStatus::Enabled;
        info!(mode = ?self.core.config.execution_mode, "controller enabled");
        Ok(())
    }

    /// Disable the controller and release collaborator resources.
    ///
    /// A begun frame is rendered synchronously first, and its deferred
    /// registration is withdrawn, so no continuation renders after teardown.
    /// If the forced render fails, resources are still released and the
    /// error is returned.
    pub fn shutdown(&mut self) -> BridgeResult<()> {
        if self.core.status == ControllerStatus::Disabled {
            return Ok(());
        }
        let mut result = Ok(());
        {
            let mut gui = ActiveContext::enter(&mut self.gui);
            let core = &mut self.core;
            let _timer = core.timer(Phase::Teardown);

            if core.state.begun && core.status == ControllerStatus::Enabled {
                debug!(
                    frame_idx = core.frame_idx,
                    "forcing pending render before teardown"
                );
                match core.render(&mut *gui, RenderCause::Forced) {
                    Ok(_) => core.stats.forced_renders += 1,
                    Err(err) => result = Err(err),
                }
            }
            if core.state.render_deferred {
                let point = core.resume_point();
                core.deferral.cancel(point);
            }
            core.state.reset();
            core.accumulators.clear_all();
            core.carried.clear();

            if let Some(renderer) = core.renderer.as_mut() {
                renderer.shutdown();
            }
            if let Some(platform) = core.platform.as_mut() {
                platform.shutdown();
            }
            core.status = ControllerStatus::Disabled;
        }
        info!("controller shut down");
        result
    }

    /// Prepare a frame if none is prepared. Returns whether preparation ran.
    pub fn ensure_frame(&mut self) -> BridgeResult<bool> {
        self.core.ensure_enabled()?;
        let mut gui = ActiveContext::enter(&mut self.gui);
        self.core.prepare(&mut *gui)
    }

    /// Feed one host event (editor-style, one call per host callback).
    ///
    /// The event is folded into `source`'s accumulator, its immediate side
    /// effects are forwarded, and the frame begins if the gate reports ready.
    pub fn dispatch(
        &mut self,
        source: SourceId,
        event: HostEvent,
    ) -> BridgeResult<DispatchOutcome> {
        self.core.ensure_enabled()?;
        let Some(raw) = self.core.decode(event)? else {
            return Ok(DispatchOutcome {
                classification: Classification::default(),
                carried: false,
                began: false,
                phase: self.phase(),
            });
        };

        let mut gui = ActiveContext::enter(&mut self.gui);
        let core = &mut self.core;
        core.prepare(&mut *gui)?;

        let _timer = core.timer(Phase::Pump);
        if core.state.begun {
            let (classification, carried) = core.carry(source, raw);
            return Ok(DispatchOutcome {
                classification,
                carried,
                began: false,
                phase: core.phase(),
            });
        }

        let classification = core.fold(&mut *gui, source, raw);
        let began = core.begin_if_ready(&mut *gui, source, RepaintSignal::Idle)?;
        Ok(DispatchOutcome {
            classification,
            carried: false,
            began,
            phase: core.phase(),
        })
    }

    /// Feed a whole dispatch batch, then evaluate the gate once.
    ///
    /// Used by continuously ticking hosts that poll input once per frame;
    /// `signal` is typically [`RepaintSignal::Repaint`]. The frame never
    /// begins on a partially folded batch.
    pub fn pump<I>(
        &mut self,
        source: SourceId,
        events: I,
        signal: RepaintSignal,
    ) -> BridgeResult<PumpOutcome>
    where
        I: IntoIterator<Item = HostEvent>,
    {
        self.core.ensure_enabled()?;
        let mut decoded = Vec::new();
        for event in events {
            if let Some(raw) = self.core.decode(event)? {
                decoded.push(raw);
            }
        }

        let mut gui = ActiveContext::enter(&mut self.gui);
        let core = &mut self.core;
        core.prepare(&mut *gui)?;

        let _timer = core.timer(Phase::Pump);
        let mut folded = 0;
        let mut carried = 0;
        for raw in decoded {
            if core.state.begun {
                if core.carry(source, raw).1 {
                    carried += 1;
                }
            } else if !core.fold(&mut *gui, source, raw).is_empty() {
                folded += 1;
            }
        }
        let began = core.begin_if_ready(&mut *gui, source, signal)?;
        debug!(
            source = source.0,
            folded,
            carried,
            began,
            "pumped input batch"
        );
        Ok(PumpOutcome {
            folded,
            carried,
            began,
            phase: core.phase(),
        })
    }

    /// Evaluate the gate for `source` without a new event, beginning the
    /// frame if ready. Returns whether this call began the frame.
    pub fn evaluate(&mut self, source: SourceId, signal: RepaintSignal) -> BridgeResult<bool> {
        self.core.ensure_enabled()?;
        let mut gui = ActiveContext::enter(&mut self.gui);
        let core = &mut self.core;
        core.prepare(&mut *gui)?;
        core.begin_if_ready(&mut *gui, source, signal)
    }

    /// Deferred continuation: render if a render is registered at `point`.
    ///
    /// Returns whether a render happened. No-op on a disabled controller.
    pub fn resume(&mut self, point: ResumePoint) -> BridgeResult<bool> {
        let core = &mut self.core;
        if core.status != ControllerStatus::Enabled
            || !core.state.render_deferred
            || core.resume_point() != point
        {
            return Ok(false);
        }
        let mut gui = ActiveContext::enter(&mut self.gui);
        self.core.render(&mut *gui, RenderCause::Deferred)
    }

    /// End-of-frame synchronization point of a continuously ticking host.
    pub fn end_of_frame(&mut self) -> BridgeResult<bool> {
        self.resume(ResumePoint::EndOfFrame)
    }

    /// Update tick of a cooperatively ticking host.
    pub fn tick(&mut self) -> BridgeResult<bool> {
        self.resume(ResumePoint::NextTick)
    }

    /// Render now if a frame is begun; otherwise a no-op.
    pub fn end_frame(&mut self) -> BridgeResult<bool> {
        if self.core.status != ControllerStatus::Enabled || !self.core.state.begun {
            return Ok(false);
        }
        let mut gui = ActiveContext::enter(&mut self.gui);
        self.core.render(&mut *gui, RenderCause::Explicit)
    }

    /// Activate the GUI context for layout work between begin and render.
    pub fn context(&mut self) -> ActiveContext<'_, G> {
        ActiveContext::enter(&mut self.gui)
    }

    /// Forget an input source, its accumulated state, and its carried events.
    pub fn remove_source(&mut self, source: SourceId) -> bool {
        let _gui = ActiveContext::enter(&mut self.gui);
        self.core.carried.retain(|(s, _)| *s != source);
        self.core.accumulators.remove(source)
    }

    #[must_use]
    pub fn gui(&self) -> &G {
        &self.gui
    }

    #[must_use]
    pub fn state(&self) -> FrameLifecycleState {
        self.core.state
    }

    #[must_use]
    pub fn phase(&self) -> FramePhase {
        self.core.phase()
    }

    #[must_use]
    pub fn status(&self) -> ControllerStatus {
        self.core.status
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.core.frame_idx
    }

    #[must_use]
    pub fn stats(&self) -> ControllerStats {
        self.core.stats
    }

    #[must_use]
    pub fn gate_stats(&self) -> GateStats {
        self.core.gate.stats()
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.core.config
    }

    /// Accumulated input of `source` for the current frame.
    #[must_use]
    pub fn accumulated(&self, source: SourceId) -> Option<&AccumulatedFrameState> {
        self.core.accumulators.get(source).map(|acc| acc.state())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderCause {
    Deferred,
    Explicit,
    Forced,
}

impl<D> Core<D> {
    fn ensure_enabled(&self) -> BridgeResult<()> {
        match self.status {
            ControllerStatus::Enabled => Ok(()),
            _ => Err(BridgeError::Inactive),
        }
    }

    fn resume_point(&self) -> ResumePoint {
        self.config.execution_mode.resume_point()
    }

    fn timer(&self, phase: Phase) -> PhaseTimer {
        PhaseTimer::start(phase, self.frame_idx, self.config.phase_timing.as_ref())
    }

    fn phase(&self) -> FramePhase {
        let s = self.state;
        if s.begun {
            FramePhase::Begun
        } else if s.ready {
            FramePhase::Ready
        } else if !s.prepared {
            FramePhase::NotPrepared
        } else if self.accumulators.has_pending() {
            FramePhase::InputPumping
        } else {
            FramePhase::Prepared
        }
    }

    /// Boundary conversion. `Ok(None)` means skipped by policy.
    fn decode(&mut self, event: HostEvent) -> BridgeResult<Option<RawInputEvent>> {
        match RawInputEvent::try_from(event) {
            Ok(raw) => Ok(Some(raw)),
            Err(unknown) => match self.config.unknown_tag_policy {
                UnknownTagPolicy::Fail => {
                    error!(tag = unknown.0, "unrecognized host event tag");
                    Err(unknown.into())
                }
                UnknownTagPolicy::Skip => {
                    warn!(tag = unknown.0, "skipping unrecognized host event tag");
                    self.stats.skipped_events += 1;
                    Ok(None)
                }
            },
        }
    }

    fn prepare<G>(&mut self, gui: &mut G) -> BridgeResult<bool>
    where
        G: GuiContext<DrawData = D> + ?Sized,
    {
        if self.state.prepared {
            return Ok(false);
        }
        let Some(platform) = self.platform.as_mut() else {
            return Err(BridgeError::Precondition("no platform"));
        };
        let _timer = PhaseTimer::start(
            Phase::Prepare,
            self.frame_idx,
            self.config.phase_timing.as_ref(),
        );

        let metrics = platform.frame_metrics();
        gui.set_frame_metrics(&metrics);
        self.accumulators.clear_all();
        self.state.prepared = true;
        self.stats.prepares += 1;

        let carried = std::mem::take(&mut self.carried);
        let replayed = carried.len();
        for (source, raw) in carried {
            self.fold(gui, source, raw);
        }
        debug!(
            frame_idx = self.frame_idx,
            width = metrics.display_size.x,
            height = metrics.display_size.y,
            replayed,
            "frame prepared"
        );
        Ok(true)
    }

    /// Hold an input event that arrived while a frame is begun. Repaint and
    /// layout passes belong to the begun frame and are dropped. Returns the
    /// classification and whether the event was held.
    fn carry(&mut self, source: SourceId, raw: RawInputEvent) -> (Classification, bool) {
        let classification = classify(&raw);
        let held = !classification.is_empty()
            && !matches!(raw, RawInputEvent::Repaint | RawInputEvent::Layout { .. });
        if held {
            self.carried.push((source, raw));
            self.stats.carried_events += 1;
        }
        (classification, held)
    }

    /// Fold into the source's accumulator and forward immediate side effects.
    fn fold<G>(&mut self, gui: &mut G, source: SourceId, raw: RawInputEvent) -> Classification
    where
        G: GuiContext<DrawData = D> + ?Sized,
    {
        let c = self.accumulators.entry(source).process(raw);
        if !c.forwards_immediately() {
            return c;
        }
        if let Some(modifiers) = c.modifiers {
            gui.add_modifiers(modifiers);
        }
        if let Some((key, transition)) = c.key {
            if key.code != KeyCode::None {
                gui.add_key_event(key.code, transition.is_down());
            }
            if transition.is_down()
                && let Some(ch) = key.character.filter(|ch| !ch.is_control())
            {
                gui.add_input_character(ch);
            }
        }
        if let Some((button, transition)) = c.button {
            gui.add_mouse_button_event(button, transition.is_down());
        }
        if let Some(delta) = c.scroll {
            gui.add_mouse_wheel_event(delta);
        }
        c
    }

    fn begin_if_ready<G>(
        &mut self,
        gui: &mut G,
        source: SourceId,
        signal: RepaintSignal,
    ) -> BridgeResult<bool>
    where
        G: GuiContext<DrawData = D> + ?Sized,
    {
        if self.state.begun {
            return Ok(false);
        }
        let accumulated = self
            .accumulators
            .get(source)
            .map(|acc| *acc.state())
            .unwrap_or_default();
        if !self.gate.evaluate(&accumulated, signal) {
            return Ok(false);
        }
        self.state.ready = true;
        if !gui.is_ready_to_render() {
            return Err(self.fault("font atlas is not built"));
        }

        let _timer = self.timer(Phase::Begin);
        if let Some(position) = accumulated.pointer {
            gui.add_mouse_pos_event(position);
        }
        gui.new_frame();
        self.state.begun = true;
        self.state.render_deferred = true;
        let point = self.resume_point();
        self.deferral.request(point);
        self.stats.begins += 1;
        debug_assert!(self.state.is_consistent());
        debug!(
            frame_idx = self.frame_idx,
            source = source.0,
            resume = ?point,
            "frame begun"
        );
        Ok(true)
    }

    fn render<G>(&mut self, gui: &mut G, cause: RenderCause) -> BridgeResult<bool>
    where
        G: GuiContext<DrawData = D> + ?Sized,
    {
        if !self.state.begun {
            return Ok(false);
        }
        if !self.state.prepared {
            return Err(self.fault("render without a prepared input context"));
        }
        if !gui.is_ready_to_render() {
            return Err(self.fault("font atlas is not built"));
        }

        if self.renderer.is_none() {
            return Err(self.fault("no renderer to submit draw data"));
        }

        let _timer = self.timer(Phase::Render);
        gui.render();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.submit(gui.draw_data());
        }

        if self.state.render_deferred && cause != RenderCause::Deferred {
            let point = self.resume_point();
            self.deferral.cancel(point);
        }
        self.state.reset();
        self.stats.renders += 1;
        debug!(frame_idx = self.frame_idx, cause = ?cause, "frame rendered");
        self.frame_idx += 1;
        Ok(true)
    }

    fn fault(&mut self, what: &'static str) -> BridgeError {
        error!(
            reason = what,
            frame_idx = self.frame_idx,
            "controller faulted"
        );
        self.status = ControllerStatus::Faulted;
        BridgeError::Precondition(what)
    }
}
