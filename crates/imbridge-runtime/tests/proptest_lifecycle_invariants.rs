//! Property-based invariant tests for the frame lifecycle controller.
//!
//! For any sequence of host operations:
//!
//! 1. The lifecycle flags stay consistent (`begun` ⇒ `prepared` ∧ `ready`,
//!    `render_deferred` ⇒ `begun`).
//! 2. `new_frame` is called at most once per rendered frame (never twice
//!    without a render in between).
//! 3. Every submission is preceded by exactly one `new_frame` of its frame.
//! 4. At most one deferral is live at any time.
//! 5. The GUI context is never left current and never used while inactive.
//! 6. After shutdown nothing renders.

use imbridge_core::accumulator::SourceId;
use imbridge_core::event::{HostEvent, KeyCode};
use imbridge_core::frame_gate::RepaintSignal;
use imbridge_runtime::config::BridgeConfig;
use imbridge_runtime::deferred::ExecutionMode;
use imbridge_runtime::simulator::{HostCall, HostSimulator};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Dispatch(u64, HostEvent),
    Pump(u64, Vec<HostEvent>, bool),
    EnsureFrame,
    EndOfFrame,
    Tick,
    EndFrame,
}

// ── Strategies ────────────────────────────────────────────────────────────

fn event() -> impl Strategy<Value = HostEvent> {
    prop_oneof![
        (0.0f32..100.0, 0.0f32..100.0).prop_map(|(x, y)| HostEvent::mouse_move(x, y)),
        (0u8..3).prop_map(HostEvent::mouse_down),
        (0u8..3).prop_map(HostEvent::mouse_up),
        prop::char::range('A', 'Z').prop_map(|c| HostEvent::key_down(KeyCode::Letter(c))),
        prop::char::range('A', 'Z').prop_map(|c| HostEvent::key_up(KeyCode::Letter(c))),
        (-3.0f32..3.0).prop_map(|dy| HostEvent::scroll(0.0, dy)),
        (0.0f32..100.0, 0.0f32..100.0).prop_map(|(x, y)| HostEvent::layout(x, y)),
        Just(HostEvent::repaint()),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1u64..4, event()).prop_map(|(s, e)| Op::Dispatch(s, e)),
        2 => (1u64..4, prop::collection::vec(event(), 0..6), any::<bool>())
            .prop_map(|(s, es, r)| Op::Pump(s, es, r)),
        1 => Just(Op::EnsureFrame),
        1 => Just(Op::EndOfFrame),
        1 => Just(Op::Tick),
        1 => Just(Op::EndFrame),
    ]
}

fn mode() -> impl Strategy<Value = ExecutionMode> {
    prop_oneof![
        Just(ExecutionMode::Continuous),
        Just(ExecutionMode::Cooperative),
    ]
}

fn simulator(mode: ExecutionMode) -> HostSimulator {
    HostSimulator::new(BridgeConfig::default().with_execution_mode(mode)).unwrap()
}

fn apply(sim: &mut HostSimulator, op: &Op) {
    match op {
        Op::Dispatch(s, e) => {
            sim.dispatch(SourceId(*s), *e).unwrap();
        }
        Op::Pump(s, es, repaint) => {
            let signal = RepaintSignal::from(*repaint);
            sim.pump(SourceId(*s), es, signal).unwrap();
        }
        Op::EnsureFrame => {
            sim.controller_mut().ensure_frame().unwrap();
        }
        Op::EndOfFrame => {
            sim.controller_mut().end_of_frame().unwrap();
        }
        Op::Tick => {
            sim.controller_mut().tick().unwrap();
        }
        Op::EndFrame => {
            sim.controller_mut().end_frame().unwrap();
        }
    }
}

proptest! {
    #[test]
    fn flags_stay_consistent(mode in mode(), ops in prop::collection::vec(op(), 0..60)) {
        let mut sim = simulator(mode);
        for op in &ops {
            apply(&mut sim, op);
            prop_assert!(sim.controller().state().is_consistent());
            prop_assert!(!sim.controller().gui().is_active());
        }
        prop_assert_eq!(sim.controller().gui().misuse_count(), 0);
    }

    #[test]
    fn new_frame_and_render_alternate(mode in mode(), ops in prop::collection::vec(op(), 0..60)) {
        let mut sim = simulator(mode);
        for op in &ops {
            apply(&mut sim, op);
        }
        let mut open = false;
        for call in sim.calls() {
            match call {
                HostCall::NewFrame => {
                    prop_assert!(!open, "new_frame twice without render");
                    open = true;
                }
                HostCall::Render => {
                    prop_assert!(open, "render without new_frame");
                    open = false;
                }
                _ => {}
            }
        }
        prop_assert_eq!(open, sim.controller().state().begun);
        let stats = sim.controller().stats();
        prop_assert_eq!(stats.renders, sim.controller().frame_index());
        prop_assert_eq!(sim.submissions() as u64, stats.renders);
    }

    #[test]
    fn at_most_one_live_deferral(mode in mode(), ops in prop::collection::vec(op(), 0..60)) {
        let mut sim = simulator(mode);
        for op in &ops {
            apply(&mut sim, op);
        }
        // Requests minus (cancels + deferred renders) never exceeds one.
        let requests = sim.count(|c| matches!(c, HostCall::DeferRequest(_)));
        prop_assert_eq!(requests as u64, sim.controller().stats().begins);
        prop_assert!(sim.controller().stats().begins - sim.controller().stats().renders <= 1);
    }

    #[test]
    fn nothing_renders_after_shutdown(mode in mode(), ops in prop::collection::vec(op(), 0..40)) {
        let mut sim = simulator(mode);
        for op in &ops {
            apply(&mut sim, op);
        }
        let was_begun = sim.controller().state().begun;
        let before = sim.submissions();
        sim.controller_mut().shutdown().unwrap();
        prop_assert_eq!(sim.submissions(), before + usize::from(was_begun));

        let after = sim.submissions();
        prop_assert!(!sim.controller_mut().end_of_frame().unwrap());
        prop_assert!(!sim.controller_mut().tick().unwrap());
        prop_assert!(!sim.controller_mut().end_frame().unwrap());
        prop_assert_eq!(sim.submissions(), after);
    }

    #[test]
    fn repaint_pump_always_begins(mode in mode(), events in prop::collection::vec(event(), 0..8)) {
        let mut sim = simulator(mode);
        let out = sim.pump(SourceId(1), &events, RepaintSignal::Repaint).unwrap();
        prop_assert!(out.began);
        prop_assert_eq!(sim.new_frames(), 1);
    }
}
