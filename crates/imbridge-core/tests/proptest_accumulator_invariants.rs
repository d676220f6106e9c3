//! Property-based invariant tests for event accumulation and frame gating.
//!
//! These tests verify invariants that must hold for any event sequence:
//!
//! 1. Captured values equal the last-seen value per class, regardless of
//!    interleaving across classes.
//! 2. Every class touched has its flag set.
//! 3. Flags only grow while a frame accumulates.
//! 4. Readiness is reached iff a repaint was folded or signalled.
//! 5. Irrelevant events never change the state.

use imbridge_core::accumulator::{ClassFlags, EventAccumulator, Transition, classify};
use imbridge_core::event::{KeyCode, KeyEvent, Modifiers, MouseButton, RawInputEvent, Vec2};
use imbridge_core::frame_gate::{RepaintSignal, is_ready};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn vec2_strategy() -> impl Strategy<Value = Vec2> {
    (-2000i32..2000, -2000i32..2000).prop_map(|(x, y)| Vec2::new(x as f32, y as f32))
}

fn key_strategy() -> impl Strategy<Value = KeyEvent> {
    (prop::char::range('A', 'Z'), 0u8..16).prop_map(|(c, m)| {
        KeyEvent::new(KeyCode::Letter(c)).with_modifiers(Modifiers::from_bits_truncate(m))
    })
}

fn relevant_event_strategy() -> impl Strategy<Value = RawInputEvent> {
    prop_oneof![
        key_strategy().prop_map(RawInputEvent::KeyDown),
        key_strategy().prop_map(RawInputEvent::KeyUp),
        (0u8..5).prop_map(|b| RawInputEvent::MouseDown {
            button: MouseButton(b),
            modifiers: Modifiers::NONE,
        }),
        (0u8..5).prop_map(|b| RawInputEvent::MouseUp {
            button: MouseButton(b),
            modifiers: Modifiers::NONE,
        }),
        vec2_strategy().prop_map(|delta| RawInputEvent::Scroll { delta }),
        vec2_strategy().prop_map(|position| RawInputEvent::MouseMove { position }),
        vec2_strategy().prop_map(|position| RawInputEvent::Layout { position }),
    ]
}

fn irrelevant_event_strategy() -> impl Strategy<Value = RawInputEvent> {
    prop_oneof![
        Just(RawInputEvent::MouseDrag),
        Just(RawInputEvent::DragUpdated),
        Just(RawInputEvent::DragExited),
        Just(RawInputEvent::ValidateCommand),
        Just(RawInputEvent::ExecuteCommand),
        Just(RawInputEvent::ContextClick),
        Just(RawInputEvent::MouseLeaveWindow),
    ]
}

fn any_event_strategy() -> impl Strategy<Value = RawInputEvent> {
    prop_oneof![
        6 => relevant_event_strategy(),
        2 => irrelevant_event_strategy(),
        1 => Just(RawInputEvent::Repaint),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. Last value per class, every touched flag set
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn last_value_per_class(events in prop::collection::vec(relevant_event_strategy(), 0..64)) {
        let mut acc = EventAccumulator::new();
        for event in &events {
            acc.process(*event);
        }
        let state = acc.state();

        let mut expected_key = None;
        let mut expected_button = None;
        let mut expected_scroll = None;
        let mut expected_pointer = None;
        let mut expected_flags = ClassFlags::empty();

        for event in &events {
            expected_flags |= classify(event).class;
            match *event {
                RawInputEvent::KeyDown(k) => expected_key = Some((k, Transition::Down)),
                RawInputEvent::KeyUp(k) => expected_key = Some((k, Transition::Up)),
                RawInputEvent::MouseDown { button, .. } => {
                    expected_button = Some((button, Transition::Down));
                }
                RawInputEvent::MouseUp { button, .. } => {
                    expected_button = Some((button, Transition::Up));
                }
                RawInputEvent::Scroll { delta } => expected_scroll = Some(delta),
                RawInputEvent::MouseMove { position } | RawInputEvent::Layout { position } => {
                    expected_pointer = Some(position);
                }
                _ => {}
            }
        }

        prop_assert_eq!(state.last_key, expected_key);
        prop_assert_eq!(state.last_button, expected_button);
        prop_assert_eq!(state.last_scroll, expected_scroll);
        prop_assert_eq!(state.pointer, expected_pointer);
        prop_assert_eq!(state.seen, expected_flags);
        prop_assert!(!state.ready_to_render);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Flags only grow within a frame
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flags_are_monotonic(events in prop::collection::vec(any_event_strategy(), 0..64)) {
        let mut acc = EventAccumulator::new();
        let mut previous = ClassFlags::empty();
        let mut was_ready = false;
        for event in events {
            acc.process(event);
            let seen = acc.state().seen;
            prop_assert!(seen.contains(previous), "flags shrank: {:?} -> {:?}", previous, seen);
            prop_assert!(!was_ready || acc.state().ready_to_render, "ready flag was cleared");
            previous = seen;
            was_ready = acc.state().ready_to_render;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Readiness iff repaint folded or signalled
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ready_iff_repaint(
        events in prop::collection::vec(any_event_strategy(), 0..32),
        signal in any::<bool>(),
    ) {
        let mut acc = EventAccumulator::new();
        for event in &events {
            acc.process(*event);
        }
        let saw_repaint = events.iter().any(|e| matches!(e, RawInputEvent::Repaint));
        prop_assert_eq!(
            is_ready(acc.state(), RepaintSignal::from(signal)),
            saw_repaint || signal
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Irrelevant events never change the state
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn irrelevant_events_leave_state_unchanged(
        prefix in prop::collection::vec(any_event_strategy(), 0..16),
        noise in prop::collection::vec(irrelevant_event_strategy(), 1..16),
    ) {
        let mut acc = EventAccumulator::new();
        for event in prefix {
            acc.process(event);
        }
        let before = *acc.state();
        for event in noise {
            let c = acc.process(event);
            prop_assert!(c.is_empty());
            prop_assert!(!c.consumed);
        }
        prop_assert_eq!(*acc.state(), before);
    }
}
