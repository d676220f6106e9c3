#![forbid(unsafe_code)]

//! Event accumulation for per-callback input delivery.
//!
//! Hosts that dispatch input one event per callback invoke us several times
//! per rendered frame. The GUI library instead wants a single snapshot of
//! input state right before layout. [`EventAccumulator`] folds the scattered
//! events into one [`AccumulatedFrameState`]:
//!
//! - Flags are OR-merged: once a class is seen in a frame it stays set
//! - Values use "latest wins": a class seen twice keeps the newer value
//! - Repaint-class events mark the frame `ready_to_render`
//! - Events with no GUI relevance (drag, touch, commands) are no-ops
//!
//! State is only reset by [`EventAccumulator::clear`], which the lifecycle
//! controller calls when it prepares the next frame.
//!
//! # Usage
//!
//! ```
//! use imbridge_core::accumulator::{ClassFlags, EventAccumulator};
//! use imbridge_core::event::{RawInputEvent, Vec2};
//!
//! let mut acc = EventAccumulator::new();
//! acc.process(RawInputEvent::MouseMove { position: Vec2::new(5.0, 5.0) });
//! acc.process(RawInputEvent::MouseMove { position: Vec2::new(7.0, 7.0) });
//!
//! // Only the latest position is kept.
//! assert_eq!(acc.state().pointer, Some(Vec2::new(7.0, 7.0)));
//! assert!(acc.state().saw(ClassFlags::POINTER));
//! assert!(!acc.state().ready_to_render);
//!
//! acc.process(RawInputEvent::Repaint);
//! assert!(acc.state().ready_to_render);
//! ```

use std::collections::HashMap;

use bitflags::bitflags;

use crate::event::{KeyEvent, Modifiers, MouseButton, RawInputEvent, Vec2};

bitflags! {
    /// Event classes with GUI relevance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u8 {
        const KEY_DOWN   = 1 << 0;
        const KEY_UP     = 1 << 1;
        const MOUSE_DOWN = 1 << 2;
        const MOUSE_UP   = 1 << 3;
        const SCROLL     = 1 << 4;
        /// Pointer position update (mouse move or layout pass).
        const POINTER    = 1 << 5;
        const REPAINT    = 1 << 6;
    }
}

/// Whether a key or button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Down,
    Up,
}

impl Transition {
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Down)
    }
}

/// Result of classifying a single event.
///
/// Irrelevant events yield the default classification: no flags, no values,
/// not consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Classification {
    /// Which class fired (at most one bit for a single event).
    pub class: ClassFlags,
    pub key: Option<(KeyEvent, Transition)>,
    pub button: Option<(MouseButton, Transition)>,
    pub scroll: Option<Vec2>,
    pub position: Option<Vec2>,
    /// Modifiers carried by key or button events.
    pub modifiers: Option<Modifiers>,
    /// Whether the host should stop dispatching this event to other consumers.
    pub consumed: bool,
}

impl Classification {
    /// True when the event has no GUI relevance.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.class.is_empty()
    }

    /// True when the classification has side effects to forward immediately
    /// (keys, text, buttons, scroll). Pointer updates are held until ready.
    #[must_use]
    pub fn forwards_immediately(&self) -> bool {
        self.class.intersects(
            ClassFlags::KEY_DOWN
                | ClassFlags::KEY_UP
                | ClassFlags::MOUSE_DOWN
                | ClassFlags::MOUSE_UP
                | ClassFlags::SCROLL,
        )
    }
}

/// Classify an event without touching any state.
#[must_use]
pub fn classify(event: &RawInputEvent) -> Classification {
    match *event {
        RawInputEvent::KeyDown(key) => Classification {
            class: ClassFlags::KEY_DOWN,
            key: Some((key, Transition::Down)),
            modifiers: Some(key.modifiers),
            consumed: true,
            ..Classification::default()
        },
        RawInputEvent::KeyUp(key) => Classification {
            class: ClassFlags::KEY_UP,
            key: Some((key, Transition::Up)),
            modifiers: Some(key.modifiers),
            consumed: true,
            ..Classification::default()
        },
        RawInputEvent::MouseDown { button, modifiers } => Classification {
            class: ClassFlags::MOUSE_DOWN,
            button: Some((button, Transition::Down)),
            modifiers: Some(modifiers),
            consumed: true,
            ..Classification::default()
        },
        RawInputEvent::MouseUp { button, modifiers } => Classification {
            class: ClassFlags::MOUSE_UP,
            button: Some((button, Transition::Up)),
            modifiers: Some(modifiers),
            consumed: true,
            ..Classification::default()
        },
        RawInputEvent::Scroll { delta } => Classification {
            class: ClassFlags::SCROLL,
            scroll: Some(delta),
            consumed: true,
            ..Classification::default()
        },
        RawInputEvent::MouseMove { position } => Classification {
            class: ClassFlags::POINTER,
            position: Some(position),
            consumed: true,
            ..Classification::default()
        },
        // Layout and repaint passes must still reach the host's other consumers.
        RawInputEvent::Layout { position } => Classification {
            class: ClassFlags::POINTER,
            position: Some(position),
            ..Classification::default()
        },
        RawInputEvent::Repaint => Classification {
            class: ClassFlags::REPAINT,
            ..Classification::default()
        },
        RawInputEvent::MouseDrag
        | RawInputEvent::DragUpdated
        | RawInputEvent::DragPerform
        | RawInputEvent::DragExited
        | RawInputEvent::Ignore
        | RawInputEvent::Used
        | RawInputEvent::ValidateCommand
        | RawInputEvent::ExecuteCommand
        | RawInputEvent::ContextClick
        | RawInputEvent::MouseEnterWindow
        | RawInputEvent::MouseLeaveWindow
        | RawInputEvent::Touch(_) => Classification::default(),
    }
}

/// Input folded from every event seen so far in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccumulatedFrameState {
    /// Classes seen this frame; OR-merged, never cleared mid-frame.
    pub seen: ClassFlags,
    pub last_key: Option<(KeyEvent, Transition)>,
    pub last_button: Option<(MouseButton, Transition)>,
    pub last_scroll: Option<Vec2>,
    /// Latest known pointer position.
    pub pointer: Option<Vec2>,
    /// Latest modifiers reported by a key or button event.
    pub modifiers: Option<Modifiers>,
    /// Set once a repaint-class event is observed.
    pub ready_to_render: bool,
    /// Events with GUI relevance folded this frame.
    pub event_count: u32,
}

impl AccumulatedFrameState {
    /// Whether any class in `flags` was seen this frame.
    #[must_use]
    pub fn saw(&self, flags: ClassFlags) -> bool {
        self.seen.intersects(flags)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Merge one classification into the state.
    pub fn fold(&mut self, c: &Classification) {
        if c.is_empty() {
            return;
        }
        self.seen |= c.class;
        self.event_count = self.event_count.saturating_add(1);

        if c.key.is_some() {
            self.last_key = c.key;
        }
        if c.button.is_some() {
            self.last_button = c.button;
        }
        if c.scroll.is_some() {
            self.last_scroll = c.scroll;
        }
        if c.position.is_some() {
            self.pointer = c.position;
        }
        if c.modifiers.is_some() {
            self.modifiers = c.modifiers;
        }
        if c.class.contains(ClassFlags::REPAINT) {
            self.ready_to_render = true;
        }
    }

    /// Reset to the empty state for the next frame.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Folds the events of one logical input source into an [`AccumulatedFrameState`].
///
/// Not thread-safe; driven from the host's main thread.
#[derive(Debug, Clone, Default)]
pub struct EventAccumulator {
    state: AccumulatedFrameState,
}

impl EventAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `event` and fold it into the accumulated state.
    ///
    /// Never fails: irrelevant events return an empty classification and
    /// leave the state untouched.
    pub fn process(&mut self, event: RawInputEvent) -> Classification {
        let classification = classify(&event);
        self.state.fold(&classification);
        if !classification.is_empty() {
            crate::trace!(
                class = ?classification.class,
                ready = self.state.ready_to_render,
                "folded input event"
            );
        }
        classification
    }

    #[must_use]
    pub fn state(&self) -> &AccumulatedFrameState {
        &self.state
    }

    /// Discard the accumulated state.
    pub fn clear(&mut self) {
        self.state.clear();
    }
}

/// Stable identifier of a logical input source (a window, panel, or control).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Explicit mapping from input source to its accumulator.
///
/// Entries are created on first use and live until [`AccumulatorMap::remove`].
#[derive(Debug, Clone, Default)]
pub struct AccumulatorMap {
    sources: HashMap<SourceId, EventAccumulator>,
}

impl AccumulatorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator for `source`, created empty if absent.
    pub fn entry(&mut self, source: SourceId) -> &mut EventAccumulator {
        self.sources.entry(source).or_default()
    }

    #[must_use]
    pub fn get(&self, source: SourceId) -> Option<&EventAccumulator> {
        self.sources.get(&source)
    }

    /// Forget `source` entirely. Returns whether it was present.
    pub fn remove(&mut self, source: SourceId) -> bool {
        self.sources.remove(&source).is_some()
    }

    /// Clear every source's state, keeping the entries.
    pub fn clear_all(&mut self) {
        for acc in self.sources.values_mut() {
            acc.clear();
        }
    }

    /// True if any source has folded at least one relevant event.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.sources.values().any(|acc| !acc.state().is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
