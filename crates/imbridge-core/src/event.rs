#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! The host delivers input as loosely-typed [`HostEvent`] records, one per
//! callback invocation. [`RawInputEvent`] is the closed, strongly-typed form
//! the accumulator consumes; conversion happens exactly once, at the
//! boundary, via `RawInputEvent::try_from(HostEvent)`.
//!
//! # Design Notes
//!
//! - Each [`RawInputEvent`] variant carries only the fields relevant to its tag
//! - The tag set is closed and host-defined ([`EventTag`]); anything outside it
//!   is an [`UnknownEventTag`] error, never a silent default
//! - `Modifiers` use bitflags for easy combination

use std::fmt;

use bitflags::bitflags;

/// A 2D vector used for pointer positions, scroll deltas, and display sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Control key.
        const CTRL  = 0b0010;
        /// Alt/Option key.
        const ALT   = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

/// A mouse button, identified by the host's button index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(pub u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    /// The host's button index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Key codes the GUI library understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyCode {
    /// No key; used by text-only key events that carry just a character.
    #[default]
    None,
    /// A letter key, stored uppercase (`'A'..='Z'`).
    Letter(char),
    /// A digit key on the main row (`0..=9`).
    Digit(u8),
    /// Function key (F1-F24).
    F(u8),
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftSuper,
    RightSuper,
}

impl KeyCode {
    /// Letter key for `c`, case-insensitive. Returns `None` for non-letters.
    #[must_use]
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Self::Letter(c.to_ascii_uppercase()))
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that changed state.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    /// Text character produced by the key press, if any.
    pub character: Option<char>,
}

impl KeyEvent {
    /// Create a new key event with no modifiers and no character.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            character: None,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event carrying a text character.
    #[must_use]
    pub const fn with_character(mut self, character: char) -> Self {
        self.character = Some(character);
        self
    }
}

/// Touch phases. Touch input has no GUI relevance here and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Up,
    Move,
    Enter,
    Leave,
    Stationary,
}

/// One input event from the host's current dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInputEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    MouseDown {
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseUp {
        button: MouseButton,
        modifiers: Modifiers,
    },
    Scroll {
        delta: Vec2,
    },
    MouseMove {
        position: Vec2,
    },
    /// Layout pass; reports the current pointer position.
    Layout {
        position: Vec2,
    },
    /// The dispatch pass during which drawing should occur.
    Repaint,
    MouseDrag,
    DragUpdated,
    DragPerform,
    DragExited,
    Ignore,
    Used,
    ValidateCommand,
    ExecuteCommand,
    ContextClick,
    MouseEnterWindow,
    MouseLeaveWindow,
    Touch(TouchPhase),
}

impl RawInputEvent {
    /// The host tag this event was decoded from.
    #[must_use]
    pub const fn tag(&self) -> EventTag {
        match self {
            Self::KeyDown(_) => EventTag::KeyDown,
            Self::KeyUp(_) => EventTag::KeyUp,
            Self::MouseDown { .. } => EventTag::MouseDown,
            Self::MouseUp { .. } => EventTag::MouseUp,
            Self::Scroll { .. } => EventTag::ScrollWheel,
            Self::MouseMove { .. } => EventTag::MouseMove,
            Self::Layout { .. } => EventTag::Layout,
            Self::Repaint => EventTag::Repaint,
            Self::MouseDrag => EventTag::MouseDrag,
            Self::DragUpdated => EventTag::DragUpdated,
            Self::DragPerform => EventTag::DragPerform,
            Self::DragExited => EventTag::DragExited,
            Self::Ignore => EventTag::Ignore,
            Self::Used => EventTag::Used,
            Self::ValidateCommand => EventTag::ValidateCommand,
            Self::ExecuteCommand => EventTag::ExecuteCommand,
            Self::ContextClick => EventTag::ContextClick,
            Self::MouseEnterWindow => EventTag::MouseEnterWindow,
            Self::MouseLeaveWindow => EventTag::MouseLeaveWindow,
            Self::Touch(TouchPhase::Down) => EventTag::TouchDown,
            Self::Touch(TouchPhase::Up) => EventTag::TouchUp,
            Self::Touch(TouchPhase::Move) => EventTag::TouchMove,
            Self::Touch(TouchPhase::Enter) => EventTag::TouchEnter,
            Self::Touch(TouchPhase::Leave) => EventTag::TouchLeave,
            Self::Touch(TouchPhase::Stationary) => EventTag::TouchStationary,
        }
    }
}

/// Host event tag codes. The set is closed; the numeric values are the host's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventTag {
    MouseDown = 0,
    MouseUp = 1,
    MouseMove = 2,
    MouseDrag = 3,
    KeyDown = 4,
    KeyUp = 5,
    ScrollWheel = 6,
    Repaint = 7,
    Layout = 8,
    DragUpdated = 9,
    DragPerform = 10,
    Ignore = 11,
    Used = 12,
    ValidateCommand = 13,
    ExecuteCommand = 14,
    DragExited = 15,
    ContextClick = 16,
    MouseEnterWindow = 20,
    MouseLeaveWindow = 21,
    TouchDown = 30,
    TouchUp = 31,
    TouchMove = 32,
    TouchEnter = 33,
    TouchLeave = 34,
    TouchStationary = 35,
}

impl EventTag {
    /// Numeric host code of this tag.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for EventTag {
    type Error = UnknownEventTag;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::MouseDown,
            1 => Self::MouseUp,
            2 => Self::MouseMove,
            3 => Self::MouseDrag,
            4 => Self::KeyDown,
            5 => Self::KeyUp,
            6 => Self::ScrollWheel,
            7 => Self::Repaint,
            8 => Self::Layout,
            9 => Self::DragUpdated,
            10 => Self::DragPerform,
            11 => Self::Ignore,
            12 => Self::Used,
            13 => Self::ValidateCommand,
            14 => Self::ExecuteCommand,
            15 => Self::DragExited,
            16 => Self::ContextClick,
            20 => Self::MouseEnterWindow,
            21 => Self::MouseLeaveWindow,
            30 => Self::TouchDown,
            31 => Self::TouchUp,
            32 => Self::TouchMove,
            33 => Self::TouchEnter,
            34 => Self::TouchLeave,
            35 => Self::TouchStationary,
            other => return Err(UnknownEventTag(other)),
        })
    }
}

/// A host event tag outside the closed [`EventTag`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownEventTag(pub u32);

impl fmt::Display for UnknownEventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized host event tag {}", self.0)
    }
}

impl std::error::Error for UnknownEventTag {}

/// The host's raw event record, as delivered to a single callback.
///
/// Every payload field is present regardless of tag; the host fills what it
/// has. Only the fields relevant to the tag survive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostEvent {
    pub tag: u32,
    pub key: KeyCode,
    pub character: Option<char>,
    pub button: u8,
    pub delta: Vec2,
    pub position: Vec2,
    pub modifiers: Modifiers,
}

impl HostEvent {
    /// A record with the given tag and empty payload.
    #[must_use]
    pub fn new(tag: EventTag) -> Self {
        Self {
            tag: tag.code(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn key_down(key: KeyCode) -> Self {
        Self {
            key,
            ..Self::new(EventTag::KeyDown)
        }
    }

    #[must_use]
    pub fn key_up(key: KeyCode) -> Self {
        Self {
            key,
            ..Self::new(EventTag::KeyUp)
        }
    }

    #[must_use]
    pub fn mouse_down(button: u8) -> Self {
        Self {
            button,
            ..Self::new(EventTag::MouseDown)
        }
    }

    #[must_use]
    pub fn mouse_up(button: u8) -> Self {
        Self {
            button,
            ..Self::new(EventTag::MouseUp)
        }
    }

    #[must_use]
    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::new(EventTag::MouseMove)
        }
    }

    #[must_use]
    pub fn layout(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::new(EventTag::Layout)
        }
    }

    #[must_use]
    pub fn scroll(dx: f32, dy: f32) -> Self {
        Self {
            delta: Vec2::new(dx, dy),
            ..Self::new(EventTag::ScrollWheel)
        }
    }

    #[must_use]
    pub fn repaint() -> Self {
        Self::new(EventTag::Repaint)
    }

    #[must_use]
    pub fn with_character(mut self, character: char) -> Self {
        self.character = Some(character);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl TryFrom<HostEvent> for RawInputEvent {
    type Error = UnknownEventTag;

    fn try_from(event: HostEvent) -> Result<Self, Self::Error> {
        let key = KeyEvent {
            code: event.key,
            modifiers: event.modifiers,
            character: event.character,
        };
        let button = MouseButton(event.button);

        Ok(match EventTag::try_from(event.tag)? {
            EventTag::KeyDown => Self::KeyDown(key),
            EventTag::KeyUp => Self::KeyUp(key),
            EventTag::MouseDown => Self::MouseDown {
                button,
                modifiers: event.modifiers,
            },
            EventTag::MouseUp => Self::MouseUp {
                button,
                modifiers: event.modifiers,
            },
            EventTag::ScrollWheel => Self::Scroll { delta: event.delta },
            EventTag::MouseMove => Self::MouseMove {
                position: event.position,
            },
            EventTag::Layout => Self::Layout {
                position: event.position,
            },
            EventTag::Repaint => Self::Repaint,
            EventTag::MouseDrag => Self::MouseDrag,
            EventTag::DragUpdated => Self::DragUpdated,
            EventTag::DragPerform => Self::DragPerform,
            EventTag::DragExited => Self::DragExited,
            EventTag::Ignore => Self::Ignore,
            EventTag::Used => Self::Used,
            EventTag::ValidateCommand => Self::ValidateCommand,
            EventTag::ExecuteCommand => Self::ExecuteCommand,
            EventTag::ContextClick => Self::ContextClick,
            EventTag::MouseEnterWindow => Self::MouseEnterWindow,
            EventTag::MouseLeaveWindow => Self::MouseLeaveWindow,
            EventTag::TouchDown => Self::Touch(TouchPhase::Down),
            EventTag::TouchUp => Self::Touch(TouchPhase::Up),
            EventTag::TouchMove => Self::Touch(TouchPhase::Move),
            EventTag::TouchEnter => Self::Touch(TouchPhase::Enter),
            EventTag::TouchLeave => Self::Touch(TouchPhase::Leave),
            EventTag::TouchStationary => Self::Touch(TouchPhase::Stationary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_code_round_trips() {
        let codes = (0..=16).chain(20..=21).chain(30..=35);
        for code in codes {
            let tag = EventTag::try_from(code).expect("known tag");
            assert_eq!(tag.code(), code);
        }
    }

    #[test]
    fn gaps_in_tag_space_are_unknown() {
        for code in [17, 18, 19, 22, 29, 36, u32::MAX] {
            assert_eq!(EventTag::try_from(code), Err(UnknownEventTag(code)));
        }
    }

    #[test]
    fn host_key_event_keeps_character_and_modifiers() {
        let host = HostEvent::key_down(KeyCode::Letter('A'))
            .with_character('a')
            .with_modifiers(Modifiers::SHIFT);
        let raw = RawInputEvent::try_from(host).unwrap();
        assert_eq!(
            raw,
            RawInputEvent::KeyDown(
                KeyEvent::new(KeyCode::Letter('A'))
                    .with_character('a')
                    .with_modifiers(Modifiers::SHIFT)
            )
        );
    }

    #[test]
    fn host_mouse_down_drops_position() {
        let mut host = HostEvent::mouse_down(1);
        host.position = Vec2::new(3.0, 4.0);
        let raw = RawInputEvent::try_from(host).unwrap();
        assert_eq!(
            raw,
            RawInputEvent::MouseDown {
                button: MouseButton::RIGHT,
                modifiers: Modifiers::NONE,
            }
        );
    }

    #[test]
    fn unknown_host_tag_is_rejected() {
        let host = HostEvent {
            tag: 99,
            ..HostEvent::default()
        };
        let err = RawInputEvent::try_from(host).unwrap_err();
        assert_eq!(err, UnknownEventTag(99));
        assert_eq!(err.to_string(), "unrecognized host event tag 99");
    }

    #[test]
    fn decoded_event_reports_its_tag() {
        for code in [0, 2, 4, 6, 7, 8, 13, 33] {
            let host = HostEvent {
                tag: code,
                ..HostEvent::default()
            };
            let raw = RawInputEvent::try_from(host).unwrap();
            assert_eq!(raw.tag().code(), code);
        }
    }

    #[test]
    fn letter_key_is_case_insensitive() {
        assert_eq!(KeyCode::letter('q'), Some(KeyCode::Letter('Q')));
        assert_eq!(KeyCode::letter('Q'), Some(KeyCode::Letter('Q')));
        assert_eq!(KeyCode::letter('1'), None);
    }
}
