#![forbid(unsafe_code)]

//! Canonical key event types and the direction key mapping.
//!
//! Directional input arrives as a [`KeyEvent`]. Decoding maps the four arrow
//! key codes to a [`Direction`]; every other key decodes to `None`.
//! Synthesized events built with [`KeyEvent::from_direction`] use the same
//! table, so encoding a direction and decoding it again is the identity.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; held keys arrive as `Repeat`
//! - Modifier state is left to the host; a shifted arrow still navigates

use crate::nav::Direction;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event of Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Press,
        }
    }

    /// Synthesize the key press a real arrow key would produce for `direction`.
    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        Self::new(KeyCode::from_direction(direction))
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the key is being held down.
    #[must_use]
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, KeyEventKind::Repeat)
    }

    /// Decode the event into a navigation direction.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.code.direction()
    }
}

impl From<Direction> for KeyEvent {
    fn from(direction: Direction) -> Self {
        Self::from_direction(direction)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),

    /// Media key: Play/Pause.
    MediaPlayPause,
}

impl KeyCode {
    /// Arrow key for `direction`.
    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => KeyCode::Up,
            Direction::Down => KeyCode::Down,
            Direction::Left => KeyCode::Left,
            Direction::Right => KeyCode::Right,
        }
    }

    /// Direction for an arrow key, `None` for anything else.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        }
    }

    /// Parse a host key name such as `"ArrowDown"` or `"Enter"`.
    ///
    /// Single-character names map to [`KeyCode::Char`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let code = match name {
            "ArrowUp" => KeyCode::Up,
            "ArrowDown" => KeyCode::Down,
            "ArrowLeft" => KeyCode::Left,
            "ArrowRight" => KeyCode::Right,
            "Enter" => KeyCode::Enter,
            "Escape" => KeyCode::Escape,
            "Backspace" => KeyCode::Backspace,
            "Tab" => KeyCode::Tab,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "MediaPlayPause" => KeyCode::MediaPlayPause,
            other => {
                if let Some(n) = other.strip_prefix('F')
                    && let Ok(n) = n.parse::<u8>()
                    && (1..=24).contains(&n)
                {
                    return Some(KeyCode::F(n));
                }
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Host key name for named keys; `None` for characters and function keys.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            KeyCode::Up => Some("ArrowUp"),
            KeyCode::Down => Some("ArrowDown"),
            KeyCode::Left => Some("ArrowLeft"),
            KeyCode::Right => Some("ArrowRight"),
            KeyCode::Enter => Some("Enter"),
            KeyCode::Escape => Some("Escape"),
            KeyCode::Backspace => Some("Backspace"),
            KeyCode::Tab => Some("Tab"),
            KeyCode::Home => Some("Home"),
            KeyCode::End => Some("End"),
            KeyCode::PageUp => Some("PageUp"),
            KeyCode::PageDown => Some("PageDown"),
            KeyCode::MediaPlayPause => Some("MediaPlayPause"),
            KeyCode::Char(_) | KeyCode::F(_) => None,
        }
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}
