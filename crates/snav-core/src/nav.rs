#![forbid(unsafe_code)]

//! Navigation vocabulary shared by the resolver and the section protocol.
//!
//! All enums serialize in `snake_case` so host configuration files can name
//! them directly (`"closest_by_direction"`, `"last_focused"`, ...).

use serde::{Deserialize, Serialize};

/// A cardinal navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Canonical axis angle in degrees, matching `atan2(dy, dx)` in
    /// screen coordinates (y grows downward).
    ///
    /// Left is reported as `180`; the sector test treats it as `±180`.
    #[must_use]
    pub const fn axis_degrees(self) -> f64 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => 90.0,
            Direction::Left => 180.0,
            Direction::Up => -90.0,
        }
    }

    /// Whether the direction moves along the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Check whether `degrees` (as returned by `atan2(dy, dx)` converted to
    /// degrees, so in `[-180, 180]`) lies strictly inside the open sector of
    /// half-width `half_width` centered on this direction's axis.
    #[must_use]
    pub fn sector_contains(self, degrees: f64, half_width: f64) -> bool {
        let axis = self.axis_degrees();
        match self {
            Direction::Left => degrees < -axis + half_width || degrees > axis - half_width,
            Direction::Up | Direction::Down | Direction::Right => {
                degrees < axis + half_width && degrees > axis - half_width
            }
        }
    }

    /// Lateral deviation of a displacement: the absolute component
    /// orthogonal to this direction's axis.
    #[inline]
    #[must_use]
    pub fn lateral(self, dx: f64, dy: f64) -> f64 {
        if self.is_horizontal() {
            dy.abs()
        } else {
            dx.abs()
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// How the resolver ranks candidates that pass the sector test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Smallest Euclidean distance between centers wins.
    #[default]
    ClosestByDistance,
    /// Smallest lateral deviation wins, as long as it is not farther away.
    ClosestByDirection,
}

/// Layout hint for a section, enabling the sibling shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// No layout assumption; always use geometry.
    #[default]
    Arbitrary,
    /// Items laid out left to right as siblings.
    Row,
    /// Items laid out top to bottom as siblings.
    Column,
}

/// Which item receives focus when a section is entered from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterTo {
    /// The geometrically resolved item.
    #[default]
    Calculated,
    /// The item that last had focus inside the section.
    LastFocused,
    /// The item returned by the section's default-element getter.
    DefaultElement,
}

/// Where the resolver looks for candidates first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatesSearchType {
    /// Always scan every candidate in the document.
    All,
    /// Scan the visible set first, falling back to every candidate.
    #[default]
    VisibleFirst,
}

/// Per-direction sector widths, in degrees.
///
/// A width of `180` accepts anything in the half-plane ahead; narrower
/// widths ignore candidates that sit too far off-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllowedAngles {
    pub up: f64,
    pub down: f64,
    pub left: f64,
    pub right: f64,
}

impl AllowedAngles {
    /// Same width for every direction.
    #[must_use]
    pub const fn uniform(degrees: f64) -> Self {
        Self {
            up: degrees,
            down: degrees,
            left: degrees,
            right: degrees,
        }
    }

    /// Sector width for `direction`.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Return a copy with `direction` set to `degrees`.
    #[must_use]
    pub const fn with(mut self, direction: Direction, degrees: f64) -> Self {
        match direction {
            Direction::Up => self.up = degrees,
            Direction::Down => self.down = degrees,
            Direction::Left => self.left = degrees,
            Direction::Right => self.right = degrees,
        }
        self
    }
}

impl Default for AllowedAngles {
    fn default() -> Self {
        Self::uniform(180.0)
    }
}
