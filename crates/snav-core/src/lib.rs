#![forbid(unsafe_code)]

//! Core: geometry, key events, and the navigation vocabulary.

pub mod event;
pub mod geometry;
pub mod nav;

pub use event::{KeyCode, KeyEvent, KeyEventKind};
pub use geometry::{Point, Rect};
pub use nav::{AllowedAngles, CandidatesSearchType, Direction, EnterTo, NavigationMode, SectionKind};
