#![forbid(unsafe_code)]

//! Sectioned spatial navigation.
//!
//! This crate re-exports the working set of the internal crates and adds a
//! prelude:
//!
//! ```
//! use snav::prelude::*;
//!
//! let mut nav = Navigator::new(Rect::from_size(640.0, 480.0));
//! let body = nav.document().body();
//! for x in [0.0, 200.0] {
//!     let doc = nav.document_mut();
//!     let item = doc.create_element(NodeFlags::ITEM, Rect::new(x, 0.0, 100.0, 100.0));
//!     doc.append_child(body, item).unwrap();
//! }
//!
//! let first = nav.navigate(Direction::Right).moved_to();
//! let second = nav.navigate(Direction::Right).moved_to();
//! assert!(first.is_some() && second.is_some() && first != second);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use snav_core::event::{KeyCode, KeyEvent, KeyEventKind};
pub use snav_core::geometry::{Point, Rect};
pub use snav_core::nav::{
    AllowedAngles, CandidatesSearchType, Direction, EnterTo, NavigationMode, SectionKind,
};

// --- Document re-exports ---------------------------------------------------

pub use snav_dom::{Document, DomError, MutationRecord, NodeFlags, NodeId};

// --- Section re-exports ----------------------------------------------------

pub use snav_section::{
    BoundaryGuard, BoundaryObserver, DefaultElement, IgnoreReason, LeaveEvent, MoveKind,
    NavOutcome, NavSettings, NavStats, Navigator, PartialConfig, Section, SectionConfig,
    SectionError, SectionId, SectionRegistry, VisibilityTracker, find_closest,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Document mutation failed.
    Dom(DomError),
    /// Section registration or lookup failed.
    Section(SectionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dom(err) => write!(f, "{err}"),
            Self::Section(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            Self::Section(err) => Some(err),
        }
    }
}

impl From<DomError> for Error {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<SectionError> for Error {
    fn from(err: SectionError) -> Self {
        match err {
            SectionError::Dom(err) => Self::Dom(err),
            other => Self::Section(other),
        }
    }
}

/// Standard result type for snav APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CandidatesSearchType, Direction, Document, EnterTo, Error, KeyCode, KeyEvent, LeaveEvent,
        NavOutcome, NavigationMode, Navigator, NodeFlags, NodeId, PartialConfig, Rect, Result,
        SectionId, SectionKind,
    };

    pub use crate::{core, dom, section};
}

pub use snav_core as core;
pub use snav_dom as dom;
pub use snav_section as section;
