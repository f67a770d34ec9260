#![forbid(unsafe_code)]

//! Sections and directional focus resolution: the geometric search, the
//! row/column shortcut, the section boundary protocol, and visible-set
//! tracking.

pub mod navigator;
pub mod registry;
pub mod resolver;
pub mod section;
pub mod shortcut;
pub mod visibility;

pub use navigator::{IgnoreReason, MoveKind, NavOutcome, NavStats, Navigator};
pub use registry::{SectionError, SectionId, SectionRegistry};
pub use resolver::{Accumulator, Geometry, find_closest};
pub use section::{
    AlwaysAllow, BoundaryGuard, BoundaryObserver, DefaultElement, IgnoreEnter, LeaveEvent,
    NavSettings, NoDefaultElement, PartialConfig, Section, SectionConfig,
};
pub use shortcut::{SiblingStep, adjacent, sibling_step};
pub use visibility::{IntersectionEntry, TrackFilter, VisibilityTracker, VisibleSet};
