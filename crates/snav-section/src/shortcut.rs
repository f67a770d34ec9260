#![forbid(unsafe_code)]

//! Sibling shortcut for row and column sections.
//!
//! Inside a `Row`, left/right move to the previous/next sibling; inside a
//! `Column`, up/down do. Any other pairing answers `None` and the caller
//! falls back to the geometric search. So does a missing sibling (edge of
//! the row) or a sibling that is not an enabled candidate.

use snav_core::nav::{Direction, SectionKind};
use snav_dom::{Document, NodeId};

/// Sibling step implied by a layout kind for a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingStep {
    Next,
    Previous,
}

/// Which sibling, if any, `kind` maps `direction` to.
#[must_use]
pub const fn sibling_step(kind: SectionKind, direction: Direction) -> Option<SiblingStep> {
    match (kind, direction) {
        (SectionKind::Row, Direction::Right) | (SectionKind::Column, Direction::Down) => {
            Some(SiblingStep::Next)
        }
        (SectionKind::Row, Direction::Left) | (SectionKind::Column, Direction::Up) => {
            Some(SiblingStep::Previous)
        }
        (SectionKind::Row, Direction::Up | Direction::Down)
        | (SectionKind::Column, Direction::Left | Direction::Right)
        | (SectionKind::Arbitrary, _) => None,
    }
}

/// Adjacent candidate of `node` for `kind` and `direction`, without geometry.
#[must_use]
pub fn adjacent(
    doc: &Document,
    kind: SectionKind,
    direction: Direction,
    node: NodeId,
) -> Option<NodeId> {
    let sibling = match sibling_step(kind, direction)? {
        SiblingStep::Next => doc.next_element_sibling(node),
        SiblingStep::Previous => doc.previous_element_sibling(node),
    }?;
    (doc.is_item(sibling) && !doc.is_disabled(sibling)).then_some(sibling)
}
