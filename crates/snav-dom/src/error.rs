#![forbid(unsafe_code)]

//! Errors raised by document mutations.

use std::fmt;

use crate::NodeId;

/// Failure of a structural or attribute change on a [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomError {
    /// The id refers to a node that was destroyed (or never existed).
    StaleNode { node: NodeId },
    /// Inserting `child` under `parent` would make a node its own ancestor.
    HierarchyCycle { parent: NodeId, child: NodeId },
    /// The document body cannot be moved, removed, or destroyed.
    BodyIsFixed,
    /// `reference` is not a child of `parent`.
    NotAChild { parent: NodeId, reference: NodeId },
    /// Only nodes attached to the document can take focus.
    NotConnected { node: NodeId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode { node } => write!(f, "node {node} no longer exists"),
            Self::HierarchyCycle { parent, child } => {
                write!(f, "cannot insert {child} under its own descendant {parent}")
            }
            Self::BodyIsFixed => f.write_str("the document body cannot be moved or removed"),
            Self::NotAChild { parent, reference } => {
                write!(f, "{reference} is not a child of {parent}")
            }
            Self::NotConnected { node } => write!(f, "node {node} is not attached to the document"),
        }
    }
}

impl std::error::Error for DomError {}
