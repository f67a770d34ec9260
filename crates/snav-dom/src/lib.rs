#![forbid(unsafe_code)]

//! Host document model: the element tree the navigator reads boxes,
//! marker classes, and focus from.

pub mod document;
pub mod error;

pub use document::{
    Ancestors, Descendants, Document, ITEM_CLASS, MutationRecord, NodeFlags, NodeId, ROOT_CLASS,
};
pub use error::DomError;
