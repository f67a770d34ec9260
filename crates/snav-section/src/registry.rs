#![forbid(unsafe_code)]

//! Section table.
//!
//! Sections live in one table keyed by [`SectionId`]. Two indexes sit next
//! to it: names (held until [`SectionRegistry::unregister`]) and roots. The
//! root index never keeps a node alive; lookups through it check that the
//! root still exists in the document and answer `None` otherwise.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use snav_dom::{Document, DomError, NodeId};

use crate::section::{Section, SectionConfig};

/// Stable handle to a registered section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u64);

impl SectionId {
    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Registry and attach errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// Another section already uses this name.
    DuplicateName { name: String },
    /// Another section is already rooted at this node.
    RootTaken { root: NodeId, owner: SectionId },
    /// The id does not refer to a registered section.
    UnknownSection { id: SectionId },
    /// The underlying document rejected the operation.
    Dom(DomError),
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "section name {name:?} is already registered"),
            Self::RootTaken { root, owner } => {
                write!(f, "node {root} is already the root of {owner}")
            }
            Self::UnknownSection { id } => write!(f, "{id} is not registered"),
            Self::Dom(err) => write!(f, "document error: {err}"),
        }
    }
}

impl std::error::Error for SectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for SectionError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

/// All registered sections.
#[derive(Debug, Default)]
pub struct SectionRegistry {
    sections: BTreeMap<SectionId, Section>,
    by_name: HashMap<String, SectionId>,
    by_root: HashMap<NodeId, SectionId>,
    next_id: u64,
}

impl SectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a section without a root.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        config: SectionConfig,
    ) -> Result<SectionId, SectionError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SectionError::DuplicateName { name });
        }
        let id = SectionId(self.next_id);
        self.next_id += 1;
        self.by_name.insert(name.clone(), id);
        self.sections.insert(id, Section::new(name, config));
        Ok(id)
    }

    /// Point `id` at `root`, or clear its root with `None`.
    pub fn set_root(&mut self, id: SectionId, root: Option<NodeId>) -> Result<(), SectionError> {
        if let Some(root) = root
            && let Some(&owner) = self.by_root.get(&root)
            && owner != id
        {
            return Err(SectionError::RootTaken { root, owner });
        }
        let section = self
            .sections
            .get_mut(&id)
            .ok_or(SectionError::UnknownSection { id })?;
        if let Some(previous) = section.root() {
            self.by_root.remove(&previous);
        }
        section.set_root(root);
        if let Some(root) = root {
            self.by_root.insert(root, id);
        }
        Ok(())
    }

    /// Remove `id` from the table and both indexes.
    pub fn unregister(&mut self, id: SectionId) -> Result<Section, SectionError> {
        let section = self
            .sections
            .remove(&id)
            .ok_or(SectionError::UnknownSection { id })?;
        self.by_name.remove(section.name());
        if let Some(root) = section.root() {
            self.by_root.remove(&root);
        }
        Ok(section)
    }

    #[must_use]
    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    pub fn get_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.get_mut(&id)
    }

    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<SectionId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Section> {
        self.id_by_name(name).and_then(|id| self.get(id))
    }

    /// Section rooted at `root`, if that node still exists.
    #[must_use]
    pub fn section_for_root(&self, doc: &Document, root: NodeId) -> Option<SectionId> {
        if !doc.is_alive(root) {
            return None;
        }
        self.by_root.get(&root).copied()
    }

    /// Registered sections whose root contains `node`, outermost first.
    #[must_use]
    pub fn enclosing(&self, doc: &Document, node: NodeId) -> Vec<SectionId> {
        let mut found: Vec<SectionId> = doc
            .ancestors(node)
            .filter_map(|ancestor| self.section_for_root(doc, ancestor))
            .collect();
        found.reverse();
        found
    }

    /// Innermost registered section whose root contains `node`.
    #[must_use]
    pub fn innermost(&self, doc: &Document, node: NodeId) -> Option<SectionId> {
        doc.ancestors(node)
            .find_map(|ancestor| self.section_for_root(doc, ancestor))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionId, &Section)> {
        self.sections.iter().map(|(&id, section)| (id, section))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
