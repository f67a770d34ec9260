#![forbid(unsafe_code)]

//! Node arena with element boxes, marker flags, focus, and a mutation log.
//!
//! # Invariants
//!
//! 1. The body (index 0) is always alive, connected, and parentless.
//! 2. A node has at most one parent and appears once in that parent's
//!    children list.
//! 3. `NodeId`s carry a generation: once a node is destroyed its id never
//!    resolves again, even if the slot is reused.
//! 4. The active element, if any, is connected. Detaching the focused
//!    subtree drops focus back to the document default.
//! 5. Every attach and detach appends one [`MutationRecord`] listing the
//!    whole affected subtree in document order.

use std::fmt;

use bitflags::bitflags;
use snav_core::geometry::Rect;

use crate::error::DomError;

/// Marker class that makes an element a navigation candidate.
pub const ITEM_CLASS: &str = "sn-section-item";

/// Marker class carried by section roots.
pub const ROOT_CLASS: &str = "sn-section-root";

/// Generational handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index in the arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

bitflags! {
    /// Marker flags on a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Focusable navigation candidate (`sn-section-item`).
        const ITEM         = 0b001;
        /// Section root (`sn-section-root`).
        const SECTION_ROOT = 0b010;
        /// Candidate is skipped by the resolver.
        const DISABLED     = 0b100;
    }
}

impl NodeFlags {
    /// Derive flags from a whitespace-separated class list.
    ///
    /// Only the two marker classes are recognized; `disabled` is an
    /// attribute, not a class, and is set separately.
    #[must_use]
    pub fn from_class_list(classes: &str) -> Self {
        classes
            .split_ascii_whitespace()
            .fold(Self::empty(), |flags, class| match class {
                ITEM_CLASS => flags | Self::ITEM,
                ROOT_CLASS => flags | Self::SECTION_ROOT,
                _ => flags,
            })
    }
}

/// One structural change under `target`.
///
/// `added` and `removed` list the full attached or detached subtree in
/// document order, not just its top node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent whose child list changed.
    pub target: NodeId,
    /// Nodes that became attached under `target`.
    pub added: Vec<NodeId>,
    /// Nodes that were detached from `target`.
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: NodeFlags,
    rect: Rect,
}

impl NodeData {
    fn new(flags: NodeFlags, rect: Rect) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            flags,
            rect,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// A tree of elements with host-supplied boxes.
///
/// This is not a layout engine: every box is whatever the host last passed
/// to [`Document::set_rect`].
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body: NodeId,
    viewport: Rect,
    active: Option<NodeId>,
    mutations: Vec<MutationRecord>,
}

impl Document {
    /// Create an empty document whose body covers `viewport`.
    pub fn new(viewport: Rect) -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                data: Some(NodeData::new(NodeFlags::empty(), viewport)),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            viewport,
            active: None,
            mutations: Vec::new(),
        }
    }

    /// The document body.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Current viewport.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Replace the viewport (resize or scroll).
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Number of live nodes, body included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
    }

    fn live(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.node(id).ok_or(DomError::StaleNode { node: id })
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.node_mut(id).ok_or(DomError::StaleNode { node: id })
    }

    /// Whether `id` still resolves to a node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    // ----------------------------------------------------------------------
    // Construction and structure
    // ----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, flags: NodeFlags, rect: Rect) -> NodeId {
        let data = NodeData::new(flags, rect);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(data),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or last when `None`).
    ///
    /// An attached `child` is detached first, producing a removal record
    /// followed by an addition record.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.live(parent)?;
        self.live(child)?;
        if child == self.body {
            return Err(DomError::BodyIsFixed);
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyCycle { parent, child });
        }
        if let Some(reference) = reference {
            if self.live(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild { parent, reference });
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child);

        let siblings = &mut self.live_mut(parent)?.children;
        let position = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.live_mut(child)?.parent = Some(parent);

        let added = self.subtree(child);
        #[cfg(feature = "tracing")]
        tracing::trace!(%parent, %child, nodes = added.len(), "subtree attached");
        self.mutations.push(MutationRecord {
            target: parent,
            added,
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Detach `node` from its parent. Detached nodes stay alive and can be
    /// re-attached; removing an already detached node is a no-op.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.live(node)?;
        if node == self.body {
            return Err(DomError::BodyIsFixed);
        }
        self.detach(node);
        Ok(())
    }

    /// Detach `node` and free its whole subtree; their ids become stale.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), DomError> {
        self.remove(node)?;
        for id in self.subtree(node) {
            let slot = &mut self.slots[id.index as usize];
            slot.data = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|data| data.parent) else {
            return;
        };
        if let Some(parent_data) = self.node_mut(parent) {
            parent_data.children.retain(|&c| c != node);
        }
        if let Some(data) = self.node_mut(node) {
            data.parent = None;
        }

        let removed = self.subtree(node);
        if let Some(active) = self.active
            && removed.contains(&active)
        {
            self.active = None;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(%parent, %node, nodes = removed.len(), "subtree detached");
        self.mutations.push(MutationRecord {
            target: parent,
            added: Vec::new(),
            removed,
        });
    }

    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root).collect()
    }

    // ----------------------------------------------------------------------
    // Attributes
    // ----------------------------------------------------------------------

    /// Marker flags of a live node.
    #[must_use]
    pub fn flags(&self, node: NodeId) -> Option<NodeFlags> {
        self.node(node).map(|data| data.flags)
    }

    /// Replace the marker flags of a node.
    pub fn set_flags(&mut self, node: NodeId, flags: NodeFlags) -> Result<(), DomError> {
        self.live_mut(node)?.flags = flags;
        Ok(())
    }

    /// Add marker flags to a node.
    pub fn insert_flags(&mut self, node: NodeId, flags: NodeFlags) -> Result<(), DomError> {
        self.live_mut(node)?.flags.insert(flags);
        Ok(())
    }

    /// Remove marker flags from a node.
    pub fn remove_flags(&mut self, node: NodeId, flags: NodeFlags) -> Result<(), DomError> {
        self.live_mut(node)?.flags.remove(flags);
        Ok(())
    }

    /// Toggle the `DISABLED` flag.
    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) -> Result<(), DomError> {
        self.live_mut(node)?.flags.set(NodeFlags::DISABLED, disabled);
        Ok(())
    }

    /// Whether the node is a live navigation candidate.
    #[must_use]
    pub fn is_item(&self, node: NodeId) -> bool {
        self.flags(node)
            .is_some_and(|flags| flags.contains(NodeFlags::ITEM))
    }

    /// Whether the node carries the `DISABLED` flag.
    #[must_use]
    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.flags(node)
            .is_some_and(|flags| flags.contains(NodeFlags::DISABLED))
    }

    /// Current box of a live node.
    #[must_use]
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.node(node).map(|data| data.rect)
    }

    /// Set the box reported for a node.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) -> Result<(), DomError> {
        self.live_mut(node)?.rect = rect;
        Ok(())
    }

    /// Whether the node's box overlaps the viewport.
    #[must_use]
    pub fn intersects_viewport(&self, node: NodeId) -> bool {
        self.rect(node)
            .is_some_and(|rect| rect.intersects(&self.viewport))
    }

    // ----------------------------------------------------------------------
    // Tree queries
    // ----------------------------------------------------------------------

    /// Parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|data| data.parent)
    }

    /// Children of a node in order (empty for stale ids).
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map_or(&[][..], |data| data.children.as_slice())
    }

    /// `node` and its ancestors, innermost first.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.is_alive(node).then_some(node),
        }
    }

    /// `root` and its descendants in document (pre-)order.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = if self.is_alive(root) {
            vec![root]
        } else {
            Vec::new()
        };
        Descendants { doc: self, stack }
    }

    /// Inclusive containment: a node contains itself.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.is_alive(ancestor) && self.ancestors(node).any(|n| n == ancestor)
    }

    /// Whether the node is attached (directly or not) to the body.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Nearest inclusive ancestor carrying all of `flags`.
    #[must_use]
    pub fn closest(&self, node: NodeId, flags: NodeFlags) -> Option<NodeId> {
        self.ancestors(node)
            .find(|&n| self.flags(n).is_some_and(|f| f.contains(flags)))
    }

    /// Next sibling element, if any.
    #[must_use]
    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let position = siblings.iter().position(|&c| c == node)?;
        siblings.get(position + 1).copied()
    }

    /// Previous sibling element, if any.
    #[must_use]
    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let position = siblings.iter().position(|&c| c == node)?;
        position.checked_sub(1).map(|p| siblings[p])
    }

    /// Every connected candidate item, in document order.
    pub fn items(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items_within(self.body)
    }

    /// Candidate items inside `root` (inclusive), in document order.
    pub fn items_within(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(root).filter(|&n| self.is_item(n))
    }

    /// First candidate in document order.
    #[must_use]
    pub fn first_item(&self) -> Option<NodeId> {
        self.items().next()
    }

    /// First candidate inside `root`.
    #[must_use]
    pub fn first_item_within(&self, root: NodeId) -> Option<NodeId> {
        self.items_within(root).next()
    }

    // ----------------------------------------------------------------------
    // Focus
    // ----------------------------------------------------------------------

    /// Focused node, or `None` when the document default (body) has focus.
    #[inline]
    #[must_use]
    pub const fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Move focus to `node`. Returns `true` if focus changed.
    ///
    /// Focusing the body is the same as [`Document::blur`]. This only moves
    /// the focus pointer; section notifications belong to the navigator.
    pub fn focus(&mut self, node: NodeId) -> Result<bool, DomError> {
        self.live(node)?;
        if !self.is_connected(node) {
            return Err(DomError::NotConnected { node });
        }
        if node == self.body {
            return Ok(self.blur());
        }
        if self.active == Some(node) {
            return Ok(false);
        }
        self.active = Some(node);
        Ok(true)
    }

    /// Return focus to the document default. Returns `true` if focus changed.
    pub fn blur(&mut self) -> bool {
        self.active.take().is_some()
    }

    // ----------------------------------------------------------------------
    // Mutation log
    // ----------------------------------------------------------------------

    /// Whether structural changes are waiting to be drained.
    #[must_use]
    pub fn has_pending_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Drain the structural change log, oldest first.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }
}

/// Iterator over a node and its ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
