#![forbid(unsafe_code)]

//! Directional navigation over a document with sections.
//!
//! The [`Navigator`] owns the [`Document`], the [`SectionRegistry`], the
//! sectionless default configuration and the [`VisibilityTracker`]. Input
//! reaches it through [`Navigator::dispatch_key`] (a real key at the focused
//! node) or [`Navigator::navigate`] (a synthesized one).
//!
//! # Key dispatch
//!
//! The innermost registered section whose root contains the focused node
//! handles the key:
//!
//! 1. Decode; drop non-directional keys and, unless the section handles
//!    repeats, held keys.
//! 2. Row/column sibling shortcut. A hit is focused without a search.
//! 3. Geometric search on the preferred pool, then on the full pool if the
//!    preferred pool was the visible set and found nothing.
//! 4. A result inside the root is focused directly.
//! 5. Otherwise the section's leave guard may veto.
//! 6. The section rooted at the nearest root-marked ancestor of the result
//!    picks the final target through its enter-to policy.
//!
//! Without an enclosing section the sectionless path runs steps 1, 3 and 4
//! with the default configuration.
//!
//! # Focus notifications
//!
//! [`Navigator::focus`] is the single way focus moves. When a candidate
//! gains focus, every section whose root contains it, outermost first,
//! remembers it and calls its enter observer.

use snav_core::event::{KeyEvent, KeyEventKind};
use snav_core::geometry::Rect;
use snav_core::nav::{CandidatesSearchType, Direction, EnterTo};
use snav_dom::{Document, DomError, NodeFlags, NodeId};

use crate::registry::{SectionError, SectionId, SectionRegistry};
use crate::resolver::find_closest;
use crate::section::{LeaveEvent, PartialConfig, Section, SectionConfig};
use crate::shortcut;
use crate::visibility::VisibilityTracker;

/// How a successful move was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Row/column sibling, no search.
    Shortcut,
    /// Search result inside the current section.
    Local,
    /// Search result with no enclosing section around the focused node.
    Sectionless,
    /// Nothing was focused; the first candidate was taken.
    Initial,
    /// Left a section towards a node outside any registered section.
    Unsectioned,
    /// Left a section and entered the given one.
    Entered(SectionId),
    /// [`Navigator::focus_section`].
    Requested(SectionId),
}

/// Why an input was consumed without a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The key does not map to a direction.
    NotDirectional,
    /// A held key in a section that does not handle repeats.
    Repeat,
    /// Key releases never navigate.
    Release,
}

/// Result of one navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Focus moved.
    Moved {
        from: Option<NodeId>,
        to: NodeId,
        via: MoveKind,
    },
    /// The request resolved to the node that already had focus, as when an
    /// enclosing section's last focused item is the current one.
    Unchanged { at: NodeId, via: MoveKind },
    /// The leave guard of the current section refused the move.
    Vetoed { from: NodeId, to: NodeId },
    /// No eligible candidate.
    NoCandidate,
    /// The input was consumed without a search.
    Ignored(IgnoreReason),
}

impl NavOutcome {
    /// Newly focused node, if focus moved.
    #[must_use]
    pub const fn moved_to(&self) -> Option<NodeId> {
        match self {
            Self::Moved { to, .. } => Some(*to),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Navigation counters since construction or the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavStats {
    /// Geometric searches, fallbacks included.
    pub searches: u64,
    /// Searches re-run on the full pool after an empty visible-set search.
    pub fallback_searches: u64,
    pub shortcut_hits: u64,
    pub vetoes: u64,
    /// Section boundary crossings that moved focus.
    pub hand_offs: u64,
    /// Requests that changed the focused node.
    pub moves: u64,
}

/// Document, sections and visibility tracking behind one entry point.
#[derive(Debug)]
pub struct Navigator {
    doc: Document,
    sections: SectionRegistry,
    defaults: SectionConfig,
    tracker: VisibilityTracker,
    search_type: CandidatesSearchType,
    stats: NavStats,
}

impl Navigator {
    /// Navigator over an empty document whose body covers `viewport`.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self::with_document(Document::new(viewport))
    }

    /// Navigator over an existing document.
    #[must_use]
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc,
            sections: SectionRegistry::new(),
            defaults: SectionConfig::default(),
            tracker: VisibilityTracker::new(),
            search_type: CandidatesSearchType::default(),
            stats: NavStats::default(),
        }
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for the host. Structural changes reach the tracker on
    /// the next [`Navigator::pump`] or key dispatch.
    ///
    /// Focus moved through [`Document::focus`] bypasses the sections: no
    /// section remembers the node and no enter observer runs. Use
    /// [`Navigator::focus`] to move focus.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub const fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    #[must_use]
    pub const fn stats(&self) -> NavStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = NavStats::default();
    }

    // ----------------------------------------------------------------------
    // Sections
    // ----------------------------------------------------------------------

    /// Register a section named `name` rooted at `root`, starting from the
    /// current defaults. The root gets the root marker.
    pub fn attach_section(
        &mut self,
        name: impl Into<String>,
        root: NodeId,
    ) -> Result<SectionId, SectionError> {
        if !self.doc.is_alive(root) {
            return Err(DomError::StaleNode { node: root }.into());
        }
        if let Some(owner) = self.sections.section_for_root(&self.doc, root) {
            return Err(SectionError::RootTaken { root, owner });
        }
        let id = self.sections.register(name, self.defaults.clone())?;
        self.sections.set_root(id, Some(root))?;
        self.doc.insert_flags(root, NodeFlags::SECTION_ROOT)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(section = %id, %root, "section attached");
        Ok(id)
    }

    /// Unregister `id`. The root keeps its marker, so it still stops the
    /// nearest-root lookup during hand-off.
    pub fn detach_section(&mut self, id: SectionId) -> Result<Section, SectionError> {
        let section = self.sections.unregister(id)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(section = %id, name = section.name(), "section detached");
        Ok(section)
    }

    /// Move `id` to another root, or clear its root.
    pub fn set_section_root(
        &mut self,
        id: SectionId,
        root: Option<NodeId>,
    ) -> Result<(), SectionError> {
        if let Some(root) = root {
            if !self.doc.is_alive(root) {
                return Err(DomError::StaleNode { node: root }.into());
            }
            self.sections.set_root(id, Some(root))?;
            self.doc.insert_flags(root, NodeFlags::SECTION_ROOT)?;
        } else {
            self.sections.set_root(id, None)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<SectionId> {
        self.sections.id_by_name(name)
    }

    /// Overlay `partial` onto section `id`.
    pub fn customize_section(
        &mut self,
        id: SectionId,
        partial: PartialConfig,
    ) -> Result<(), SectionError> {
        self.sections
            .get_mut(id)
            .ok_or(SectionError::UnknownSection { id })?
            .customize(partial);
        Ok(())
    }

    /// Overlay `partial` onto the defaults used by the sectionless path and
    /// by sections attached from now on.
    pub fn customize_defaults(&mut self, partial: PartialConfig) {
        self.defaults.apply(partial);
    }

    #[must_use]
    pub const fn defaults(&self) -> &SectionConfig {
        &self.defaults
    }

    // ----------------------------------------------------------------------
    // Visibility
    // ----------------------------------------------------------------------

    pub fn set_candidates_search_type(&mut self, search_type: CandidatesSearchType) {
        self.search_type = search_type;
    }

    #[must_use]
    pub const fn candidates_search_type(&self) -> CandidatesSearchType {
        self.search_type
    }

    /// Observe every candidate under `root` and watch it for changes.
    pub fn start_observing(&mut self, root: NodeId) {
        self.doc.take_mutations();
        let initial: Vec<NodeId> = self.doc.items_within(root).collect();
        self.tracker.start_observing(initial, root);
    }

    pub fn stop_observing(&mut self) {
        self.tracker.stop_observing();
    }

    /// Deliver pending structural changes, then intersection changes, to the
    /// tracker. Returns the number of intersection reports.
    pub fn pump(&mut self) -> usize {
        self.flush_mutations();
        let entries = self.tracker.poll_intersections(&self.doc);
        self.tracker.apply_intersections(&entries);
        entries.len()
    }

    #[must_use]
    pub const fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    /// Visible candidates, in the order they became visible.
    pub fn visible_items(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tracker.visible().iter()
    }

    fn flush_mutations(&mut self) {
        if self.doc.has_pending_mutations() {
            let records = self.doc.take_mutations();
            self.tracker.on_mutations(&self.doc, &records);
        }
    }

    // ----------------------------------------------------------------------
    // Focus
    // ----------------------------------------------------------------------

    /// Focus `node` and notify enclosing sections. Returns `true` if focus
    /// changed.
    pub fn focus(&mut self, node: NodeId) -> Result<bool, DomError> {
        let changed = self.doc.focus(node)?;
        if changed && self.doc.is_item(node) {
            for id in self.sections.enclosing(&self.doc, node) {
                let Some(section) = self.sections.get_mut(id) else {
                    continue;
                };
                section.remember(node);
                let Some(root) = section.root() else {
                    continue;
                };
                let observer = section.config().enter_observer.clone();
                observer.on_enter(root, node);
            }
        }
        Ok(changed)
    }

    /// Focus `item` if it lies inside the section's root, otherwise the
    /// target of the section's enter-to policy.
    pub fn focus_section(
        &mut self,
        id: SectionId,
        item: Option<NodeId>,
    ) -> Result<NavOutcome, SectionError> {
        let section = self
            .sections
            .get(id)
            .ok_or(SectionError::UnknownSection { id })?;
        let inside = item.filter(|&node| {
            section
                .root()
                .is_some_and(|root| self.doc.is_connected(node) && self.doc.contains(root, node))
        });
        let Some(target) = inside.or_else(|| section.enter_target(&self.doc)) else {
            return Ok(NavOutcome::NoCandidate);
        };
        let from = self.doc.active_element();
        let via = MoveKind::Requested(id);
        if !self.focus(target)? {
            return Ok(NavOutcome::Unchanged { at: target, via });
        }
        self.stats.moves += 1;
        Ok(NavOutcome::Moved {
            from,
            to: target,
            via,
        })
    }

    // ----------------------------------------------------------------------
    // Input
    // ----------------------------------------------------------------------

    /// Move focus as if the arrow key for `direction` was pressed.
    ///
    /// With nothing focused, the first candidate in document order is
    /// focused instead.
    pub fn navigate(&mut self, direction: Direction) -> NavOutcome {
        if self.doc.active_element().is_none() {
            return self.focus_first();
        }
        self.dispatch_key(KeyEvent::from_direction(direction))
    }

    /// Handle a key event at the focused node.
    pub fn dispatch_key(&mut self, event: KeyEvent) -> NavOutcome {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("snav.dispatch_key", code = ?event.code).entered();
        #[cfg(feature = "tracing")]
        let started = std::time::Instant::now();

        self.flush_mutations();
        let outcome = match self.doc.active_element() {
            Some(current) => match self.sections.innermost(&self.doc, current) {
                Some(id) => self.dispatch_in_section(id, current, event),
                None => self.dispatch_sectionless(Some(current), event),
            },
            None => self.dispatch_sectionless(None, event),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            ?outcome,
            elapsed_us = started.elapsed().as_micros() as u64,
            "key dispatched"
        );
        outcome
    }

    fn dispatch_in_section(
        &mut self,
        id: SectionId,
        current: NodeId,
        event: KeyEvent,
    ) -> NavOutcome {
        let Some((root, config)) = self
            .sections
            .get(id)
            .and_then(|section| Some((section.root()?, section.config().clone())))
        else {
            return self.dispatch_sectionless(Some(current), event);
        };

        let direction = match decode(event, config.handle_repeat) {
            Ok(direction) => direction,
            Err(reason) => return NavOutcome::Ignored(reason),
        };

        if let Some(next) = shortcut::adjacent(&self.doc, config.kind, direction, current)
            && self.doc.contains(root, next)
        {
            self.stats.shortcut_hits += 1;
            return self.move_focus(Some(current), next, MoveKind::Shortcut);
        }

        let Some(next) = self.search(current, direction, &config) else {
            return NavOutcome::NoCandidate;
        };

        if self.doc.contains(root, next) {
            return self.move_focus(Some(current), next, MoveKind::Local);
        }

        let leave = LeaveEvent {
            direction,
            root,
            previous: current,
            next,
            sections: &self.sections,
        };
        if !config.leave_guard.allow_leave(&leave) {
            self.stats.vetoes += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(section = %id, %direction, "leave vetoed");
            return NavOutcome::Vetoed {
                from: current,
                to: next,
            };
        }
        let outcome = self.enter(current, next);
        if outcome.is_moved() {
            self.stats.hand_offs += 1;
        }
        outcome
    }

    /// Hand focus to the section around `next`, if any.
    fn enter(&mut self, current: NodeId, next: NodeId) -> NavOutcome {
        let entered = self
            .doc
            .closest(next, NodeFlags::SECTION_ROOT)
            .and_then(|root| self.sections.section_for_root(&self.doc, root));
        let Some(id) = entered else {
            return self.move_focus(Some(current), next, MoveKind::Unsectioned);
        };
        let target = self
            .sections
            .get(id)
            .and_then(|section| match section.config().enter_to {
                EnterTo::Calculated => None,
                EnterTo::LastFocused | EnterTo::DefaultElement => {
                    section.enter_target(&self.doc)
                }
            })
            .unwrap_or(next);
        self.move_focus(Some(current), target, MoveKind::Entered(id))
    }

    fn dispatch_sectionless(&mut self, current: Option<NodeId>, event: KeyEvent) -> NavOutcome {
        let direction = match decode(event, self.defaults.handle_repeat) {
            Ok(direction) => direction,
            Err(reason) => return NavOutcome::Ignored(reason),
        };
        let Some(current) = current else {
            return self.focus_first();
        };
        let config = self.defaults.clone();
        match self.search(current, direction, &config) {
            Some(next) => self.move_focus(Some(current), next, MoveKind::Sectionless),
            None => NavOutcome::NoCandidate,
        }
    }

    fn focus_first(&mut self) -> NavOutcome {
        match self.doc.first_item() {
            Some(first) => self.move_focus(None, first, MoveKind::Initial),
            None => NavOutcome::NoCandidate,
        }
    }

    /// Preferred pool first, full pool as the fallback.
    fn search(
        &mut self,
        current: NodeId,
        direction: Direction,
        config: &SectionConfig,
    ) -> Option<NodeId> {
        let use_visible = self.search_type == CandidatesSearchType::VisibleFirst
            && !self.tracker.visible().is_empty();

        if use_visible {
            self.stats.searches += 1;
            let doc = &self.doc;
            let pool = self
                .tracker
                .visible()
                .iter()
                .filter(|&node| doc.is_item(node) && doc.is_connected(node));
            let found = find_closest(
                doc,
                current,
                pool,
                direction,
                config.navigation_mode,
                &config.allowed_angles,
            );
            if found.is_some() {
                return found;
            }
            self.stats.fallback_searches += 1;
        }

        self.stats.searches += 1;
        find_closest(
            &self.doc,
            current,
            self.doc.items(),
            direction,
            config.navigation_mode,
            &config.allowed_angles,
        )
    }

    fn move_focus(&mut self, from: Option<NodeId>, to: NodeId, via: MoveKind) -> NavOutcome {
        match self.focus(to) {
            Ok(true) => {
                self.stats.moves += 1;
                NavOutcome::Moved { from, to, via }
            }
            Ok(false) => NavOutcome::Unchanged { at: to, via },
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%to, error = %_err, "focus target rejected");
                NavOutcome::NoCandidate
            }
        }
    }
}

/// Direction of a key event, or why it is dropped.
fn decode(event: KeyEvent, handle_repeat: bool) -> Result<Direction, IgnoreReason> {
    match event.kind {
        KeyEventKind::Release => return Err(IgnoreReason::Release),
        KeyEventKind::Repeat if !handle_repeat => return Err(IgnoreReason::Repeat),
        KeyEventKind::Press | KeyEventKind::Repeat => {}
    }
    event.direction().ok_or(IgnoreReason::NotDirectional)
}
