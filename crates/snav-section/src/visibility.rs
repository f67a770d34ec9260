#![forbid(unsafe_code)]

//! Visible-set maintenance.
//!
//! The tracker keeps the set of observed candidates whose boxes currently
//! intersect the viewport. It is fed from two directions:
//!
//! - **Intersections**: [`VisibilityTracker::poll_intersections`] compares
//!   each observed box with the viewport and reports state changes;
//!   [`VisibilityTracker::apply_intersections`] folds reports into the set.
//! - **Structure**: [`VisibilityTracker::on_mutations`] starts observing
//!   candidates attached under the watched root and evicts detached nodes
//!   at once, without waiting for the next intersection report.
//!
//! Iteration order of the set is insertion order, not document order.
//! The tracker knows nothing about sections.

use indexmap::{IndexMap, IndexSet};
use snav_dom::{Document, MutationRecord, NodeId};

/// Candidates currently on screen, in the order they became visible.
#[derive(Debug, Clone, Default)]
pub struct VisibleSet {
    members: IndexSet<NodeId>,
}

impl VisibleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node`; returns `false` if it was already present.
    pub fn insert(&mut self, node: NodeId) -> bool {
        self.members.insert(node)
    }

    /// Remove `node`, keeping the order of the remaining members.
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.members.shift_remove(&node)
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }
}

/// One intersection report for an observed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

/// Predicate deciding which attached nodes get observed.
pub type TrackFilter = fn(&Document, NodeId) -> bool;

/// Incrementally maintained [`VisibleSet`].
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    visible: VisibleSet,
    /// Observed targets and their last reported state (`None` before the
    /// first report).
    observed: IndexMap<NodeId, Option<bool>>,
    watched: Option<NodeId>,
    filter: TrackFilter,
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityTracker {
    /// Tracker that observes candidate items.
    #[must_use]
    pub fn new() -> Self {
        Self::with_filter(|doc, node| doc.is_item(node))
    }

    /// Tracker that observes attached nodes accepted by `filter`.
    #[must_use]
    pub fn with_filter(filter: TrackFilter) -> Self {
        Self {
            visible: VisibleSet::new(),
            observed: IndexMap::new(),
            watched: None,
            filter,
        }
    }

    /// Observe `initial` and watch `root`'s subtree for structural changes.
    ///
    /// Any previous tracking is stopped first.
    pub fn start_observing<I>(&mut self, initial: I, root: NodeId)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.stop_observing();
        self.watched = Some(root);
        for node in initial {
            self.observe(node);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(%root, observed = self.observed.len(), "visibility tracking started");
    }

    /// Disconnect all tracking and clear the visible set.
    pub fn stop_observing(&mut self) {
        #[cfg(feature = "tracing")]
        if self.watched.is_some() {
            tracing::debug!(
                observed = self.observed.len(),
                visible = self.visible.len(),
                "visibility tracking stopped"
            );
        }
        self.observed.clear();
        self.visible.clear();
        self.watched = None;
    }

    #[must_use]
    pub const fn is_observing(&self) -> bool {
        self.watched.is_some()
    }

    /// Root whose subtree is watched for structural changes.
    #[must_use]
    pub const fn watched_root(&self) -> Option<NodeId> {
        self.watched
    }

    /// Start observing `target`. Its first poll always reports.
    pub fn observe(&mut self, target: NodeId) {
        self.observed.entry(target).or_insert(None);
    }

    /// Stop observing `target` and evict it from the visible set.
    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.shift_remove(&target);
        self.visible.remove(target);
    }

    #[must_use]
    pub fn is_observed(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    #[must_use]
    pub fn observed_len(&self) -> usize {
        self.observed.len()
    }

    #[must_use]
    pub const fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// Fold intersection reports into the visible set. Reports for targets
    /// that are not observed are ignored.
    pub fn apply_intersections(&mut self, entries: &[IntersectionEntry]) {
        for entry in entries {
            let Some(state) = self.observed.get_mut(&entry.target) else {
                continue;
            };
            *state = Some(entry.is_intersecting);
            if entry.is_intersecting {
                self.visible.insert(entry.target);
            } else {
                self.visible.remove(entry.target);
            }
        }
    }

    /// Compare every observed box with the viewport and report targets
    /// whose state differs from their last report. Nothing is applied.
    #[must_use]
    pub fn poll_intersections(&self, doc: &Document) -> Vec<IntersectionEntry> {
        self.observed
            .iter()
            .filter_map(|(&target, &last)| {
                let now = doc.is_connected(target) && doc.intersects_viewport(target);
                (last != Some(now)).then_some(IntersectionEntry {
                    target,
                    is_intersecting: now,
                })
            })
            .collect()
    }

    /// Handle structural changes.
    ///
    /// Every removed node is unobserved and evicted, whatever its flags; its
    /// id may already be stale. Added nodes are observed when they sit
    /// under the watched root and pass the filter.
    pub fn on_mutations(&mut self, doc: &Document, records: &[MutationRecord]) {
        let Some(root) = self.watched else {
            return;
        };
        #[cfg(feature = "tracing")]
        let (before_observed, before_visible) = (self.observed.len(), self.visible.len());

        for record in records {
            for &node in &record.removed {
                self.unobserve(node);
            }
            for &node in &record.added {
                if doc.contains(root, node) && (self.filter)(doc, node) {
                    self.observe(node);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            records = records.len(),
            observed_before = before_observed,
            observed_after = self.observed.len(),
            evicted = before_visible.saturating_sub(self.visible.len()),
            "visibility tracker handled mutations"
        );
    }
}
