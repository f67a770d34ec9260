#![forbid(unsafe_code)]

//! Directional candidate resolution.
//!
//! Given a reference node and a pool, [`find_closest`] returns the best
//! candidate in a direction:
//!
//! 1. Centers are compared (`left + floor(width / 2)`, same for y).
//! 2. Disabled members, members at distance 0, and members outside the
//!    open sector of `allowed[direction]` degrees around the direction's axis
//!    are skipped.
//! 3. The survivors go through the mode filter, which keeps running minima
//!    in an [`Accumulator`].
//!
//! # Tie-breaking
//!
//! - `ClosestByDistance` accepts on strictly smaller distance, so among
//!   equally distant members the first one in pool order wins.
//! - `ClosestByDirection` accepts on `<=` for both lateral deviation and
//!   distance, so among exact ties the last one in pool order wins.
//!
//! The accumulator lives for one call only, so searches are re-entrant.

use snav_core::geometry::Rect;
use snav_core::nav::{AllowedAngles, Direction, NavigationMode};
use snav_dom::{Document, NodeId};

/// Read-only box source for the resolver.
pub trait Geometry {
    /// Current box of `node`, or `None` if it no longer exists.
    fn bounding_box(&self, node: NodeId) -> Option<Rect>;

    /// Whether `node` must be skipped.
    fn is_disabled(&self, node: NodeId) -> bool;
}

impl Geometry for Document {
    #[inline]
    fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        self.rect(node)
    }

    #[inline]
    fn is_disabled(&self, node: NodeId) -> bool {
        Document::is_disabled(self, node)
    }
}

/// Running minima for one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulator {
    min_lateral: f64,
    min_distance: f64,
}

impl Accumulator {
    /// Fresh accumulator: both minima at infinity.
    pub const INITIAL: Self = Self {
        min_lateral: f64::INFINITY,
        min_distance: f64::INFINITY,
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::INITIAL
    }

    /// Whether no candidate has been accepted since construction or reset.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        *self == Self::INITIAL
    }

    /// Smallest accepted distance so far.
    #[must_use]
    pub const fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// Smallest accepted lateral deviation so far (direction mode only).
    #[must_use]
    pub const fn min_lateral(&self) -> f64 {
        self.min_lateral
    }

    pub fn reset(&mut self) {
        *self = Self::INITIAL;
    }

    /// Offer a candidate with displacement `(dx, dy)` and `distance`.
    /// Returns `true` if it becomes the current best.
    pub fn offer(
        &mut self,
        mode: NavigationMode,
        direction: Direction,
        dx: f64,
        dy: f64,
        distance: f64,
    ) -> bool {
        match mode {
            NavigationMode::ClosestByDistance => {
                if distance < self.min_distance {
                    self.min_distance = distance;
                    return true;
                }
                false
            }
            NavigationMode::ClosestByDirection => {
                let lateral = direction.lateral(dx, dy);
                if lateral <= self.min_lateral && distance <= self.min_distance {
                    self.min_lateral = lateral;
                    self.min_distance = distance;
                    return true;
                }
                false
            }
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the best candidate from `reference` towards `direction`.
///
/// Returns `None` for an empty pool, when nothing survives filtering, or
/// when `reference` has no box.
pub fn find_closest<G, I>(
    geometry: &G,
    reference: NodeId,
    pool: I,
    direction: Direction,
    mode: NavigationMode,
    allowed: &AllowedAngles,
) -> Option<NodeId>
where
    G: Geometry + ?Sized,
    I: IntoIterator<Item = NodeId>,
{
    let origin = geometry.bounding_box(reference)?.center();
    let half_sector = allowed.get(direction) / 2.0;

    let mut accumulator = Accumulator::new();
    let mut best = None;
    #[cfg(feature = "tracing")]
    let mut scanned = 0usize;

    for candidate in pool {
        #[cfg(feature = "tracing")]
        {
            scanned += 1;
        }
        if geometry.is_disabled(candidate) {
            continue;
        }
        let Some(rect) = geometry.bounding_box(candidate) else {
            continue;
        };
        let (dx, dy) = origin.offset_to(rect.center());
        let distance = dx.hypot(dy);
        // Also rejects NaN.
        if !(distance > 0.0) {
            continue;
        }
        let degrees = dy.atan2(dx).to_degrees();
        if !direction.sector_contains(degrees, half_sector) {
            continue;
        }
        if accumulator.offer(mode, direction, dx, dy, distance) {
            best = Some(candidate);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        %direction,
        ?mode,
        scanned,
        found = best.is_some(),
        min_distance = accumulator.min_distance(),
        "directional search finished"
    );
    best
}
