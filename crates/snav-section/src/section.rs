#![forbid(unsafe_code)]

//! Sections: named focus groups with their own navigation settings and
//! boundary hooks.
//!
//! A [`Section`] owns a [`SectionConfig`]. Configuration changes go through
//! [`PartialConfig`]: only the fields that are set override, everything else
//! keeps its previous value. New sections start from the navigator's current
//! defaults.
//!
//! # Hooks
//!
//! | Hook | Shape | Default |
//! |------|-------|---------|
//! | [`BoundaryGuard`] | `(&LeaveEvent) -> bool`, `false` vetoes | always allow |
//! | [`BoundaryObserver`] | `(root, item)` notification | no-op |
//! | [`DefaultElement`] | `(&Document, root) -> Option<NodeId>` | none |
//!
//! Plain closures implement all three.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use snav_core::nav::{AllowedAngles, Direction, EnterTo, NavigationMode, SectionKind};
use snav_dom::{Document, NodeId};

use crate::registry::SectionRegistry;

/// Context passed to a [`BoundaryGuard`] when a move would leave a section.
#[derive(Debug, Clone, Copy)]
pub struct LeaveEvent<'a> {
    pub direction: Direction,
    /// Root of the section being left.
    pub root: NodeId,
    /// Item that had focus.
    pub previous: NodeId,
    /// Geometrically resolved item outside the section.
    pub next: NodeId,
    /// All registered sections, for name lookups.
    pub sections: &'a SectionRegistry,
}

/// Decides whether focus may leave a section.
pub trait BoundaryGuard {
    fn allow_leave(&self, event: &LeaveEvent<'_>) -> bool;
}

impl<F> BoundaryGuard for F
where
    F: Fn(&LeaveEvent<'_>) -> bool,
{
    fn allow_leave(&self, event: &LeaveEvent<'_>) -> bool {
        self(event)
    }
}

/// Notified when a candidate inside a section gains focus.
pub trait BoundaryObserver {
    fn on_enter(&self, root: NodeId, item: NodeId);
}

impl<F> BoundaryObserver for F
where
    F: Fn(NodeId, NodeId),
{
    fn on_enter(&self, root: NodeId, item: NodeId) {
        self(root, item)
    }
}

/// Supplies the item to focus for [`EnterTo::DefaultElement`].
pub trait DefaultElement {
    fn default_element(&self, doc: &Document, root: NodeId) -> Option<NodeId>;
}

impl<F> DefaultElement for F
where
    F: Fn(&Document, NodeId) -> Option<NodeId>,
{
    fn default_element(&self, doc: &Document, root: NodeId) -> Option<NodeId> {
        self(doc, root)
    }
}

/// Guard that never vetoes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAllow;

impl BoundaryGuard for AlwaysAllow {
    fn allow_leave(&self, _event: &LeaveEvent<'_>) -> bool {
        true
    }
}

/// Observer that ignores notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreEnter;

impl BoundaryObserver for IgnoreEnter {
    fn on_enter(&self, _root: NodeId, _item: NodeId) {}
}

/// Default-element getter that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaultElement;

impl DefaultElement for NoDefaultElement {
    fn default_element(&self, _doc: &Document, _root: NodeId) -> Option<NodeId> {
        None
    }
}

/// Serializable part of a configuration override.
///
/// Every field is optional; missing fields in JSON leave the target
/// configuration untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_mode: Option<NavigationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_angles: Option<AllowedAngles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter_to: Option<EnterTo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_repeat: Option<bool>,
}

/// Full configuration of a section (or of the sectionless defaults).
#[derive(Clone)]
pub struct SectionConfig {
    pub navigation_mode: NavigationMode,
    pub kind: SectionKind,
    pub allowed_angles: AllowedAngles,
    pub enter_to: EnterTo,
    /// When `false`, held-key repeats are swallowed.
    pub handle_repeat: bool,
    pub leave_guard: Rc<dyn BoundaryGuard>,
    pub enter_observer: Rc<dyn BoundaryObserver>,
    pub default_element: Rc<dyn DefaultElement>,
}

impl SectionConfig {
    /// Overlay `partial`: set fields replace, unset fields are kept.
    pub fn apply(&mut self, partial: PartialConfig) {
        let PartialConfig {
            settings,
            leave_guard,
            enter_observer,
            default_element,
        } = partial;

        if let Some(mode) = settings.navigation_mode {
            self.navigation_mode = mode;
        }
        if let Some(kind) = settings.kind {
            self.kind = kind;
        }
        if let Some(angles) = settings.allowed_angles {
            self.allowed_angles = angles;
        }
        if let Some(enter_to) = settings.enter_to {
            self.enter_to = enter_to;
        }
        if let Some(handle_repeat) = settings.handle_repeat {
            self.handle_repeat = handle_repeat;
        }
        if let Some(guard) = leave_guard {
            self.leave_guard = guard;
        }
        if let Some(observer) = enter_observer {
            self.enter_observer = observer;
        }
        if let Some(getter) = default_element {
            self.default_element = getter;
        }
    }

    /// Snapshot of the serializable fields, all set.
    #[must_use]
    pub fn settings(&self) -> NavSettings {
        NavSettings {
            navigation_mode: Some(self.navigation_mode),
            kind: Some(self.kind),
            allowed_angles: Some(self.allowed_angles),
            enter_to: Some(self.enter_to),
            handle_repeat: Some(self.handle_repeat),
        }
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            navigation_mode: NavigationMode::ClosestByDistance,
            kind: SectionKind::Arbitrary,
            allowed_angles: AllowedAngles::default(),
            enter_to: EnterTo::Calculated,
            handle_repeat: true,
            leave_guard: Rc::new(AlwaysAllow),
            enter_observer: Rc::new(IgnoreEnter),
            default_element: Rc::new(NoDefaultElement),
        }
    }
}

impl fmt::Debug for SectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionConfig")
            .field("navigation_mode", &self.navigation_mode)
            .field("kind", &self.kind)
            .field("allowed_angles", &self.allowed_angles)
            .field("enter_to", &self.enter_to)
            .field("handle_repeat", &self.handle_repeat)
            .finish_non_exhaustive()
    }
}

/// Configuration override: settings plus optional hooks.
#[derive(Clone, Default)]
pub struct PartialConfig {
    pub settings: NavSettings,
    pub leave_guard: Option<Rc<dyn BoundaryGuard>>,
    pub enter_observer: Option<Rc<dyn BoundaryObserver>>,
    pub default_element: Option<Rc<dyn DefaultElement>>,
}

impl PartialConfig {
    /// Empty override.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn navigation_mode(mut self, mode: NavigationMode) -> Self {
        self.settings.navigation_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: SectionKind) -> Self {
        self.settings.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn allowed_angles(mut self, angles: AllowedAngles) -> Self {
        self.settings.allowed_angles = Some(angles);
        self
    }

    #[must_use]
    pub fn enter_to(mut self, enter_to: EnterTo) -> Self {
        self.settings.enter_to = Some(enter_to);
        self
    }

    #[must_use]
    pub fn handle_repeat(mut self, handle_repeat: bool) -> Self {
        self.settings.handle_repeat = Some(handle_repeat);
        self
    }

    #[must_use]
    pub fn on_leave(mut self, guard: impl BoundaryGuard + 'static) -> Self {
        self.leave_guard = Some(Rc::new(guard));
        self
    }

    #[must_use]
    pub fn on_enter(mut self, observer: impl BoundaryObserver + 'static) -> Self {
        self.enter_observer = Some(Rc::new(observer));
        self
    }

    #[must_use]
    pub fn default_element(mut self, getter: impl DefaultElement + 'static) -> Self {
        self.default_element = Some(Rc::new(getter));
        self
    }
}

impl From<NavSettings> for PartialConfig {
    fn from(settings: NavSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}

impl fmt::Debug for PartialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialConfig")
            .field("settings", &self.settings)
            .field("leave_guard", &self.leave_guard.is_some())
            .field("enter_observer", &self.enter_observer.is_some())
            .field("default_element", &self.default_element.is_some())
            .finish()
    }
}

/// A named focus group rooted at a node.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    root: Option<NodeId>,
    config: SectionConfig,
    last_focused: Option<NodeId>,
}

impl Section {
    pub(crate) fn new(name: impl Into<String>, config: SectionConfig) -> Self {
        Self {
            name: name.into(),
            root: None,
            config,
            last_focused: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node, once attached.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    #[must_use]
    pub const fn config(&self) -> &SectionConfig {
        &self.config
    }

    /// Overlay `partial` onto this section's configuration.
    pub fn customize(&mut self, partial: PartialConfig) {
        self.config.apply(partial);
    }

    /// Candidate that last gained focus inside the root.
    #[must_use]
    pub const fn last_focused(&self) -> Option<NodeId> {
        self.last_focused
    }

    pub(crate) fn remember(&mut self, item: NodeId) {
        self.last_focused = Some(item);
    }

    /// Item selected by the enter-to policy alone, without a resolved
    /// fallback. Only connected nodes are returned.
    ///
    /// `Calculated` means the first candidate inside the root.
    #[must_use]
    pub fn enter_target(&self, doc: &Document) -> Option<NodeId> {
        let root = self.root?;
        let target = match self.config.enter_to {
            EnterTo::Calculated => doc.first_item_within(root),
            EnterTo::LastFocused => self.last_focused,
            EnterTo::DefaultElement => self.config.default_element.default_element(doc, root),
        };
        target.filter(|&node| doc.is_connected(node))
    }
}
