//! Edit modes as a state machine.
//!
//! Each mode turns a galaxy-view click or context-menu request into an
//! [`Intent`] the session carries out. The session never branches on the
//! mode itself; it asks the active [`ModeHandler`].

use starmap_core::DivisionRegistry;
use starmap_spatial::{Pick, Point};
use starmap_types::{ADMIN_DEPTH, AdminLevels, EditMode};

/// A click in the galaxy view, already hit-tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    /// What the click hit.
    pub pick: Pick,
    /// World position of the click.
    pub world: Point,
    /// Whether shift was held.
    pub shift: bool,
}

/// What a click asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Select the star and open its system view for editing.
    Open(usize),
    /// Select what was picked without opening anything. `Pick::Empty`
    /// clears the selection.
    Select(Pick),
    /// Create a lane between two stars.
    Connect {
        /// Star the lane starts at.
        from: usize,
        /// Star the lane ends at.
        to: usize,
    },
    /// Paint a star into a division at the current focus depth.
    Paint {
        /// Star to paint.
        star: usize,
        /// Division index at the focus depth.
        target: usize,
    },
    /// Create a star at a world position.
    CreateStar(Point),
}

/// An entry of the galaxy-view context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextAction {
    /// Delete the star.
    RemoveStar(usize),
    /// Start a lane at the star; the next star clicked ends it.
    StartHyperlane(usize),
    /// Delete the lane.
    RemoveHyperlane(usize),
    /// Clear every division of the star as of the current year.
    Unassign(usize),
}

/// Mode-specific behaviour of the galaxy view.
pub trait ModeHandler {
    /// Which mode this is.
    fn edit_mode(&self) -> EditMode;

    /// Interpret a click.
    fn on_click(&mut self, click: &Click) -> Intent;

    /// Context-menu entries for what was picked.
    fn context_actions(&self, pick: Pick) -> Vec<ContextAction>;

    /// Drop any half-finished gesture.
    fn cancel(&mut self) {}

    /// The drill-down path territories and stars are coloured under.
    fn focus(&self) -> &[usize] {
        &[]
    }

    /// Whether territory polygons are drawn.
    fn shows_territories(&self) -> bool {
        true
    }

    /// Whether stars are tinted by their division colour.
    fn tints_stars(&self) -> bool {
        false
    }

    /// Whether the star assigned to `levels` gets the highlight outline.
    fn highlights(&self, levels: &AdminLevels) -> bool;
}

/// Browse mode: clicking a star opens it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewHandler;

impl ModeHandler for ViewHandler {
    fn edit_mode(&self) -> EditMode {
        EditMode::View
    }

    fn on_click(&mut self, click: &Click) -> Intent {
        match click.pick {
            Pick::Star(star) => Intent::Open(star),
            pick => Intent::Select(pick),
        }
    }

    fn context_actions(&self, _pick: Pick) -> Vec<ContextAction> {
        Vec::new()
    }

    fn highlights(&self, _levels: &AdminLevels) -> bool {
        false
    }
}

/// Structure mode: stars and lanes are created and removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeographyHandler {
    lane_from: Option<usize>,
}

impl GeographyHandler {
    /// Star a lane is being drawn from.
    pub const fn lane_from(&self) -> Option<usize> {
        self.lane_from
    }

    /// Begin a lane at `star`.
    pub const fn start_lane(&mut self, star: usize) {
        self.lane_from = Some(star);
    }

    /// Renumber the pending lane start after a star deletion.
    pub fn remap_lane_from(&mut self, f: impl FnOnce(usize) -> Option<usize>) {
        self.lane_from = self.lane_from.and_then(f);
    }
}

impl ModeHandler for GeographyHandler {
    fn edit_mode(&self) -> EditMode {
        EditMode::Geography
    }

    fn on_click(&mut self, click: &Click) -> Intent {
        if let (Some(from), Pick::Star(to)) = (self.lane_from, click.pick) {
            if from != to {
                self.lane_from = None;
                return Intent::Connect { from, to };
            }
        }
        self.lane_from = None;
        match click.pick {
            Pick::Empty if click.shift => Intent::CreateStar(click.world),
            pick => Intent::Select(pick),
        }
    }

    fn context_actions(&self, pick: Pick) -> Vec<ContextAction> {
        match pick {
            Pick::Star(star) => vec![
                ContextAction::RemoveStar(star),
                ContextAction::StartHyperlane(star),
            ],
            Pick::Lane(lane) => vec![ContextAction::RemoveHyperlane(lane)],
            Pick::Empty => Vec::new(),
        }
    }

    fn cancel(&mut self) {
        self.lane_from = None;
    }

    fn shows_territories(&self) -> bool {
        false
    }

    fn highlights(&self, _levels: &AdminLevels) -> bool {
        self.lane_from.is_some()
    }
}

/// Political mode: drill into a division and paint stars into its
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoliticalHandler {
    focus: Vec<usize>,
    paint_target: Option<usize>,
}

impl PoliticalHandler {
    /// Division index clicks paint into, at depth `focus().len()`.
    pub const fn paint_target(&self) -> Option<usize> {
        self.paint_target
    }

    /// Choose the paint target, or stop painting with `None`.
    pub const fn set_paint_target(&mut self, target: Option<usize>) {
        self.paint_target = target;
    }

    /// Drill into child `index` of the focused division. Returns `false`
    /// when already focused on a cluster's parent level.
    pub fn push_focus(&mut self, index: usize) -> bool {
        if self.focus.len() >= ADMIN_DEPTH.saturating_sub(1) {
            return false;
        }
        self.focus.push(index);
        self.paint_target = None;
        true
    }

    /// Step back out one level.
    pub fn pop_focus(&mut self) -> Option<usize> {
        let popped = self.focus.pop();
        if popped.is_some() {
            self.paint_target = None;
        }
        popped
    }

    /// Forget the focus levels and paint target `registry` no longer has.
    /// Returns whether anything was dropped.
    pub fn retain_existing(&mut self, registry: &DivisionRegistry) -> bool {
        let before = (self.focus.len(), self.paint_target);
        let depth = registry.existing_depth(&self.focus);
        if depth < self.focus.len() {
            self.focus.truncate(depth);
            self.paint_target = None;
        }
        if let Some(target) = self.paint_target {
            let mut path = self.focus.clone();
            path.push(target);
            if !registry.contains(&path) {
                self.paint_target = None;
            }
        }
        (self.focus.len(), self.paint_target) != before
    }
}

impl ModeHandler for PoliticalHandler {
    fn edit_mode(&self) -> EditMode {
        EditMode::Political
    }

    fn on_click(&mut self, click: &Click) -> Intent {
        match (self.paint_target, click.pick) {
            (Some(target), Pick::Star(star)) => Intent::Paint { star, target },
            (_, pick) => Intent::Select(pick),
        }
    }

    fn context_actions(&self, pick: Pick) -> Vec<ContextAction> {
        match pick {
            Pick::Star(star) => vec![ContextAction::Unassign(star)],
            Pick::Lane(_) | Pick::Empty => Vec::new(),
        }
    }

    fn focus(&self) -> &[usize] {
        &self.focus
    }

    fn tints_stars(&self) -> bool {
        true
    }

    fn highlights(&self, levels: &AdminLevels) -> bool {
        self.paint_target
            .is_some_and(|target| levels.get(self.focus.len()) != Some(target))
    }
}

/// The active mode and its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Browsing.
    View(ViewHandler),
    /// Editing structure.
    Geography(GeographyHandler),
    /// Editing borders.
    Political(PoliticalHandler),
}

impl Default for Mode {
    fn default() -> Self {
        Self::View(ViewHandler)
    }
}

impl Mode {
    /// A fresh handler for `mode`.
    pub fn new(mode: EditMode) -> Self {
        match mode {
            EditMode::View => Self::View(ViewHandler),
            EditMode::Geography => Self::Geography(GeographyHandler::default()),
            EditMode::Political => Self::Political(PoliticalHandler::default()),
        }
    }

    /// The active handler.
    pub fn handler(&self) -> &dyn ModeHandler {
        match self {
            Self::View(h) => h,
            Self::Geography(h) => h,
            Self::Political(h) => h,
        }
    }

    /// The active handler, mutably.
    pub fn handler_mut(&mut self) -> &mut dyn ModeHandler {
        match self {
            Self::View(h) => h,
            Self::Geography(h) => h,
            Self::Political(h) => h,
        }
    }

    /// Geography state, when in that mode.
    pub const fn geography_mut(&mut self) -> Option<&mut GeographyHandler> {
        match self {
            Self::Geography(h) => Some(h),
            _ => None,
        }
    }

    /// Political state, when in that mode.
    pub const fn political(&self) -> Option<&PoliticalHandler> {
        match self {
            Self::Political(h) => Some(h),
            _ => None,
        }
    }

    /// Political state, mutably.
    pub const fn political_mut(&mut self) -> Option<&mut PoliticalHandler> {
        match self {
            Self::Political(h) => Some(h),
            _ => None,
        }
    }
}
