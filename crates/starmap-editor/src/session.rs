//! The editing session: everything one operator has open, and every action
//! they can take on it.
//!
//! The session owns the galaxy (shared copy-on-write with whatever renders
//! it), the division registry, the selection and the open star's editable
//! copy. User edits are applied locally at once and handed to the
//! [`SyncTracker`]; the persist pipeline in [`crate::persist`] and the poll
//! merge in [`crate::reconcile`] are further `impl` blocks on the same type.
//!
//! Structural edits (adding and removing stars and lanes) are not debounced.
//! They are applied locally, sent to the store straight away, and undone
//! from a checkpoint if the store refuses them.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use starmap_core::admin::{self, editable};
use starmap_core::config::EditorConfig;
use starmap_core::recency::{border_recency, rank_by_recency};
use starmap_core::registry::random_color;
use starmap_core::resolve::resolve_all_admin;
use starmap_core::structure;
use starmap_core::system::{fallback_star, new_body, star_from_profile};
use starmap_core::{Calendar, CoreError, DivisionRegistry, IndexRemap, ProfileUpdate};
use starmap_spatial::picker::{pick_body, pick_region};
use starmap_spatial::{Drag, Pick, Picker, Point, ScreenSize, Tessellation, Viewport};
use starmap_store::{GalaxyStore, StoreError};
use starmap_types::{
    AdminLevels, CelestialBody, CountryProfile, DivisionLevel, EditMode, Galaxy, GalaxyTarget,
    PositionSignature, ResourceDefinition, Selection, SessionId, Star, TimelineEvent, ViewMode,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::EditorError;
use crate::mode::{Click, ContextAction, Intent, Mode, ModeHandler, PoliticalHandler};
use crate::scene::{GalaxyView, Scene, galaxy_scene, system_scene};
use crate::status::{
    Feedback, GALAXY_LOAD_FAILED, LANE_ADD_FAILED, LANE_ADDED, LANE_REMOVE_FAILED, LANE_REMOVED,
    Modal, STAR_ADD_FAILED, STAR_ADDED, STAR_REMOVE_FAILED, STAR_REMOVED, Status,
};
use crate::sync::{EntityKey, Origin, SyncState, SyncTracker};

/// What happens to the open star's lower divisions when it moves to
/// another country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryChange {
    /// Clear sector, province and cluster.
    ClearLower,
    /// Keep the sector by name: use the new country's sector of that name,
    /// creating it there if it has none. Province and cluster are cleared.
    CarryIntoNewParent,
}

/// Result of moving the open star to another country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryChangeOutcome {
    /// The star has a sector; ask the operator and call again with a
    /// [`CountryChange`].
    NeedsDecision,
    /// The star already belonged to that country.
    Unchanged,
    /// The country was set.
    Changed {
        /// The star's sector in the new country, when it was carried over.
        sector: Option<usize>,
    },
}

/// Result of asking for a new division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivisionOutcome {
    /// A sibling already has the name. Siblings never share a name, so
    /// the operator either reuses it (call again with `reuse_existing`) or
    /// picks another name.
    NeedsDecision {
        /// Index of the sibling with the same name.
        existing: usize,
    },
    /// The existing sibling was used.
    Reused {
        /// Its index.
        index: usize,
    },
    /// A new division was appended.
    Created {
        /// Its index.
        index: usize,
    },
}

impl DivisionOutcome {
    /// The division now in use, unless a decision is pending.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::NeedsDecision { .. } => None,
            Self::Reused { index } | Self::Created { index } => Some(index),
        }
    }
}

/// State to return to when the store refuses a structural edit.
#[derive(Debug, Clone)]
struct Checkpoint {
    galaxy: Arc<Galaxy>,
    tracker: SyncTracker,
    selection: Option<Selection>,
    signature: Option<PositionSignature>,
    draft: Option<Star>,
    galaxy_selection: Option<GalaxyTarget>,
    mode: Mode,
    viewport: Viewport,
}

/// One operator's editing session.
#[derive(Debug)]
pub struct EditorSession {
    pub(crate) id: SessionId,
    pub(crate) config: EditorConfig,
    pub(crate) calendar: Calendar,
    pub(crate) year: i32,
    pub(crate) galaxy: Arc<Galaxy>,
    pub(crate) resources: Vec<ResourceDefinition>,
    pub(crate) registry: DivisionRegistry,
    pub(crate) selection: Option<Selection>,
    pub(crate) signature: Option<PositionSignature>,
    pub(crate) draft: Option<Star>,
    pub(crate) galaxy_selection: Option<GalaxyTarget>,
    pub(crate) mode: Mode,
    pub(crate) viewport: Viewport,
    pub(crate) territories: Tessellation,
    pub(crate) tracker: SyncTracker,
    pub(crate) feedback: Feedback,
    pub(crate) rng: StdRng,
}

impl EditorSession {
    /// An empty session. Use [`Self::load`] to start from the store.
    pub fn new(config: EditorConfig, size: ScreenSize) -> Self {
        let calendar = Calendar::from(config.calendar);
        Self {
            id: SessionId::new(),
            calendar,
            year: calendar.min_year(),
            galaxy: Arc::default(),
            resources: Vec::new(),
            registry: DivisionRegistry::default(),
            selection: None,
            signature: None,
            draft: None,
            galaxy_selection: None,
            mode: Mode::default(),
            viewport: Viewport::new(size, config.viewport.clone()),
            territories: Tessellation::default(),
            tracker: SyncTracker::new(&config.sync),
            feedback: Feedback::default(),
            rng: StdRng::from_os_rng(),
            config,
        }
    }

    /// Fetch the galaxy and open a session on it.
    pub async fn load<S: GalaxyStore>(
        store: &S,
        config: EditorConfig,
        size: ScreenSize,
    ) -> Result<Self, StoreError> {
        let mut session = Self::new(config, size);
        let snapshot = store.fetch().await?;
        session.apply_snapshot(snapshot, false);
        info!(
            session = %session.id,
            stars = session.galaxy.stars.len(),
            countries = session.registry.len(),
            "editing session opened"
        );
        Ok(session)
    }

    /// Fetch the galaxy and merge it. A silent refresh sets no status and
    /// does not count as loading.
    pub async fn refresh<S: GalaxyStore>(&mut self, store: &S, silent: bool) {
        if !silent {
            self.feedback.begin_loading();
        }
        let result = store.fetch().await;
        if !silent {
            self.feedback.end_loading();
        }
        match result {
            Ok(snapshot) => self.apply_snapshot(snapshot, silent),
            Err(e) => {
                warn!(error = %e, silent, "galaxy fetch failed");
                if !silent {
                    self.feedback.set_status(GALAXY_LOAD_FAILED);
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Session id, for logs.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The galaxy as currently shown.
    pub fn galaxy(&self) -> Arc<Galaxy> {
        Arc::clone(&self.galaxy)
    }

    /// Resource definitions from the last snapshot.
    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }

    /// The division registry.
    pub const fn registry(&self) -> &DivisionRegistry {
        &self.registry
    }

    /// The calendar bounding the year.
    pub const fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// The year everything resolves at.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The detail selection.
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Index of the selected star, including a star whose body is
    /// selected.
    pub fn selected_star(&self) -> Option<usize> {
        self.selection.and_then(Selection::star)
    }

    /// Position the selected star was last known at.
    pub const fn signature(&self) -> Option<PositionSignature> {
        self.signature
    }

    /// Editable copy of the open star.
    pub const fn draft(&self) -> Option<&Star> {
        self.draft.as_ref()
    }

    /// Galaxy-view selection, the target of the Delete key.
    pub const fn galaxy_selection(&self) -> Option<GalaxyTarget> {
        self.galaxy_selection
    }

    /// Active edit mode.
    pub fn edit_mode(&self) -> EditMode {
        self.mode.handler().edit_mode()
    }

    /// Active mode and its state.
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Pan and zoom.
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Territory cells of the current stars.
    pub const fn territories(&self) -> &Tessellation {
        &self.territories
    }

    /// Current status line.
    pub const fn status(&self) -> Option<&Status> {
        self.feedback.status()
    }

    /// Open modal.
    pub const fn modal(&self) -> Option<&Modal> {
        self.feedback.modal()
    }

    /// Close the open modal.
    pub const fn dismiss_modal(&mut self) -> Option<Modal> {
        self.feedback.dismiss()
    }

    /// Whether a foreground operation is running.
    pub const fn is_loading(&self) -> bool {
        self.feedback.is_loading()
    }

    /// Sync state of a star or the registry.
    pub fn sync_state(&self, key: EntityKey) -> SyncState {
        self.tracker.state(key)
    }

    /// When the next debounced persist becomes due.
    pub fn next_persist_at(&self) -> Option<Instant> {
        self.tracker.next_deadline()
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Select star `index`, open its system view and start editing it.
    pub fn open_star(&mut self, index: usize) -> Result<(), EditorError> {
        let star = self
            .galaxy
            .stars
            .get(index)
            .ok_or(CoreError::StarNotFound { index })?;
        self.selection = Some(Selection::Star { id: index });
        self.signature = Some(star.signature());
        self.galaxy_selection = Some(GalaxyTarget::Star(index));
        self.draft = Some(editable(star, self.year));
        self.viewport.enter_system(star);
        debug!(star = index, "star opened");
        Ok(())
    }

    /// Select what `pick` hit without opening it. `Pick::Empty` clears both
    /// selections.
    pub fn select(&mut self, pick: Pick) -> Result<(), EditorError> {
        match pick {
            Pick::Star(index) => {
                let star = self
                    .galaxy
                    .stars
                    .get(index)
                    .ok_or(CoreError::StarNotFound { index })?;
                self.signature = Some(star.signature());
                self.selection = Some(Selection::Star { id: index });
                self.galaxy_selection = Some(GalaxyTarget::Star(index));
                self.draft = None;
            }
            Pick::Lane(index) => {
                if index >= self.galaxy.hyperlanes.len() {
                    return Err(CoreError::LaneNotFound { index }.into());
                }
                self.selection = Some(Selection::Lane { id: index });
                self.galaxy_selection = Some(GalaxyTarget::Lane(index));
                self.signature = None;
                self.draft = None;
            }
            Pick::Empty => {
                self.deselect();
                self.galaxy_selection = None;
            }
        }
        Ok(())
    }

    /// Drop the detail selection and return to the galaxy view. The galaxy
    /// selection is kept.
    pub fn deselect(&mut self) {
        self.selection = None;
        self.signature = None;
        self.draft = None;
        self.viewport.exit_system();
    }

    /// Select body `body` of the selected star.
    pub fn select_body(&mut self, body: usize) -> Result<(), EditorError> {
        let star_id = self.check_body(body)?;
        self.selection = Some(Selection::Body {
            star_id,
            body_idx: body,
        });
        Ok(())
    }

    fn check_body(&self, body: usize) -> Result<usize, EditorError> {
        let star = self.selected_star().ok_or(EditorError::NoStarSelected)?;
        let draft = self.draft.as_ref().ok_or(EditorError::NoStarSelected)?;
        if body >= draft.bodies.len() {
            return Err(EditorError::BodyNotFound { index: body });
        }
        Ok(star)
    }

    // ---------------------------------------------------------------------
    // Year and mode
    // ---------------------------------------------------------------------

    /// Move the query year, clamped to the calendar.
    pub fn set_year(&mut self, year: i32) {
        self.year = self.calendar.clamp(year);
        if self.draft.is_some() {
            self.draft = self
                .selected_star()
                .and_then(|i| self.galaxy.stars.get(i))
                .map(|s| editable(s, self.year));
        }
        debug!(year = self.year, "year changed");
    }

    /// Move the query year from free-text input. Unparseable input keeps
    /// the current year.
    pub fn set_year_input(&mut self, input: &str) {
        self.set_year(self.calendar.parse_input(input, self.year));
    }

    /// Switch edit mode. Mode state (lane start, focus, paint target) is
    /// reset.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        if self.edit_mode() == mode {
            return;
        }
        self.mode = Mode::new(mode);
        info!(?mode, "edit mode changed");
    }

    /// Abandon any half-finished gesture, such as a lane being drawn.
    pub fn cancel(&mut self) {
        self.mode.handler_mut().cancel();
    }

    fn political_mut(&mut self) -> Result<&mut PoliticalHandler, EditorError> {
        self.mode.political_mut().ok_or(EditorError::WrongMode {
            required: EditMode::Political,
        })
    }

    /// Drill into child `index` of the focused division. Returns `false` at
    /// the deepest level.
    pub fn push_focus(&mut self, index: usize) -> Result<bool, EditorError> {
        let focus = self.political_mut()?.focus().to_vec();
        self.check_child(&focus, index)?;
        Ok(self.political_mut()?.push_focus(index))
    }

    /// Step out of the focused division.
    pub fn pop_focus(&mut self) -> Result<Option<usize>, EditorError> {
        Ok(self.political_mut()?.pop_focus())
    }

    /// Choose which child of the focused division clicks paint into.
    pub fn set_paint_target(&mut self, target: Option<usize>) -> Result<(), EditorError> {
        let focus = self.political_mut()?.focus().to_vec();
        if let Some(target) = target {
            self.check_child(&focus, target)?;
        }
        self.political_mut()?.set_paint_target(target);
        Ok(())
    }

    fn check_child(&self, parent: &[usize], index: usize) -> Result<(), EditorError> {
        let mut path = parent.to_vec();
        path.push(index);
        if self.registry.contains(&path) {
            Ok(())
        } else {
            Err(CoreError::DivisionNotFound { path }.into())
        }
    }

    // ---------------------------------------------------------------------
    // Star edits
    // ---------------------------------------------------------------------

    /// Put `star` at `index`. User edits are recorded for persisting.
    pub(crate) fn apply_star(&mut self, index: usize, star: Star, origin: Origin) {
        let galaxy = Arc::make_mut(&mut self.galaxy);
        let Some(slot) = galaxy.stars.get_mut(index) else {
            warn!(star = index, "edit for a star that no longer exists");
            return;
        };
        let before = std::mem::replace(slot, star);
        let moved = before.signature() != slot.signature();
        if origin == Origin::User {
            self.tracker.touch_star(index, &before, Instant::now());
        }
        if moved {
            self.refresh_layout();
        }
    }

    /// A user edit of a star made outside the detail panel. The open draft
    /// follows it.
    fn put_star(&mut self, index: usize, star: Star) {
        if self.selected_star() == Some(index) && self.draft.is_some() {
            self.draft = Some(editable(&star, self.year));
        }
        self.apply_star(index, star, Origin::User);
    }

    /// Edit the open star through its draft. The result is applied to the
    /// galaxy at once and persisted after the debounce. An admin-levels
    /// change is recorded as an event at the current year.
    pub fn edit_draft(&mut self, f: impl FnOnce(&mut Star)) -> Result<(), EditorError> {
        let index = self.selected_star().ok_or(EditorError::NoStarSelected)?;
        let draft = self.draft.as_ref().ok_or(EditorError::NoStarSelected)?;
        let current = self
            .galaxy
            .stars
            .get(index)
            .ok_or(CoreError::StarNotFound { index })?;
        let mut edited = draft.clone();
        f(&mut edited);
        let next = admin::commit_draft(current, &edited, self.year);
        let changed = next != *current;
        if next.signature() != current.signature() {
            self.signature = Some(next.signature());
        }
        self.draft = Some(editable(&next, self.year));
        if changed {
            self.apply_star(index, next, Origin::User);
        }
        Ok(())
    }

    /// Set one division level of the open star. Deeper levels are cleared.
    pub fn set_star_level(
        &mut self,
        level: DivisionLevel,
        value: Option<usize>,
    ) -> Result<(), EditorError> {
        let draft = self.draft.as_ref().ok_or(EditorError::NoStarSelected)?;
        let next = draft
            .admin_levels
            .with_slot(level.slot(), value)
            .map_err(CoreError::from)?;
        self.edit_draft(|d| d.admin_levels = next)
    }

    /// Names selectable at `level` for the open star.
    pub fn division_options(&self, level: DivisionLevel) -> Vec<String> {
        self.draft
            .as_ref()
            .map(|d| {
                self.registry
                    .division_options(&d.admin_levels, level, self.year)
            })
            .unwrap_or_default()
    }

    /// Name of the open star's division at `level`.
    pub fn division_name(&self, level: DivisionLevel) -> Option<String> {
        let path = self.draft.as_ref()?.admin_levels.path();
        self.registry
            .division_name(path.get(..=level.slot())?, self.year)
    }

    /// Move the open star to `country`. When it has a sector the operator
    /// decides whether the sector is cleared or carried over by name.
    pub fn change_star_country(
        &mut self,
        country: usize,
        choice: Option<CountryChange>,
    ) -> Result<CountryChangeOutcome, EditorError> {
        self.check_child(&[], country)?;
        let draft = self.draft.as_ref().ok_or(EditorError::NoStarSelected)?;
        if draft.admin_levels.get(DivisionLevel::Country.slot()) == Some(country) {
            return Ok(CountryChangeOutcome::Unchanged);
        }
        match (self.division_name(DivisionLevel::Sector), choice) {
            (Some(_), None) => Ok(CountryChangeOutcome::NeedsDecision),
            (Some(name), Some(CountryChange::CarryIntoNewParent)) => {
                let sector = match self.registry.find_sibling(&[country], &name, self.year) {
                    Some(existing) => existing,
                    None => self.create_division(&[country], &name)?,
                };
                let next = AdminLevels::from_path(&[country, sector]);
                self.edit_draft(|d| d.admin_levels = next)?;
                info!(country, sector, name = %name, "sector carried into new country");
                Ok(CountryChangeOutcome::Changed {
                    sector: Some(sector),
                })
            }
            (None, _) | (Some(_), Some(CountryChange::ClearLower)) => {
                self.set_star_level(DivisionLevel::Country, Some(country))?;
                Ok(CountryChangeOutcome::Changed { sector: None })
            }
        }
    }

    /// Paint star `index` into division `target` at the political focus
    /// depth. Returns `false` when the star already belonged there.
    pub fn paint_star(&mut self, index: usize, target: usize) -> Result<bool, EditorError> {
        let focus = self.mode.handler().focus().to_vec();
        self.check_child(&focus, target)?;
        let star = self
            .galaxy
            .stars
            .get(index)
            .ok_or(CoreError::StarNotFound { index })?;
        let Some(next) = admin::paint(star, self.year, &focus, target)? else {
            return Ok(false);
        };
        debug!(star = index, target, ?focus, "star painted");
        self.put_star(index, next);
        Ok(true)
    }

    /// Clear every division of star `index` as of the current year.
    pub fn unassign_star(&mut self, index: usize) -> Result<bool, EditorError> {
        let star = self
            .galaxy
            .stars
            .get(index)
            .ok_or(CoreError::StarNotFound { index })?;
        let Some(next) = admin::unassign(star, self.year) else {
            return Ok(false);
        };
        self.put_star(index, next);
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Bodies
    // ---------------------------------------------------------------------

    /// Add a body to the open star, outside every existing orbit. Returns
    /// its index.
    pub fn add_body(&mut self, name: &str, kind: &str) -> Result<usize, EditorError> {
        let mut added = 0;
        self.edit_draft(|d| {
            let body = new_body(&d.bodies, name, kind);
            d.bodies.push(body);
            added = d.bodies.len().saturating_sub(1);
        })?;
        Ok(added)
    }

    /// Edit body `body` of the open star.
    pub fn edit_body(
        &mut self,
        body: usize,
        f: impl FnOnce(&mut CelestialBody),
    ) -> Result<(), EditorError> {
        self.check_body(body)?;
        self.edit_draft(|d| {
            if let Some(b) = d.bodies.get_mut(body) {
                f(b);
            }
        })
    }

    /// Remove body `body` of the open star. A selection of a later body
    /// follows the renumbering.
    pub fn remove_body(&mut self, body: usize) -> Result<(), EditorError> {
        self.check_body(body)?;
        self.edit_draft(|d| {
            if body < d.bodies.len() {
                d.bodies.remove(body);
            }
        })?;
        if let Some(Selection::Body { star_id, body_idx }) = self.selection {
            self.selection = IndexRemap::new(body).apply(body_idx).map_or(
                Some(Selection::Star { id: star_id }),
                |body_idx| Some(Selection::Body { star_id, body_idx }),
            );
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Run a registry change, recording it for persisting if anything
    /// changed.
    fn edit_registry<T>(
        &mut self,
        f: impl FnOnce(&mut DivisionRegistry) -> Result<T, CoreError>,
    ) -> Result<T, EditorError> {
        let before = self.registry.countries().to_vec();
        let out = f(&mut self.registry)?;
        if self.registry.countries() != before.as_slice() {
            self.tracker.touch_registry(&before, Instant::now());
        }
        Ok(out)
    }

    /// Forget references to divisions the registry no longer has: the
    /// political focus and paint target, and star assignments. Repaired
    /// stars are persisted like any other edit.
    pub(crate) fn drop_missing_divisions(&mut self) {
        if let Some(political) = self.mode.political_mut()
            && political.retain_existing(&self.registry)
        {
            debug!(focus = ?political.focus(), "political focus cut back");
        }
        for index in 0..self.galaxy.stars.len() {
            let Some(star) = self
                .galaxy
                .stars
                .get(index)
                .and_then(|s| admin::prune_missing(s, &self.registry))
            else {
                continue;
            };
            warn!(star = index, "assignment to a removed division cut back");
            self.put_star(index, star);
        }
    }

    fn create_division(&mut self, parent: &[usize], name: &str) -> Result<usize, EditorError> {
        let color = random_color(&mut self.rng);
        let year = self.year;
        let index = self.edit_registry(|r| r.add_division(parent, name, color, year))?;
        info!(?parent, name, index, "division created");
        Ok(index)
    }

    fn find_or_create(
        &mut self,
        parent: &[usize],
        name: &str,
        reuse_existing: bool,
    ) -> Result<DivisionOutcome, EditorError> {
        match self.registry.find_sibling(parent, name, self.year) {
            Some(existing) if !reuse_existing => Ok(DivisionOutcome::NeedsDecision { existing }),
            Some(index) => Ok(DivisionOutcome::Reused { index }),
            None => Ok(DivisionOutcome::Created {
                index: self.create_division(parent, name)?,
            }),
        }
    }

    /// Create (or reuse) a division named `name` at `level` under the open
    /// star's ancestors, and assign the star to it.
    pub fn create_division_for_star(
        &mut self,
        level: DivisionLevel,
        name: &str,
        reuse_existing: bool,
    ) -> Result<DivisionOutcome, EditorError> {
        let draft = self.draft.as_ref().ok_or(EditorError::NoStarSelected)?;
        let levels = draft.admin_levels;
        levels
            .with_slot(level.slot(), Some(0))
            .map_err(CoreError::from)?;
        let parent = levels
            .path()
            .get(..level.slot())
            .map(<[usize]>::to_vec)
            .unwrap_or_default();
        let outcome = self.find_or_create(&parent, name, reuse_existing)?;
        if let Some(index) = outcome.index() {
            self.set_star_level(level, Some(index))?;
        }
        Ok(outcome)
    }

    /// Create (or reuse) a child of the focused division and make it the
    /// paint target.
    pub fn create_division_in_focus(
        &mut self,
        name: &str,
        reuse_existing: bool,
    ) -> Result<DivisionOutcome, EditorError> {
        let focus = self.political_mut()?.focus().to_vec();
        let outcome = self.find_or_create(&focus, name, reuse_existing)?;
        if let Some(index) = outcome.index() {
            self.political_mut()?.set_paint_target(Some(index));
        }
        Ok(outcome)
    }

    /// Country `country`'s profile at the current year.
    pub fn country_profile(&self, country: usize) -> Option<CountryProfile> {
        self.registry.country_profile(country, self.year)
    }

    /// Rename and/or recolour a country from the current year on.
    pub fn set_country_profile(
        &mut self,
        country: usize,
        update: &ProfileUpdate,
    ) -> Result<(), EditorError> {
        let year = self.year;
        self.edit_registry(|r| r.set_country_profile_at(country, year, update))
    }

    /// Change a country's base name and colour, shown before any profile
    /// event.
    pub fn set_country_base(
        &mut self,
        country: usize,
        update: ProfileUpdate,
    ) -> Result<(), EditorError> {
        self.edit_registry(|r| r.set_country_base(country, update))
    }

    /// Edit one of a country's profile events, optionally moving it to
    /// `new_year`.
    pub fn edit_profile_event(
        &mut self,
        country: usize,
        event: usize,
        update: &ProfileUpdate,
        new_year: Option<i32>,
    ) -> Result<(), EditorError> {
        let calendar = self.calendar;
        self.edit_registry(|r| r.edit_profile_event(country, event, update, new_year, calendar))
    }

    /// Add a profile event at the current year carrying the profile in
    /// effect.
    pub fn insert_profile_event(&mut self, country: usize) -> Result<(), EditorError> {
        let (year, calendar) = (self.year, self.calendar);
        self.edit_registry(|r| r.insert_profile_event(country, year, calendar))
    }

    /// A country's profile events with their stored indices, by year.
    pub fn profile_events(&self, country: usize) -> Vec<(usize, &TimelineEvent)> {
        self.registry.profile_events(country)
    }

    /// Country indices, most recent border change first.
    pub fn ranked_countries(&self) -> Vec<usize> {
        let recency = border_recency(&self.galaxy.stars, self.year, self.calendar.min_year());
        rank_by_recency(self.registry.len(), &recency)
    }

    // ---------------------------------------------------------------------
    // Structural edits
    // ---------------------------------------------------------------------

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            galaxy: Arc::clone(&self.galaxy),
            tracker: self.tracker.clone(),
            selection: self.selection,
            signature: self.signature,
            draft: self.draft.clone(),
            galaxy_selection: self.galaxy_selection,
            mode: self.mode.clone(),
            viewport: self.viewport.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.galaxy = checkpoint.galaxy;
        self.tracker = checkpoint.tracker;
        self.selection = checkpoint.selection;
        self.signature = checkpoint.signature;
        self.draft = checkpoint.draft;
        self.galaxy_selection = checkpoint.galaxy_selection;
        self.mode = checkpoint.mode;
        self.viewport = checkpoint.viewport;
        self.refresh_layout();
    }

    /// Refit the view and rebuild territories after positions changed.
    pub(crate) fn refresh_layout(&mut self) {
        self.viewport.fit_galaxy(&self.galaxy.stars);
        self.territories =
            Tessellation::from_stars(&self.galaxy.stars, self.config.viewport.voronoi_buffer);
    }

    /// Renumber everything that refers to stars by index after star
    /// `remap.removed()` was deleted. Lane indices shift too, so lane
    /// selections are dropped.
    fn apply_remap(&mut self, remap: IndexRemap) {
        self.tracker.remap(remap);
        if let Some(geography) = self.mode.geography_mut() {
            geography.remap_lane_from(|i| remap.apply(i));
        }
        self.galaxy_selection = match self.galaxy_selection {
            Some(GalaxyTarget::Star(i)) => remap.apply(i).map(GalaxyTarget::Star),
            Some(GalaxyTarget::Lane(_)) | None => None,
        };
        match self.selection {
            Some(Selection::Lane { .. }) => self.selection = None,
            Some(selection) => match selection.star().and_then(|i| remap.apply(i)) {
                Some(to) => self.selection = Some(selection.with_star(to)),
                None => self.deselect(),
            },
            None => {}
        }
    }

    /// Delete star `index` and the lanes touching it. Returns whether the
    /// store accepted it; on refusal the deletion is undone.
    pub async fn delete_star<S: GalaxyStore>(
        &mut self,
        store: &S,
        index: usize,
    ) -> Result<bool, EditorError> {
        let checkpoint = self.checkpoint();
        let (_, remap) = structure::remove_star(Arc::make_mut(&mut self.galaxy), index)?;
        self.apply_remap(remap);
        self.refresh_layout();

        self.feedback.begin_loading();
        let result = store.delete_star(index).await;
        self.feedback.end_loading();
        match result {
            Ok(()) => {
                info!(star = index, "star removed");
                self.feedback.set_status(STAR_REMOVED);
                Ok(true)
            }
            Err(e) => {
                warn!(star = index, error = %e, "star removal failed, restored");
                self.restore(checkpoint);
                self.feedback.set_status(STAR_REMOVE_FAILED);
                Ok(false)
            }
        }
    }

    /// Join stars `a` and `b`. Self-links and duplicates are refused before
    /// anything is sent.
    pub async fn add_hyperlane<S: GalaxyStore>(
        &mut self,
        store: &S,
        a: usize,
        b: usize,
    ) -> Result<bool, EditorError> {
        structure::validate_lane(&self.galaxy, a, b)?;
        let checkpoint = self.checkpoint();
        let lane = structure::add_hyperlane(Arc::make_mut(&mut self.galaxy), a, b)?;

        self.feedback.begin_loading();
        let result = store.add_hyperlane(a, b).await;
        self.feedback.end_loading();
        match result {
            Ok(stored) => {
                if stored != lane {
                    warn!(local = lane, stored, "store indexed the new lane differently");
                }
                info!(a, b, lane, "hyperlane added");
                self.feedback.set_status(LANE_ADDED);
                Ok(true)
            }
            Err(e) => {
                warn!(a, b, error = %e, "hyperlane creation failed, restored");
                self.restore(checkpoint);
                self.feedback.set_status(LANE_ADD_FAILED);
                Ok(false)
            }
        }
    }

    /// Delete lane `index`.
    pub async fn delete_hyperlane<S: GalaxyStore>(
        &mut self,
        store: &S,
        index: usize,
    ) -> Result<bool, EditorError> {
        let checkpoint = self.checkpoint();
        structure::remove_hyperlane(Arc::make_mut(&mut self.galaxy), index)?;
        let remap = IndexRemap::new(index);
        self.galaxy_selection = match self.galaxy_selection {
            Some(GalaxyTarget::Lane(i)) => remap.apply(i).map(GalaxyTarget::Lane),
            other => other,
        };
        if let Some(Selection::Lane { id }) = self.selection {
            self.selection = remap.apply(id).map(|id| Selection::Lane { id });
        }

        self.feedback.begin_loading();
        let result = store.delete_hyperlane(index).await;
        self.feedback.end_loading();
        match result {
            Ok(()) => {
                info!(lane = index, "hyperlane removed");
                self.feedback.set_status(LANE_REMOVED);
                Ok(true)
            }
            Err(e) => {
                warn!(lane = index, error = %e, "hyperlane removal failed, restored");
                self.restore(checkpoint);
                self.feedback.set_status(LANE_REMOVE_FAILED);
                Ok(false)
            }
        }
    }

    /// Create a star at `world`, rounded to whole coordinates, growing the
    /// galaxy bounds to fit. The generator names and populates it; if it
    /// fails a basic star is created instead. Returns the new index, or
    /// `None` when the store refused the star.
    pub async fn create_star_at<S: GalaxyStore>(
        &mut self,
        store: &S,
        world: Point,
    ) -> Option<usize> {
        let (x, y) = world.rounded();
        let mut next = (*self.galaxy).clone();
        let index = structure::add_star(
            &mut next,
            Star::at(x, y),
            self.config.viewport.bounds_growth_buffer,
        );

        self.feedback.begin_loading();
        let star = match store.generate_system(&next, index).await {
            Ok(profile) => star_from_profile(&profile, x, y, index),
            Err(e) => {
                warn!(x, y, error = %e, "system generation failed, using a basic star");
                fallback_star(x, y, index)
            }
        };
        if let Some(slot) = next.stars.get_mut(index) {
            *slot = star.clone();
        }
        let (width, height) = (next.width, next.height);
        let checkpoint = self.checkpoint();
        self.galaxy = Arc::new(next);
        self.refresh_layout();

        let result = store.add_star(&star, width, height).await;
        self.feedback.end_loading();
        match result {
            Ok(stored) => {
                if stored != index {
                    warn!(local = index, stored, "store indexed the new star differently");
                }
                info!(star = index, x, y, name = %star.name, "star added");
                self.feedback.set_status(STAR_ADDED);
                Some(index)
            }
            Err(e) => {
                warn!(x, y, error = %e, "star creation failed, restored");
                self.restore(checkpoint);
                self.feedback.set_status(STAR_ADD_FAILED);
                None
            }
        }
    }

    /// The Delete key: remove the galaxy selection.
    pub async fn press_delete<S: GalaxyStore>(&mut self, store: &S) -> Result<bool, EditorError> {
        if self.viewport.mode() != ViewMode::Galaxy {
            return Ok(false);
        }
        match self.galaxy_selection.take() {
            Some(GalaxyTarget::Star(index)) => self.delete_star(store, index).await,
            Some(GalaxyTarget::Lane(index)) => self.delete_hyperlane(store, index).await,
            None => Ok(false),
        }
    }

    // ---------------------------------------------------------------------
    // Pointer input
    // ---------------------------------------------------------------------

    /// Handle a click at `screen`. The host skips clicks that ended a drag
    /// (see [`Drag::moved`]).
    pub async fn click<S: GalaxyStore>(
        &mut self,
        store: &S,
        screen: Point,
        shift: bool,
    ) -> Result<(), EditorError> {
        if self.viewport.mode() == ViewMode::System {
            self.click_system(screen);
            return Ok(());
        }
        let pick = Picker::new(&self.galaxy).pick_screen(&self.viewport, screen);
        let click = Click {
            pick,
            world: self.viewport.to_world(screen),
            shift,
        };
        let intent = self.mode.handler_mut().on_click(&click);
        debug!(?intent, "galaxy click");
        match intent {
            Intent::Open(index) => self.open_star(index),
            Intent::Select(pick) => self.select(pick),
            Intent::Connect { from, to } => self.add_hyperlane(store, from, to).await.map(drop),
            Intent::Paint { star, target } => self.paint_star(star, target).map(drop),
            Intent::CreateStar(at) => {
                self.create_star_at(store, at).await;
                Ok(())
            }
        }
    }

    fn click_system(&mut self, screen: Point) {
        let world = self.viewport.to_world(screen);
        let tolerance = self.viewport.body_tolerance();
        let star_id = self.selected_star();
        let hit = star_id
            .and_then(|i| self.galaxy.stars.get(i))
            .and_then(|star| pick_body(star, world, tolerance));
        match (star_id, hit) {
            (Some(star_id), Some(body_idx)) => {
                self.selection = Some(Selection::Body { star_id, body_idx });
            }
            _ => self.deselect(),
        }
    }

    /// Context-menu entries for what lies under `screen`.
    pub fn context_menu(&self, screen: Point) -> Vec<ContextAction> {
        if self.viewport.mode() != ViewMode::Galaxy {
            return Vec::new();
        }
        let pick = Picker::new(&self.galaxy).pick_screen(&self.viewport, screen);
        self.mode.handler().context_actions(pick)
    }

    /// Carry out a context-menu entry.
    pub async fn run_context_action<S: GalaxyStore>(
        &mut self,
        store: &S,
        action: ContextAction,
    ) -> Result<(), EditorError> {
        match action {
            ContextAction::RemoveStar(index) => self.delete_star(store, index).await.map(drop),
            ContextAction::RemoveHyperlane(index) => {
                self.delete_hyperlane(store, index).await.map(drop)
            }
            ContextAction::Unassign(index) => self.unassign_star(index).map(drop),
            ContextAction::StartHyperlane(index) => {
                if index >= self.galaxy.stars.len() {
                    return Err(CoreError::StarNotFound { index }.into());
                }
                self.mode
                    .geography_mut()
                    .ok_or(EditorError::WrongMode {
                        required: EditMode::Geography,
                    })?
                    .start_lane(index);
                Ok(())
            }
        }
    }

    /// Territory under `screen`, by star index.
    pub fn territory_at(&self, screen: Point) -> Option<usize> {
        pick_region(&self.territories, self.viewport.to_world(screen))
    }

    /// Zoom by a wheel step at `screen`.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        self.viewport.zoom_at(screen, delta_y)
    }

    /// Start panning at `screen`.
    pub const fn begin_drag(&self, screen: Point) -> Drag {
        self.viewport.begin_drag(screen)
    }

    /// Pan to `screen`.
    pub fn drag_to(&mut self, drag: &mut Drag, screen: Point) {
        self.viewport.drag_to(drag, screen);
    }

    /// The screen changed size.
    pub fn resize(&mut self, size: ScreenSize) {
        self.viewport.resize(size);
    }

    /// What to draw now.
    pub fn scene(&self) -> Scene {
        if self.viewport.mode() == ViewMode::System {
            return self
                .selected_star()
                .and_then(|i| self.galaxy.stars.get(i).map(|s| system_scene(s, i)))
                .unwrap_or_default();
        }
        let levels = resolve_all_admin(&self.galaxy.stars, self.year);
        galaxy_scene(&GalaxyView {
            galaxy: &self.galaxy,
            levels: &levels,
            registry: &self.registry,
            year: self.year,
            mode: self.mode.handler(),
            selection: self.galaxy_selection,
            territories: &self.territories,
            zoom: self.viewport.zoom(),
        })
    }
}
