//! The division registry: countries, their sectors, provinces and clusters,
//! and each country's dated profile overrides.
//!
//! Divisions are addressed by path, i.e. the index of the country, then of
//! the sector inside it, and so on. A star's admin levels are such a path.
//! Paths are positional: inserting appends, and nothing here reorders or
//! deletes, so paths handed out stay valid for the registry's lifetime.

use rand::Rng;
use serde_json::{Map, Value};
use starmap_types::{
    AdminLevels, ClusterDefinition, CountryDefinition, CountryProfile, DivisionLevel,
    ProvinceDefinition, Rgb, SectorDefinition, Timeline, TimelineEvent, TimelineEventType,
};
use tracing::debug;

use crate::calendar::Calendar;
use crate::error::CoreError;
use crate::resolve::resolve_country_profile;
use crate::timeline::{self, COLOR_KEY, NAME_KEY};

/// A partial change to a country's name and/or colour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New name, if changing.
    pub name: Option<String>,
    /// New colour, if changing.
    pub color: Option<Rgb>,
}

impl ProfileUpdate {
    /// Event payload carrying only the fields being changed.
    pub fn payload(&self) -> Map<String, Value> {
        let mut data = Map::new();
        if let Some(name) = &self.name {
            data.insert(NAME_KEY.to_owned(), Value::from(name.as_str()));
        }
        if let Some(color) = self.color {
            data.insert(COLOR_KEY.to_owned(), rgb_value(color));
        }
        data
    }

    /// True when nothing would change.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

impl From<CountryProfile> for ProfileUpdate {
    fn from(profile: CountryProfile) -> Self {
        Self {
            name: Some(profile.name),
            color: profile.color,
        }
    }
}

fn rgb_value(color: Rgb) -> Value {
    Value::Array(color.iter().map(|c| Value::from(*c)).collect())
}

/// A random division colour.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    [rng.random(), rng.random(), rng.random()]
}

/// Record a profile change for `country` at `year`.
///
/// An existing profile event at that year is shallow-merged with the
/// update. Otherwise the appended event carries the profile resolved at
/// `year` overlaid with the update, so it stands on its own.
pub fn profile_upsert(country: &CountryDefinition, year: i32, update: &ProfileUpdate) -> Timeline {
    let kind = TimelineEventType::CountryProfile;
    if timeline::find_event(&country.timeline, year, kind).is_some() {
        return timeline::upsert(&country.timeline, year, kind, &update.payload());
    }
    let mut data = ProfileUpdate::from(resolve_country_profile(country, year)).payload();
    data.extend(update.payload());
    timeline::upsert(&country.timeline, year, kind, &data)
}

/// A read-only view of one division at any level.
#[derive(Debug, Clone, Copy)]
enum Node<'a> {
    Country(&'a CountryDefinition),
    Sector(&'a SectorDefinition),
    Province(&'a ProvinceDefinition),
    Cluster(&'a ClusterDefinition),
}

impl<'a> Node<'a> {
    const fn base_name(self) -> &'a str {
        match self {
            Self::Country(c) => c.name.as_str(),
            Self::Sector(s) => s.name.as_str(),
            Self::Province(p) => p.name.as_str(),
            Self::Cluster(c) => c.name.as_str(),
        }
    }

    const fn base_color(self) -> Option<Rgb> {
        match self {
            Self::Country(c) => c.color,
            Self::Sector(s) => s.color,
            Self::Province(p) => p.color,
            Self::Cluster(c) => c.color,
        }
    }

    fn child(self, idx: usize) -> Option<Self> {
        match self {
            Self::Country(c) => c.sectors.get(idx).map(Self::Sector),
            Self::Sector(s) => s.provinces.get(idx).map(Self::Province),
            Self::Province(p) => p.clusters.get(idx).map(Self::Cluster),
            Self::Cluster(_) => None,
        }
    }

    fn child_names(self) -> Vec<String> {
        match self {
            Self::Country(c) => c.sectors.iter().map(|s| s.name.clone()).collect(),
            Self::Sector(s) => s.provinces.iter().map(|p| p.name.clone()).collect(),
            Self::Province(p) => p.clusters.iter().map(|c| c.name.clone()).collect(),
            Self::Cluster(_) => Vec::new(),
        }
    }
}

/// The tree of named political divisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivisionRegistry {
    countries: Vec<CountryDefinition>,
}

impl DivisionRegistry {
    /// Wrap the countries as stored.
    pub const fn new(countries: Vec<CountryDefinition>) -> Self {
        Self { countries }
    }

    /// Wrap the countries after filling gaps left by older data: missing
    /// colours get random ones, and a country without any profile event
    /// gets one at the calendar's first year carrying its base profile.
    pub fn repaired<R: Rng + ?Sized>(
        mut countries: Vec<CountryDefinition>,
        calendar: Calendar,
        rng: &mut R,
    ) -> Self {
        let mut repaired_profiles = 0_usize;
        for country in &mut countries {
            let color = *country.color.get_or_insert_with(|| random_color(rng));
            let has_profile = country
                .timeline
                .events
                .iter()
                .any(|e| e.kind == TimelineEventType::CountryProfile);
            if !has_profile {
                let update = ProfileUpdate {
                    name: Some(country.name.clone()),
                    color: Some(color),
                };
                country.timeline.events.push(TimelineEvent::new(
                    calendar.min_year(),
                    TimelineEventType::CountryProfile,
                    update.payload(),
                ));
                repaired_profiles = repaired_profiles.saturating_add(1);
            }
            for sector in &mut country.sectors {
                sector.color.get_or_insert_with(|| random_color(rng));
                for province in &mut sector.provinces {
                    province.color.get_or_insert_with(|| random_color(rng));
                    for cluster in &mut province.clusters {
                        cluster.color.get_or_insert_with(|| random_color(rng));
                    }
                }
            }
        }
        if repaired_profiles > 0 {
            debug!(countries = repaired_profiles, "added missing country profile events");
        }
        Self { countries }
    }

    /// All countries.
    pub fn countries(&self) -> &[CountryDefinition] {
        &self.countries
    }

    /// Consume the registry, returning the countries for persisting.
    pub fn into_countries(self) -> Vec<CountryDefinition> {
        self.countries
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// True when there are no countries.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    fn node(&self, path: &[usize]) -> Option<Node<'_>> {
        let (first, rest) = path.split_first()?;
        let mut node = Node::Country(self.countries.get(*first)?);
        for idx in rest {
            node = node.child(*idx)?;
        }
        Some(node)
    }

    /// True when `path` leads to an existing division.
    pub fn contains(&self, path: &[usize]) -> bool {
        self.node(path).is_some()
    }

    /// How many leading entries of `path` lead to existing divisions.
    pub fn existing_depth(&self, path: &[usize]) -> usize {
        (1..=path.len())
            .take_while(|&n| path.get(..n).is_some_and(|p| self.contains(p)))
            .count()
    }

    /// Display names of the children of the division at `parent` (the
    /// countries for an empty path). Country names resolve at `year`.
    pub fn child_names(&self, parent: &[usize], year: i32) -> Option<Vec<String>> {
        if parent.is_empty() {
            return Some(
                self.countries
                    .iter()
                    .map(|c| resolve_country_profile(c, year).name)
                    .collect(),
            );
        }
        self.node(parent).map(Node::child_names)
    }

    /// Names selectable at `level` for a star assigned to `levels`: the
    /// children of its division one level up. Empty when that ancestor is
    /// unassigned.
    pub fn division_options(
        &self,
        levels: &AdminLevels,
        level: DivisionLevel,
        year: i32,
    ) -> Vec<String> {
        let path = levels.path();
        path.get(..level.slot())
            .and_then(|parent| self.child_names(parent, year))
            .unwrap_or_default()
    }

    /// Display name of the division at `path`. Countries resolve at `year`.
    pub fn division_name(&self, path: &[usize], year: i32) -> Option<String> {
        match self.node(path)? {
            Node::Country(c) => Some(resolve_country_profile(c, year).name),
            node => Some(node.base_name().to_owned()),
        }
    }

    /// Display colour of the division at `path`. Countries resolve at
    /// `year`.
    pub fn division_color(&self, path: &[usize], year: i32) -> Option<Rgb> {
        match self.node(path)? {
            Node::Country(c) => resolve_country_profile(c, year).color,
            node => node.base_color(),
        }
    }

    /// The country's profile at `year`.
    pub fn country_profile(&self, country: usize, year: i32) -> Option<CountryProfile> {
        self.countries
            .get(country)
            .map(|c| resolve_country_profile(c, year))
    }

    /// Index of a child of `parent` whose display name equals `name`,
    /// ignoring case and surrounding whitespace.
    pub fn find_sibling(&self, parent: &[usize], name: &str, year: i32) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.child_names(parent, year)?
            .iter()
            .position(|n| n.trim().to_lowercase() == wanted)
    }

    /// Append a new division named `name` under `parent` and return its
    /// index. A new country also gets a profile event at `year`.
    ///
    /// Name collisions are not checked here; see [`Self::find_sibling`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyName`] for a blank name,
    /// [`CoreError::DivisionNotFound`] if `parent` does not exist, or
    /// [`CoreError::TooDeep`] if `parent` is a cluster.
    pub fn add_division(
        &mut self,
        parent: &[usize],
        name: &str,
        color: Rgb,
        year: i32,
    ) -> Result<usize, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyName);
        }
        let not_found = || CoreError::DivisionNotFound {
            path: parent.to_vec(),
        };
        let index = match *parent {
            [] => {
                let profile = ProfileUpdate {
                    name: Some(name.to_owned()),
                    color: Some(color),
                };
                let country = CountryDefinition {
                    name: name.to_owned(),
                    color: Some(color),
                    sectors: Vec::new(),
                    timeline: Timeline {
                        events: vec![TimelineEvent::new(
                            year,
                            TimelineEventType::CountryProfile,
                            profile.payload(),
                        )],
                    },
                };
                push_index(&mut self.countries, country)
            }
            [c] => {
                let country = self.countries.get_mut(c).ok_or_else(not_found)?;
                push_index(
                    &mut country.sectors,
                    SectorDefinition {
                        name: name.to_owned(),
                        color: Some(color),
                        provinces: Vec::new(),
                    },
                )
            }
            [c, s] => {
                let sector = self
                    .countries
                    .get_mut(c)
                    .and_then(|country| country.sectors.get_mut(s))
                    .ok_or_else(not_found)?;
                push_index(
                    &mut sector.provinces,
                    ProvinceDefinition {
                        name: name.to_owned(),
                        color: Some(color),
                        clusters: Vec::new(),
                    },
                )
            }
            [c, s, p] => {
                let province = self
                    .countries
                    .get_mut(c)
                    .and_then(|country| country.sectors.get_mut(s))
                    .and_then(|sector| sector.provinces.get_mut(p))
                    .ok_or_else(not_found)?;
                push_index(
                    &mut province.clusters,
                    ClusterDefinition {
                        name: name.to_owned(),
                        color: Some(color),
                    },
                )
            }
            _ => {
                return Err(CoreError::TooDeep {
                    deepest: DivisionLevel::Cluster,
                });
            }
        };
        debug!(parent = ?parent, index, name, "division added");
        Ok(index)
    }

    fn country_mut(&mut self, country: usize) -> Result<&mut CountryDefinition, CoreError> {
        self.countries
            .get_mut(country)
            .ok_or_else(|| CoreError::DivisionNotFound {
                path: vec![country],
            })
    }

    /// Change the country's base name/colour, i.e. its profile before any
    /// event applies.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DivisionNotFound`] for an unknown country.
    pub fn set_country_base(
        &mut self,
        country: usize,
        update: ProfileUpdate,
    ) -> Result<(), CoreError> {
        let c = self.country_mut(country)?;
        if let Some(name) = update.name {
            c.name = name;
        }
        if let Some(color) = update.color {
            c.color = Some(color);
        }
        Ok(())
    }

    /// Rename and/or recolour a country as of `year`. See [`profile_upsert`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DivisionNotFound`] for an unknown country.
    pub fn set_country_profile_at(
        &mut self,
        country: usize,
        year: i32,
        update: &ProfileUpdate,
    ) -> Result<(), CoreError> {
        let c = self.country_mut(country)?;
        c.timeline = profile_upsert(c, year, update);
        Ok(())
    }

    /// Edit the profile event stored at `event` in the country's timeline:
    /// merge `update` into it and optionally move it to `new_year` (clamped
    /// to the calendar).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ProfileEventNotFound`] if `event` is not a
    /// profile event of the country, or [`CoreError::YearOccupied`] if the
    /// move would put two profile events in the same year.
    pub fn edit_profile_event(
        &mut self,
        country: usize,
        event: usize,
        update: &ProfileUpdate,
        new_year: Option<i32>,
        calendar: Calendar,
    ) -> Result<(), CoreError> {
        let missing = CoreError::ProfileEventNotFound { country, event };
        let c = self.countries.get_mut(country).ok_or_else(|| missing.clone())?;
        let current_year = c
            .timeline
            .events
            .get(event)
            .filter(|e| e.kind == TimelineEventType::CountryProfile)
            .map(|e| e.year)
            .ok_or(missing)?;

        let year = new_year.map_or(current_year, |y| calendar.clamp(y));
        if year != current_year {
            let occupied = c.timeline.events.iter().enumerate().any(|(i, e)| {
                i != event && e.kind == TimelineEventType::CountryProfile && e.year == year
            });
            if occupied {
                return Err(CoreError::YearOccupied { country, year });
            }
        }

        if let Some(target) = c.timeline.events.get_mut(event) {
            target.year = year;
            target.data.extend(update.payload());
        }
        Ok(())
    }

    /// Insert a profile event at `year` (clamped) carrying the profile the
    /// country resolves to there. A no-op if one already exists that year.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DivisionNotFound`] for an unknown country.
    pub fn insert_profile_event(
        &mut self,
        country: usize,
        year: i32,
        calendar: Calendar,
    ) -> Result<(), CoreError> {
        let year = calendar.clamp(year);
        let c = self.country_mut(country)?;
        if timeline::find_event(&c.timeline, year, TimelineEventType::CountryProfile).is_some() {
            return Ok(());
        }
        c.timeline = profile_upsert(c, year, &ProfileUpdate::default());
        Ok(())
    }

    /// The country's profile events in year order, each with its stored
    /// index (for [`Self::edit_profile_event`]).
    pub fn profile_events(&self, country: usize) -> Vec<(usize, &TimelineEvent)> {
        let Some(c) = self.countries.get(country) else {
            return Vec::new();
        };
        let mut events: Vec<(usize, &TimelineEvent)> = c
            .timeline
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == TimelineEventType::CountryProfile)
            .collect();
        events.sort_by_key(|(_, e)| e.year);
        events
    }
}

fn push_index<T>(list: &mut Vec<T>, item: T) -> usize {
    let index = list.len();
    list.push(item);
    index
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;

    use super::*;

    fn registry() -> DivisionRegistry {
        let mut reg = DivisionRegistry::default();
        let c = reg.add_division(&[], "Aurora", [200, 0, 0], 2000).unwrap();
        let s = reg.add_division(&[c], "Northern Reach", [0, 200, 0], 2000).unwrap();
        let p = reg.add_division(&[c, s], "Vale", [0, 0, 200], 2000).unwrap();
        reg.add_division(&[c, s, p], "Inner Ring", [9, 9, 9], 2000).unwrap();
        reg
    }

    #[test]
    fn add_division_returns_new_index() {
        let mut reg = registry();
        let idx = reg.add_division(&[0], "Southern Reach", [1, 1, 1], 2000).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(reg.child_names(&[0], 2000).unwrap(), vec!["Northern Reach", "Southern Reach"]);
    }

    #[test]
    fn add_division_rejects_bad_parents() {
        let mut reg = registry();
        assert_eq!(reg.add_division(&[0], "   ", [0; 3], 2000), Err(CoreError::EmptyName));
        assert!(matches!(
            reg.add_division(&[5], "X", [0; 3], 2000),
            Err(CoreError::DivisionNotFound { .. })
        ));
        assert!(matches!(
            reg.add_division(&[0, 0, 0, 0], "X", [0; 3], 2000),
            Err(CoreError::TooDeep { .. })
        ));
    }

    #[test]
    fn sibling_lookup_ignores_case_and_whitespace() {
        let reg = registry();
        assert_eq!(reg.find_sibling(&[0], "  northern REACH ", 2000), Some(0));
        assert_eq!(reg.find_sibling(&[0], "Southern Reach", 2000), None);
        assert_eq!(reg.find_sibling(&[], "aurora", 2000), Some(0));
    }

    #[test]
    fn new_country_carries_profile_event() {
        let reg = registry();
        let events = reg.profile_events(0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.year, 2000);
        assert_eq!(reg.country_profile(0, 2000).unwrap().color, Some([200, 0, 0]));
    }

    #[test]
    fn options_follow_star_path() {
        let reg = registry();
        let levels = AdminLevels([Some(0), Some(0), None, None]);
        assert_eq!(reg.division_options(&levels, DivisionLevel::Country, 2000), vec!["Aurora"]);
        assert_eq!(reg.division_options(&levels, DivisionLevel::Province, 2000), vec!["Vale"]);
        assert!(reg.division_options(&levels, DivisionLevel::Cluster, 2000).is_empty());
        assert_eq!(reg.division_name(&[0, 0, 0, 0], 2000).as_deref(), Some("Inner Ring"));
        assert_eq!(reg.division_color(&[0, 0], 2000), Some([0, 200, 0]));
    }

    #[test]
    fn rename_as_of_year_keeps_earlier_profile() {
        let mut reg = registry();
        reg.set_country_profile_at(0, 2200, &ProfileUpdate { name: Some("Aurora Union".into()), color: None })
            .unwrap();
        assert_eq!(reg.division_name(&[0], 2199).as_deref(), Some("Aurora"));
        assert_eq!(reg.division_name(&[0], 2200).as_deref(), Some("Aurora Union"));
        // the appended event is self-contained
        let (_, event) = reg.profile_events(0)[1];
        assert_eq!(event.data.get("color"), Some(&json!([200, 0, 0])));
    }

    #[test]
    fn profile_event_cannot_move_onto_occupied_year() {
        let mut reg = registry();
        let cal = Calendar::default();
        reg.insert_profile_event(0, 2100, cal).unwrap();
        let (stored, _) = reg.profile_events(0)[1];
        let err = reg
            .edit_profile_event(0, stored, &ProfileUpdate::default(), Some(2000), cal)
            .unwrap_err();
        assert_eq!(err, CoreError::YearOccupied { country: 0, year: 2000 });

        reg.edit_profile_event(0, stored, &ProfileUpdate { name: Some("Late".into()), color: None }, Some(2500), cal)
            .unwrap();
        assert_eq!(reg.profile_events(0)[1].1.year, 2399);
        assert_eq!(reg.division_name(&[0], 2399).as_deref(), Some("Late"));
    }

    #[test]
    fn repair_fills_colours_and_profiles() {
        let countries: Vec<CountryDefinition> = serde_json::from_value(json!([
            { "name": "Bare", "sectors": [ { "name": "S", "provinces": [ { "name": "P", "clusters": [ { "name": "C" } ] } ] } ] }
        ]))
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let reg = DivisionRegistry::repaired(countries, Calendar::default(), &mut rng);
        let c = &reg.countries()[0];
        assert!(c.color.is_some());
        assert!(c.sectors[0].provinces[0].clusters[0].color.is_some());
        let events = reg.profile_events(0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.year, 2000);
        assert_eq!(reg.country_profile(0, 2000).unwrap().color, c.color);
    }
}
