//! End-to-end editing sessions against the in-process store.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::time::Duration;

use starmap_core::config::EditorConfig;
use starmap_core::resolve_admin;
use starmap_editor::status::{
    COUNTRIES_SAVE_FAILED, GALAXY_LOADED, STAR_REMOVE_FAILED, STAR_SAVE_FAILED, STAR_SAVED,
    SYSTEM_DELETED_TITLE,
};
use starmap_editor::{
    ContextAction, CountryChange, CountryChangeOutcome, DivisionOutcome, EditorError,
    EditorSession, EntityKey, SyncState,
};
use starmap_spatial::{Point, ScreenSize};
use starmap_store::{InMemoryStore, StoreRequest};
use starmap_types::{
    AdminLevels, ClusterDefinition, CountryDefinition, DivisionLevel, EditMode, Galaxy,
    GalaxySnapshot, GalaxyTarget, Hyperlane, ProvinceDefinition, SectorDefinition, Selection,
    Star, ViewMode,
};

fn registry() -> Vec<CountryDefinition> {
    let cluster = ClusterDefinition {
        name: "Inner Ring".to_owned(),
        color: Some([10, 10, 10]),
    };
    let province = ProvinceDefinition {
        name: "Hollow".to_owned(),
        color: Some([20, 20, 20]),
        clusters: vec![cluster],
    };
    vec![CountryDefinition {
        name: "Aurora".to_owned(),
        color: Some([200, 0, 0]),
        sectors: vec![
            SectorDefinition {
                name: "Core".to_owned(),
                color: Some([30, 30, 30]),
                provinces: vec![province],
            },
            SectorDefinition {
                name: "Rim".to_owned(),
                color: Some([40, 40, 40]),
                provinces: Vec::new(),
            },
        ],
        ..CountryDefinition::default()
    }]
}

fn snapshot() -> GalaxySnapshot {
    GalaxySnapshot {
        galaxy: Galaxy {
            width: 400,
            height: 400,
            stars: vec![
                Star::at(0, 0),
                Star::at(100, 0),
                Star::at(50, 80),
                Star {
                    name: "Vega".to_owned(),
                    ..Star::at(120, 45)
                },
            ],
            hyperlanes: vec![Hyperlane { a: 0, b: 1 }, Hyperlane { a: 1, b: 3 }],
            resources: Vec::new(),
        },
        resources: Vec::new(),
        countries: registry(),
    }
}

async fn open(store: &InMemoryStore) -> EditorSession {
    let size = ScreenSize::new(800.0, 600.0).unwrap();
    let session = EditorSession::load(store, EditorConfig::default(), size)
        .await
        .unwrap();
    store.take_requests().await;
    session
}

fn screen_of(session: &EditorSession, index: usize) -> Point {
    let galaxy = session.galaxy();
    session
        .viewport()
        .to_screen(Point::of_star(&galaxy.stars[index]))
}

// ---------------------------------------------------------------------------
// Loading and reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_reports_and_starts_at_the_first_year() {
    let store = InMemoryStore::new(snapshot());
    let session = open(&store).await;
    assert_eq!(session.galaxy().stars.len(), 4);
    assert_eq!(session.year(), 2000);
    assert_eq!(session.status().unwrap().message, GALAXY_LOADED);
    assert_eq!(session.territories().cells().count(), 4);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn renumbered_selection_follows_its_position() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(3).unwrap();
    assert_eq!(session.viewport().mode(), ViewMode::System);

    // another editor adds four stars in front of it
    store
        .mutate(|s| {
            for i in 0..4 {
                s.galaxy.stars.insert(0, Star::at(300 + i, 300));
            }
        })
        .await;
    session.refresh(&store, true).await;

    assert_eq!(session.selected_star(), Some(7));
    assert_eq!(session.galaxy_selection(), Some(GalaxyTarget::Star(7)));
    assert_eq!(session.draft().unwrap().name, "Vega");
    assert!(session.modal().is_none());
    assert_eq!(session.viewport().mode(), ViewMode::System);
}

#[tokio::test]
async fn vanished_selection_raises_the_modal() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(3).unwrap();

    store.mutate(|s| s.galaxy.stars.remove(3)).await;
    session.refresh(&store, true).await;

    assert_eq!(session.modal().unwrap().title, SYSTEM_DELETED_TITLE);
    assert_eq!(session.selection(), None);
    assert!(session.draft().is_none());
    assert_eq!(session.galaxy_selection(), None);
    assert_eq!(session.viewport().mode(), ViewMode::Galaxy);

    session.dismiss_modal();
    assert!(session.modal().is_none());
}

#[tokio::test]
async fn vanished_selection_in_galaxy_view_deselects_quietly() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.set_edit_mode(EditMode::Geography);
    session
        .select(starmap_spatial::Pick::Star(3))
        .unwrap();

    store.mutate(|s| s.galaxy.stars.remove(3)).await;
    session.refresh(&store, true).await;

    assert!(session.modal().is_none());
    assert_eq!(session.selection(), None);
}

#[tokio::test]
async fn failed_foreground_refresh_keeps_the_galaxy() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    store.fail_transport_next().await;
    session.refresh(&store, false).await;
    assert_eq!(session.galaxy().stars.len(), 4);
    assert_eq!(
        session.status().unwrap().message,
        starmap_editor::status::GALAXY_LOAD_FAILED
    );
}

// ---------------------------------------------------------------------------
// Debounced persisting
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn star_edits_persist_after_the_quiet_period() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(0).unwrap();

    session.edit_draft(|s| s.name = "Halcyon".to_owned()).unwrap();
    assert_eq!(session.galaxy().stars[0].name, "Halcyon");
    assert_eq!(
        session.sync_state(EntityKey::Star(0)),
        SyncState::DirtyPending
    );

    tokio::time::advance(Duration::from_millis(600)).await;
    session.edit_draft(|s| s.description = "quiet".to_owned()).unwrap();
    tokio::time::advance(Duration::from_millis(600)).await;
    session.sync(&store).await;
    assert!(store.take_requests().await.is_empty());

    tokio::time::advance(Duration::from_millis(400)).await;
    session.sync(&store).await;
    assert_eq!(
        store.take_requests().await,
        vec![StoreRequest::UpdateStar { index: 0 }]
    );
    assert_eq!(session.sync_state(EntityKey::Star(0)), SyncState::Clean);
    assert_eq!(session.status().unwrap().message, STAR_SAVED);
    let snap = store.snapshot().await;
    let stored = &snap.galaxy.stars[0];
    assert_eq!((stored.name.as_str(), stored.description.as_str()), ("Halcyon", "quiet"));
}

#[tokio::test(start_paused = true)]
async fn refused_persist_rolls_back() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(3).unwrap();
    session.edit_draft(|s| s.name = "Not Vega".to_owned()).unwrap();

    store.reject_next(500).await;
    tokio::time::advance(Duration::from_millis(1000)).await;
    session.sync(&store).await;

    assert_eq!(
        session.sync_state(EntityKey::Star(3)),
        SyncState::RolledBack
    );
    assert_eq!(session.galaxy().stars[3].name, "Vega");
    assert_eq!(session.draft().unwrap().name, "Vega");
    assert_eq!(session.status().unwrap().message, STAR_SAVE_FAILED);
    assert_eq!(store.snapshot().await.galaxy.stars[3].name, "Vega");
}

#[tokio::test(start_paused = true)]
async fn polled_changes_are_never_written_back() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    store
        .mutate(|s| s.galaxy.stars[2].name = "Renamed elsewhere".to_owned())
        .await;
    session.refresh(&store, true).await;
    assert_eq!(session.galaxy().stars[2].name, "Renamed elsewhere");

    tokio::time::advance(Duration::from_secs(5)).await;
    assert!(session.begin_persists().is_empty());
    assert_eq!(store.take_requests().await, vec![StoreRequest::Fetch]);
}

#[tokio::test(start_paused = true)]
async fn unsaved_edit_survives_a_renumbering_poll() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(1).unwrap();
    session.edit_draft(|s| s.name = "Mine".to_owned()).unwrap();

    store.mutate(|s| s.galaxy.stars.remove(0)).await;
    session.refresh(&store, true).await;

    assert_eq!(session.galaxy().stars[0].name, "Mine");
    assert_eq!(session.selected_star(), Some(0));
    assert_eq!(
        session.sync_state(EntityKey::Star(0)),
        SyncState::DirtyPending
    );
    store.take_requests().await;

    tokio::time::advance(Duration::from_millis(1000)).await;
    session.sync(&store).await;
    assert_eq!(
        store.take_requests().await,
        vec![StoreRequest::UpdateStar { index: 0 }]
    );
    assert_eq!(store.snapshot().await.galaxy.stars[0].name, "Mine");
}

// ---------------------------------------------------------------------------
// Divisions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn changing_the_sector_clears_deeper_levels() {
    let mut snap = snapshot();
    snap.galaxy.stars[0].admin_levels = AdminLevels([Some(0), Some(0), Some(0), Some(0)]);
    let store = InMemoryStore::new(snap);
    let mut session = open(&store).await;
    session.open_star(0).unwrap();
    assert_eq!(
        session.division_name(DivisionLevel::Cluster).as_deref(),
        Some("Inner Ring")
    );

    session
        .set_star_level(DivisionLevel::Sector, Some(1))
        .unwrap();

    let expected = AdminLevels([Some(0), Some(1), None, None]);
    assert_eq!(session.draft().unwrap().admin_levels, expected);
    assert_eq!(resolve_admin(&session.galaxy().stars[0], 2000), expected);
    assert_eq!(
        session.division_name(DivisionLevel::Sector).as_deref(),
        Some("Rim")
    );
    assert_eq!(
        session.division_options(DivisionLevel::Sector),
        vec!["Core".to_owned(), "Rim".to_owned()]
    );
}

#[tokio::test]
async fn duplicate_division_names_need_a_decision() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(2).unwrap();

    let outcome = session
        .create_division_for_star(DivisionLevel::Country, " aurora", false)
        .unwrap();
    assert_eq!(outcome, DivisionOutcome::NeedsDecision { existing: 0 });
    assert_eq!(session.registry().len(), 1);

    let outcome = session
        .create_division_for_star(DivisionLevel::Country, "Aurora", true)
        .unwrap();
    assert_eq!(outcome, DivisionOutcome::Reused { index: 0 });
    assert_eq!(session.draft().unwrap().admin_levels.get(0), Some(0));
    assert_eq!(session.sync_state(EntityKey::Registry), SyncState::Clean);

    let outcome = session
        .create_division_for_star(DivisionLevel::Sector, "Frontier", false)
        .unwrap();
    assert_eq!(outcome, DivisionOutcome::Created { index: 2 });
    assert_eq!(
        session.draft().unwrap().admin_levels,
        AdminLevels([Some(0), Some(2), None, None])
    );
    assert_eq!(
        session.sync_state(EntityKey::Registry),
        SyncState::DirtyPending
    );
}

#[tokio::test]
async fn a_cluster_needs_its_ancestors() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(2).unwrap();
    let err = session
        .create_division_for_star(DivisionLevel::Cluster, "Orphan", false)
        .unwrap_err();
    assert!(matches!(err, EditorError::Core(_)));
}

#[tokio::test]
async fn changing_country_clears_or_carries_the_sector() {
    let mut snap = snapshot();
    snap.countries.push(CountryDefinition {
        name: "Boreal".to_owned(),
        color: Some([0, 0, 200]),
        sectors: vec![SectorDefinition {
            name: "rim".to_owned(),
            color: Some([50, 50, 50]),
            provinces: Vec::new(),
        }],
        ..CountryDefinition::default()
    });
    snap.galaxy.stars[0].admin_levels = AdminLevels([Some(0), Some(0), Some(0), None]);
    snap.galaxy.stars[1].admin_levels = AdminLevels([Some(0), Some(1), None, None]);
    snap.galaxy.stars[2].admin_levels = AdminLevels([Some(0), Some(0), None, None]);
    snap.galaxy.stars[3].admin_levels = AdminLevels([Some(0), Some(0), None, None]);
    let store = InMemoryStore::new(snap);
    let mut session = open(&store).await;

    session.open_star(0).unwrap();
    assert_eq!(
        session.change_star_country(0, None).unwrap(),
        CountryChangeOutcome::Unchanged
    );
    assert_eq!(
        session.change_star_country(1, None).unwrap(),
        CountryChangeOutcome::NeedsDecision
    );
    assert_eq!(
        session.draft().unwrap().admin_levels,
        AdminLevels([Some(0), Some(0), Some(0), None])
    );
    assert!(matches!(
        session.change_star_country(7, Some(CountryChange::ClearLower)),
        Err(EditorError::Core(_))
    ));

    let outcome = session
        .change_star_country(1, Some(CountryChange::ClearLower))
        .unwrap();
    assert_eq!(outcome, CountryChangeOutcome::Changed { sector: None });
    assert_eq!(
        session.draft().unwrap().admin_levels,
        AdminLevels([Some(1), None, None, None])
    );

    // "Rim" matches Boreal's "rim" and is reused
    session.deselect();
    session.open_star(1).unwrap();
    let outcome = session
        .change_star_country(1, Some(CountryChange::CarryIntoNewParent))
        .unwrap();
    assert_eq!(outcome, CountryChangeOutcome::Changed { sector: Some(0) });
    assert_eq!(session.registry().countries()[1].sectors.len(), 1);
    assert_eq!(session.sync_state(EntityKey::Registry), SyncState::Clean);

    // "Core" is missing from Boreal, so it is created once and then reused
    session.deselect();
    session.open_star(3).unwrap();
    let outcome = session
        .change_star_country(1, Some(CountryChange::CarryIntoNewParent))
        .unwrap();
    assert_eq!(outcome, CountryChangeOutcome::Changed { sector: Some(1) });
    assert_eq!(
        session.draft().unwrap().admin_levels,
        AdminLevels([Some(1), Some(1), None, None])
    );
    assert_eq!(
        session.sync_state(EntityKey::Registry),
        SyncState::DirtyPending
    );

    session.deselect();
    session.open_star(2).unwrap();
    let outcome = session
        .change_star_country(1, Some(CountryChange::CarryIntoNewParent))
        .unwrap();
    assert_eq!(outcome, CountryChangeOutcome::Changed { sector: Some(1) });
    let sectors = &session.registry().countries()[1].sectors;
    assert_eq!(sectors.len(), 2);
    assert_eq!(sectors[1].name, "Core");
    assert_eq!(
        resolve_admin(&session.galaxy().stars[2], 2000),
        AdminLevels([Some(1), Some(1), None, None])
    );
}

#[tokio::test(start_paused = true)]
async fn registry_rollback_clears_dangling_targets() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.set_edit_mode(EditMode::Political);
    let outcome = session.create_division_in_focus("Newland", false).unwrap();
    assert_eq!(outcome, DivisionOutcome::Created { index: 1 });
    assert!(session.paint_star(2, 1).unwrap());

    session.open_star(3).unwrap();
    let outcome = session
        .create_division_for_star(DivisionLevel::Country, "Borealis", false)
        .unwrap();
    assert_eq!(outcome, DivisionOutcome::Created { index: 2 });
    assert_eq!(session.draft().unwrap().admin_levels.get(0), Some(2));

    store.reject_next(500).await;
    session.sync(&store).await;
    assert_eq!(store.take_requests().await, vec![StoreRequest::PutCountries]);

    assert_eq!(session.registry().len(), 1);
    assert_eq!(session.registry().countries()[0].sectors.len(), 2);
    assert_eq!(
        session.sync_state(EntityKey::Registry),
        SyncState::RolledBack
    );
    assert_eq!(session.status().unwrap().message, COUNTRIES_SAVE_FAILED);
    assert_eq!(session.mode().political().unwrap().paint_target(), None);
    assert_eq!(session.draft().unwrap().admin_levels, AdminLevels::EMPTY);
    for index in [2, 3] {
        assert_eq!(
            resolve_admin(&session.galaxy().stars[index], 2000),
            AdminLevels::EMPTY
        );
    }

    assert!(matches!(session.paint_star(0, 1), Err(EditorError::Core(_))));
    assert!(matches!(
        session.set_paint_target(Some(1)),
        Err(EditorError::Core(_))
    ));
    assert_eq!(
        resolve_admin(&session.galaxy().stars[0], 2000),
        AdminLevels::EMPTY
    );

    // the cut-back stars reach the store, the dead divisions do not
    tokio::time::advance(Duration::from_millis(1000)).await;
    session.sync(&store).await;
    let saved = store.snapshot().await;
    assert_eq!(saved.countries.len(), 1);
    assert_eq!(
        resolve_admin(&saved.galaxy.stars[2], 2000),
        AdminLevels::EMPTY
    );
}

#[tokio::test(start_paused = true)]
async fn political_painting_persists_star_and_registry() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    assert!(matches!(
        session.create_division_in_focus("Nova", false),
        Err(EditorError::WrongMode { .. })
    ));

    session.set_edit_mode(EditMode::Political);
    let outcome = session.create_division_in_focus("Nova", false).unwrap();
    assert_eq!(outcome, DivisionOutcome::Created { index: 1 });
    assert_eq!(
        session.mode().political().unwrap().paint_target(),
        Some(1)
    );

    let at = screen_of(&session, 2);
    session.click(&store, at, false).await.unwrap();
    assert_eq!(
        resolve_admin(&session.galaxy().stars[2], 2000),
        AdminLevels([Some(1), None, None, None])
    );
    assert_eq!(session.selection(), None);

    // the registry persists at once, the star after the debounce
    session.sync(&store).await;
    assert_eq!(store.take_requests().await, vec![StoreRequest::PutCountries]);
    tokio::time::advance(Duration::from_millis(1000)).await;
    session.sync(&store).await;
    assert_eq!(
        store.take_requests().await,
        vec![StoreRequest::UpdateStar { index: 2 }]
    );
    assert_eq!(store.snapshot().await.countries.len(), 2);
    assert_eq!(session.ranked_countries()[0], 1);
}

#[tokio::test]
async fn unassign_from_the_context_menu() {
    let mut snap = snapshot();
    snap.galaxy.stars[1].admin_levels = AdminLevels([Some(0), Some(1), None, None]);
    let store = InMemoryStore::new(snap);
    let mut session = open(&store).await;
    session.set_edit_mode(EditMode::Political);

    let actions = session.context_menu(screen_of(&session, 1));
    assert_eq!(actions, vec![ContextAction::Unassign(1)]);
    session
        .run_context_action(&store, actions[0])
        .await
        .unwrap();
    assert_eq!(
        resolve_admin(&session.galaxy().stars[1], 2000),
        AdminLevels::EMPTY
    );
}

#[tokio::test]
async fn year_changes_are_clamped() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.set_year(1500);
    assert_eq!(session.year(), 2000);
    session.set_year_input("2150");
    assert_eq!(session.year(), 2150);
    session.set_year_input("soon");
    assert_eq!(session.year(), 2150);
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_a_star_renumbers_the_selection() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(3).unwrap();

    assert!(session.delete_star(&store, 0).await.unwrap());
    assert_eq!(session.selected_star(), Some(2));
    assert_eq!(session.galaxy().hyperlanes, vec![Hyperlane { a: 0, b: 2 }]);
    assert_eq!(
        store.snapshot().await.galaxy.hyperlanes,
        session.galaxy().hyperlanes
    );
}

#[tokio::test]
async fn refused_deletion_is_undone() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(3).unwrap();
    let before = session.galaxy();

    store.reject_next(500).await;
    assert!(!session.delete_star(&store, 0).await.unwrap());
    assert_eq!(*session.galaxy(), *before);
    assert_eq!(session.selected_star(), Some(3));
    assert_eq!(session.status().unwrap().message, STAR_REMOVE_FAILED);
}

#[tokio::test]
async fn lanes_are_drawn_between_two_clicked_stars() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.set_edit_mode(EditMode::Geography);

    let actions = session.context_menu(screen_of(&session, 0));
    assert_eq!(
        actions,
        vec![
            ContextAction::RemoveStar(0),
            ContextAction::StartHyperlane(0)
        ]
    );
    session
        .run_context_action(&store, ContextAction::StartHyperlane(0))
        .await
        .unwrap();
    let at = screen_of(&session, 2);
    session.click(&store, at, false).await.unwrap();

    assert_eq!(
        session.galaxy().hyperlanes.last(),
        Some(&Hyperlane { a: 0, b: 2 })
    );
    assert_eq!(
        store.take_requests().await,
        vec![StoreRequest::AddHyperlane { a: 0, b: 2 }]
    );

    // a second lane between the same stars is refused locally
    let err = session.add_hyperlane(&store, 2, 0).await.unwrap_err();
    assert!(matches!(err, EditorError::Core(_)));
    assert!(store.take_requests().await.is_empty());
}

#[tokio::test]
async fn shift_click_creates_a_star_even_without_the_generator() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.set_edit_mode(EditMode::Geography);

    let at = session.viewport().to_screen(Point::new(300.0, -120.0));
    session.click(&store, at, true).await.unwrap();

    let galaxy = session.galaxy();
    assert_eq!(galaxy.stars.len(), 5);
    let star = &galaxy.stars[4];
    assert_eq!((star.x, star.y), (300, -120));
    assert!(star.name.starts_with("Star"));
    assert_eq!(
        store.take_requests().await,
        vec![
            StoreRequest::GenerateSystem { star_index: 4 },
            StoreRequest::AddStar
        ]
    );
    assert_eq!(store.snapshot().await.galaxy.stars.len(), 5);
}

#[tokio::test]
async fn delete_key_removes_the_galaxy_selection() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session
        .select(starmap_spatial::Pick::Lane(1))
        .unwrap();
    assert_eq!(session.selection(), Some(Selection::Lane { id: 1 }));

    assert!(session.press_delete(&store).await.unwrap());
    assert_eq!(session.galaxy().hyperlanes.len(), 1);
    assert_eq!(session.galaxy_selection(), None);
    assert_eq!(session.selection(), None);
    assert!(!session.press_delete(&store).await.unwrap());
}

// ---------------------------------------------------------------------------
// System view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bodies_are_added_selected_and_removed() {
    let store = InMemoryStore::new(snapshot());
    let mut session = open(&store).await;
    session.open_star(0).unwrap();

    let first = session.add_body("Ember", "terrestrial").unwrap();
    let second = session.add_body("Drift", "asteroid_belt").unwrap();
    assert_eq!((first, second), (0, 1));
    assert_eq!(session.galaxy().stars[0].bodies.len(), 2);

    session.select_body(1).unwrap();
    session.remove_body(0).unwrap();
    assert_eq!(
        session.selection(),
        Some(Selection::Body {
            star_id: 0,
            body_idx: 0
        })
    );
    assert!(matches!(
        session.select_body(4),
        Err(EditorError::BodyNotFound { index: 4 })
    ));

    session.deselect();
    assert_eq!(session.viewport().mode(), ViewMode::Galaxy);
    assert_eq!(session.galaxy_selection(), Some(GalaxyTarget::Star(0)));
}
