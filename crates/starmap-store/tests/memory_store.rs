//! Integration tests for the in-process galaxy store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use starmap_store::{GalaxyStore, InMemoryStore, StoreError, StoreRequest};
use starmap_types::{Galaxy, GalaxySnapshot, GeneratedSystem, Hyperlane, Star};

fn store_with(stars: usize, lanes: &[(usize, usize)]) -> InMemoryStore {
    InMemoryStore::new(GalaxySnapshot {
        galaxy: Galaxy {
            width: 500,
            height: 500,
            stars: (0..stars)
                .map(|i| Star::at(i32::try_from(i).unwrap() * 10, 5))
                .collect(),
            hyperlanes: lanes.iter().map(|&(a, b)| Hyperlane { a, b }).collect(),
            resources: Vec::new(),
        },
        ..GalaxySnapshot::default()
    })
}

#[tokio::test]
async fn deleting_renumbers_like_the_real_store() {
    let store = store_with(4, &[(0, 1), (1, 2), (2, 3)]);
    store.delete_star(1).await.unwrap();
    let snap = store.fetch().await.unwrap();
    assert_eq!(snap.galaxy.stars.len(), 3);
    assert_eq!(snap.galaxy.hyperlanes, vec![Hyperlane { a: 1, b: 2 }]);

    let err = store.delete_star(9).await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn lanes_are_validated_and_idempotent() {
    let store = store_with(3, &[(0, 1)]);
    assert_eq!(store.add_hyperlane(1, 0).await.unwrap(), 0);
    assert_eq!(store.add_hyperlane(1, 2).await.unwrap(), 1);
    assert!(matches!(
        store.add_hyperlane(2, 2).await,
        Err(StoreError::Rejected { status: 400, .. })
    ));
    assert!(matches!(
        store.add_hyperlane(0, 7).await,
        Err(StoreError::Rejected { status: 404, .. })
    ));
    store.delete_hyperlane(0).await.unwrap();
    assert_eq!(
        store.snapshot().await.galaxy.hyperlanes,
        vec![Hyperlane { a: 1, b: 2 }]
    );
}

#[tokio::test]
async fn bounds_only_grow() {
    let store = store_with(1, &[]);
    let idx = store.add_star(&Star::at(700, 20), 800, 100).await.unwrap();
    assert_eq!(idx, 1);
    let galaxy = store.snapshot().await.galaxy;
    assert_eq!((galaxy.width, galaxy.height), (800, 500));
}

#[tokio::test]
async fn injected_failures_hit_the_next_request_only() {
    let store = store_with(2, &[]);
    store.reject_next(500).await;
    assert!(matches!(
        store.update_star(0, &Star::at(1, 1)).await,
        Err(StoreError::Rejected { status: 500, .. })
    ));
    assert_eq!(store.snapshot().await.galaxy.stars[0], Star::at(0, 5));

    store.fail_transport_next().await;
    assert!(matches!(
        store.fetch().await,
        Err(StoreError::Transport { .. })
    ));

    store.update_star(0, &Star::at(1, 1)).await.unwrap();
    assert_eq!(store.snapshot().await.galaxy.stars[0], Star::at(1, 1));
    assert_eq!(
        store.take_requests().await,
        vec![
            StoreRequest::UpdateStar { index: 0 },
            StoreRequest::Fetch,
            StoreRequest::UpdateStar { index: 0 },
        ]
    );
    assert!(store.requests().await.is_empty());
}

#[tokio::test]
async fn generator_needs_a_profile() {
    let store = store_with(2, &[]);
    let galaxy = store.snapshot().await.galaxy;
    assert!(matches!(
        store.generate_system(&galaxy, 1).await,
        Err(StoreError::Rejected { status: 503, .. })
    ));

    let profile = GeneratedSystem {
        name: Some("Vega".to_owned()),
        classification: "A".to_owned(),
        bodies: Vec::new(),
    };
    store.set_generated_profile(Some(profile.clone())).await;
    assert_eq!(store.generate_system(&galaxy, 1).await.unwrap(), profile);
    assert!(matches!(
        store.generate_system(&galaxy, 5).await,
        Err(StoreError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn other_editors_can_change_the_store() {
    let store = store_with(2, &[]);
    let removed = store
        .mutate(|snap| snap.galaxy.stars.remove(0))
        .await;
    assert_eq!(removed, Star::at(0, 5));
    assert_eq!(store.snapshot().await.galaxy.stars.len(), 1);
}
