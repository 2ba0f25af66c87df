/// Pipeline integration tests: end-to-end reading generation.

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reading_engine::core::catalog::{Catalog, CatalogError, CatalogRegistry};
use reading_engine::core::draw::DrawError;
use reading_engine::core::entitlement::EntitlementError;
use reading_engine::core::narrative::{interplay_sentence, foundation_sentence, UPSELL};
use reading_engine::core::pipeline::{ErrorKind, PipelineError, ReadingGenerator, ReadingRequest};
use reading_engine::core::store::{MemoryReadingStore, ReadingStore, StoreError, StoreReceipt};
use reading_engine::schema::content::{ContentId, ContentItem, ContentSet, Tier};
use reading_engine::schema::layout::{LayoutId, LayoutSpec, Slot};
use reading_engine::schema::reading::{CallerId, Reading, ReadingId};
use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex};

/// Store double that records every reading it is handed.
#[derive(Default)]
struct RecordingStore {
    saved: Mutex<Vec<(CallerId, Reading)>>,
}

impl RecordingStore {
    fn count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

impl ReadingStore for RecordingStore {
    fn save(&self, caller: &CallerId, reading: &Reading) -> Result<StoreReceipt, StoreError> {
        let expires_at = reading.expires_at.ok_or(StoreError::MissingExpiration)?;
        self.saved
            .lock()
            .unwrap()
            .push((caller.clone(), reading.clone()));
        Ok(StoreReceipt {
            id: ReadingId::new_v4(),
            expires_at,
        })
    }
}

/// Catalog double that is always unreachable.
struct DownCatalog;

impl Catalog for DownCatalog {
    fn fetch(&self, _set_id: &str) -> Result<Option<ContentSet>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }
}

fn tarot() -> CatalogRegistry {
    let mut registry = CatalogRegistry::new();
    registry
        .load_from_ron(std::path::Path::new("catalog_data/tarot.ron"))
        .unwrap();
    registry
}

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn item(id: &str, tier: Tier) -> ContentItem {
    ContentItem {
        id: ContentId::new(id),
        name: format!("Card {}", id),
        category: "major".to_string(),
        sub_tag: None,
        meaning_upright: format!("{} stands upright.", id),
        meaning_inverted: format!("{} lies reversed.", id),
        tier,
        image: format!("/cards/{}.jpg", id),
    }
}

fn three_slot_layout(tier: Tier) -> LayoutSpec {
    LayoutSpec {
        id: LayoutId::new("three"),
        name: "Three".to_string(),
        description: "Three cards.".to_string(),
        required_count: 3,
        slots: ["Past", "Present", "Future"]
            .iter()
            .enumerate()
            .map(|(i, label)| Slot {
                position: i as u32,
                label: label.to_string(),
            })
            .collect(),
        tier,
    }
}

fn catalog_of(items: Vec<ContentItem>, layouts: Vec<LayoutSpec>) -> CatalogRegistry {
    let mut registry = CatalogRegistry::new();
    registry.insert(ContentSet {
        id: "custom".to_string(),
        name: "Custom".to_string(),
        items,
        layouts,
    });
    registry
}

#[test]
fn every_reading_has_distinct_items_in_distinct_slots() {
    let generator = ReadingGenerator::new(tarot(), RecordingStore::default());
    for (layout, tier, count) in [
        ("single-card", Tier::Free, 1),
        ("three-card", Tier::Free, 3),
        ("celtic-cross", Tier::Premium, 10),
    ] {
        for seed in 0..50 {
            let request = ReadingRequest::new("tarot", layout, tier, "user-1");
            let reading = generator
                .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(reading.drawn.len(), count);

            let items: FxHashSet<&str> = reading.drawn.iter().map(|d| d.item.id.as_str()).collect();
            let slots: FxHashSet<u32> = reading.drawn.iter().map(|d| d.slot.position).collect();
            assert_eq!(items.len(), count, "{} seed {} repeated an item", layout, seed);
            assert_eq!(slots.len(), count);
        }
    }
}

#[test]
fn free_callers_never_draw_premium_items() {
    let mut items: Vec<ContentItem> = (0..5).map(|i| item(&format!("free-{}", i), Tier::Free)).collect();
    items.extend((0..5).map(|i| item(&format!("premium-{}", i), Tier::Premium)));
    let generator = ReadingGenerator::new(
        catalog_of(items, vec![three_slot_layout(Tier::Free)]),
        RecordingStore::default(),
    );

    let mut seen_premium = false;
    for seed in 0..300 {
        let free = ReadingRequest::new("custom", "three", Tier::Free, "user-1");
        let reading = generator
            .generate_at(&free, new_year(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert!(reading.drawn.iter().all(|d| d.item.tier == Tier::Free));

        let premium = ReadingRequest::new("custom", "three", Tier::Premium, "user-2");
        let reading = generator
            .generate_at(&premium, new_year(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        seen_premium |= reading.drawn.iter().any(|d| d.item.tier == Tier::Premium);
    }
    assert!(seen_premium, "premium callers should reach premium items");
}

#[test]
fn same_seed_same_reading() {
    let generator = ReadingGenerator::new(tarot(), MemoryReadingStore::new());
    let request = ReadingRequest::new("tarot", "three-card", Tier::Free, "user-1");

    let first = generator
        .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(99))
        .unwrap();
    let second = generator
        .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(99))
        .unwrap();
    assert_eq!(first.drawn, second.drawn);
    assert_eq!(first.narrative, second.narrative);
}

#[test]
fn narrative_uses_orientation_meaning() {
    let generator = ReadingGenerator::new(tarot(), RecordingStore::default());
    let mut inverted_seen = 0;
    let mut upright_seen = 0;
    for seed in 0..40 {
        let request = ReadingRequest::new("tarot", "celtic-cross", Tier::Premium, "user-1");
        let reading = generator
            .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        for drawn in &reading.drawn {
            let (shown, hidden) = if drawn.orientation.is_inverted() {
                inverted_seen += 1;
                (&drawn.item.meaning_inverted, &drawn.item.meaning_upright)
            } else {
                upright_seen += 1;
                (&drawn.item.meaning_upright, &drawn.item.meaning_inverted)
            };
            assert!(reading.narrative.contains(shown.as_str()));
            assert!(!reading.narrative.contains(hidden.as_str()));
        }
    }
    assert!(inverted_seen > 0 && upright_seen > 0);
}

#[test]
fn premium_reading_expires_thirty_days_later() {
    let generator = ReadingGenerator::new(tarot(), RecordingStore::default());
    let request = ReadingRequest::new("tarot", "three-card", Tier::Premium, "user-1");
    let reading = generator
        .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(5))
        .unwrap();

    assert_eq!(reading.created_at, new_year());
    assert_eq!(
        reading.expires_at,
        Some(Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap())
    );
    assert!(reading.storage_id.is_some());

    let saved = generator.store().saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, CallerId::new("user-1"));
    assert_eq!(saved[0].1.expires_at, reading.expires_at);
    assert_eq!(saved[0].1.narrative, reading.narrative);
}

#[test]
fn free_readings_never_reach_the_store() {
    let generator = ReadingGenerator::new(tarot(), RecordingStore::default());
    for seed in 0..10 {
        let request = ReadingRequest::new("tarot", "three-card", Tier::Free, "user-1");
        let reading = generator
            .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert!(reading.storage_id.is_none());
        assert!(reading.expires_at.is_none());
    }
    assert_eq!(generator.store().count(), 0);
}

#[test]
fn two_items_three_slots_is_insufficient() {
    let generator = ReadingGenerator::new(
        catalog_of(
            vec![item("a", Tier::Free), item("b", Tier::Free)],
            vec![three_slot_layout(Tier::Free)],
        ),
        RecordingStore::default(),
    );
    let request = ReadingRequest::new("custom", "three", Tier::Premium, "user-1");
    let err = generator
        .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(0))
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Draw(DrawError::InsufficientContent {
            available: 2,
            required: 3
        })
    ));
    assert_eq!(err.kind(), ErrorKind::InsufficientContent);
    assert_eq!(generator.store().count(), 0);
}

#[test]
fn empty_tier_fails_before_layout_lookup() {
    // The requested layout does not exist either; the content check wins.
    let generator = ReadingGenerator::new(
        catalog_of(vec![item("a", Tier::Premium)], Vec::new()),
        RecordingStore::default(),
    );
    let request = ReadingRequest::new("custom", "nonexistent", Tier::Free, "user-1");
    let err = generator
        .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Entitlement(EntitlementError::NoAvailableContent)
    ));
}

#[test]
fn gated_and_missing_layouts_are_indistinguishable() {
    let generator = ReadingGenerator::new(tarot(), RecordingStore::default());
    let gated = generator
        .generate_at(
            &ReadingRequest::new("tarot", "celtic-cross", Tier::Free, "user-1"),
            new_year(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
    let missing = generator
        .generate_at(
            &ReadingRequest::new("tarot", "horseshoe", Tier::Free, "user-1"),
            new_year(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();

    assert_eq!(gated.kind(), ErrorKind::LayoutNotFound);
    assert_eq!(gated.to_string(), missing.to_string());
    assert!(!gated.to_string().contains("celtic-cross"));
}

#[test]
fn closing_differs_by_tier_for_same_draw() {
    let generator = ReadingGenerator::new(tarot(), RecordingStore::default());
    let free = generator
        .generate_at(
            &ReadingRequest::new("tarot", "three-card", Tier::Free, "user-1"),
            new_year(),
            &mut StdRng::seed_from_u64(21),
        )
        .unwrap();

    // Same layout, free-tier catalog slice, but composed for premium.
    let mut catalog = tarot();
    let mut free_only = catalog.get("tarot").unwrap().clone();
    free_only.items.retain(|i| i.tier == Tier::Free);
    catalog.insert(free_only);
    let premium_generator = ReadingGenerator::new(catalog, RecordingStore::default());
    let premium = premium_generator
        .generate_at(
            &ReadingRequest::new("tarot", "three-card", Tier::Premium, "user-1"),
            new_year(),
            &mut StdRng::seed_from_u64(21),
        )
        .unwrap();

    assert_eq!(free.drawn, premium.drawn);

    assert!(free.narrative.contains(UPSELL));
    assert!(!free.narrative.contains(&foundation_sentence(&free.drawn[0])));
    assert!(!free
        .narrative
        .contains(&interplay_sentence(&free.drawn[1], &free.drawn[2])));

    assert!(!premium.narrative.contains(UPSELL));
    assert!(premium.narrative.contains(&foundation_sentence(&premium.drawn[0])));
    assert!(premium
        .narrative
        .contains(&interplay_sentence(&premium.drawn[1], &premium.drawn[2])));
}

#[test]
fn unreachable_catalog_is_a_configuration_error() {
    let generator = ReadingGenerator::new(DownCatalog, RecordingStore::default());
    let err = generator
        .generate(
            &ReadingRequest::new("tarot", "three-card", Tier::Premium, "user-1"),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::Catalog(CatalogError::Unavailable(_))));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn persisted_readings_show_up_in_history() {
    let generator = ReadingGenerator::new(tarot(), MemoryReadingStore::new());
    let caller = CallerId::new("user-7");
    for seed in 0..3 {
        generator
            .generate_at(
                &ReadingRequest::new("tarot", "single-card", Tier::Premium, "user-7"),
                new_year(),
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
    }
    let store = generator.store();
    assert_eq!(store.history(&caller, new_year()).unwrap().len(), 3);
    let after_expiry = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    assert!(store.history(&caller, after_expiry).unwrap().is_empty());
}

#[test]
fn generator_serves_concurrent_requests() {
    let generator = Arc::new(ReadingGenerator::new(
        Arc::new(tarot()),
        Arc::new(MemoryReadingStore::new()),
    ));

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || {
                for seed in 0..25 {
                    let request = ReadingRequest::new(
                        "tarot",
                        "three-card",
                        Tier::Premium,
                        format!("user-{}", worker),
                    );
                    generator
                        .generate_at(&request, new_year(), &mut StdRng::seed_from_u64(seed))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(generator.store().len(), 100);
}
