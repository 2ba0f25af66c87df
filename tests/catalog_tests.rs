/// Bundled catalog loading and validation tests.

use reading_engine::core::catalog::{Catalog, CatalogRegistry};
use reading_engine::schema::content::Tier;
use reading_engine::schema::layout::LayoutId;

fn load_tarot() -> CatalogRegistry {
    let mut registry = CatalogRegistry::new();
    registry
        .load_from_ron(std::path::Path::new("catalog_data/tarot.ron"))
        .unwrap();
    registry
}

#[test]
fn tarot_catalog_loads() {
    let registry = load_tarot();
    let set = registry.get("tarot").unwrap();

    assert_eq!(set.items.len(), 30);
    assert_eq!(set.available_count(Tier::Free), 22);
    assert_eq!(set.available_count(Tier::Premium), 30);

    let expected_layouts = ["single-card", "three-card", "celtic-cross"];
    for id in &expected_layouts {
        assert!(
            set.layouts.iter().any(|l| l.id == LayoutId::new(*id)),
            "Missing layout: {}",
            id
        );
    }
}

#[test]
fn tarot_catalog_has_no_issues() {
    let registry = load_tarot();
    let set = registry.get("tarot").unwrap();
    let issues = set.validate();
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn premium_cards_are_minor_arcana_with_suits() {
    let registry = load_tarot();
    let set = registry.get("tarot").unwrap();
    for item in set.items.iter().filter(|i| i.tier == Tier::Premium) {
        assert_eq!(item.category, "minor", "{} should be minor arcana", item.name);
        assert!(item.sub_tag.is_some(), "{} has no suit", item.name);
    }
    for item in set.items.iter().filter(|i| i.tier == Tier::Free) {
        assert_eq!(item.category, "major");
    }
}

#[test]
fn meanings_are_distinct_per_card() {
    let registry = load_tarot();
    let set = registry.get("tarot").unwrap();
    for item in &set.items {
        assert_ne!(item.meaning_upright, item.meaning_inverted, "{}", item.name);
        assert!(!item.meaning_upright.contains(&item.meaning_inverted));
        assert!(!item.meaning_inverted.contains(&item.meaning_upright));
    }
}

#[test]
fn load_dir_picks_up_bundled_sets() {
    let mut registry = CatalogRegistry::new();
    registry
        .load_dir(std::path::Path::new("catalog_data"))
        .unwrap();
    assert!(registry.fetch("tarot").unwrap().is_some());
}
