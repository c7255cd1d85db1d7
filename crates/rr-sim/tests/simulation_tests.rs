//! Odds simulation over realistic catalogs

use approx::assert_abs_diff_eq;

use rr_draw::{Catalog, CatalogItem, Modifier, RarityTier, WeightTable};
use rr_sim::simulate_odds;

const CATALOG: &str = r#"
- { id: sock, name: Odd Sock, tier: common }
- { id: mug, name: Mug, tier: common }
- { id: pen, name: Pen, tier: common }
- { id: scarf, name: Scarf, tier: uncommon }
- { id: hat, name: Hat, tier: uncommon }
- { id: lamp, name: Lava Lamp, tier: rare }
- { id: drone, name: Drone, tier: epic }
- { id: crown, name: Crown, tier: legendary }
"#;

#[test]
fn lootbox_modifiers_shift_odds_upward() {
    let catalog = Catalog::from_yaml(CATALOG).unwrap();
    let table = WeightTable::default();

    let normal = simulate_odds(&table, catalog.items(), Modifier::Normal, 100_000, 1).unwrap();
    let legendary =
        simulate_odds(&table, catalog.items(), Modifier::LegendaryLootbox, 100_000, 1).unwrap();

    let rate = |r: &rr_sim::OddsReport, t| r.tier(t).empirical;
    assert!(rate(&legendary, RarityTier::Legendary) > 5.0 * rate(&normal, RarityTier::Legendary));
    assert!(rate(&legendary, RarityTier::Common) < rate(&normal, RarityTier::Common));
    assert!(normal.max_deviation() < 0.01);
    assert!(legendary.max_deviation() < 0.01);
}

#[test]
fn missing_tier_never_wins() {
    let items = vec![
        CatalogItem::new("sock", "Odd Sock", RarityTier::Common),
        CatalogItem::new("crown", "Crown", RarityTier::Legendary),
    ];
    let report =
        simulate_odds(&WeightTable::default(), &items, Modifier::Event, 50_000, 8).unwrap();

    for tier in [RarityTier::Uncommon, RarityTier::Rare, RarityTier::Epic] {
        assert_eq!(report.tier(tier).wins, 0);
        assert_eq!(report.tier(tier).expected, 0.0);
    }
    // Event: common 50, legendary 1 * 2
    assert_abs_diff_eq!(report.tier(RarityTier::Legendary).expected, 2.0 / 52.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
        report.tier(RarityTier::Legendary).empirical,
        2.0 / 52.0,
        epsilon = 0.005
    );
}

#[test]
fn per_item_rates_follow_tier_weight() {
    let catalog = Catalog::from_yaml(CATALOG).unwrap();
    let report = simulate_odds(
        &WeightTable::default(),
        catalog.items(),
        Modifier::Normal,
        200_000,
        21,
    )
    .unwrap();

    // Total weight: 3*50 + 2*30 + 15 + 4 + 1 = 230
    let share = |id: &str| report.items.get(id).copied().unwrap_or(0) as f64 / 200_000.0;
    assert_abs_diff_eq!(share("mug"), 50.0 / 230.0, epsilon = 0.01);
    assert_abs_diff_eq!(share("hat"), 30.0 / 230.0, epsilon = 0.01);
    assert_abs_diff_eq!(share("lamp"), 15.0 / 230.0, epsilon = 0.005);
}

#[test]
fn bundled_demo_files_load() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let catalog = Catalog::load(root.join("catalog.yaml")).unwrap();
    let config = rr_draw::DrawConfig::load(root.join("draw.yaml")).unwrap();

    assert_eq!(catalog.len(), 9);
    assert_eq!(config.seed, Some(2024));
    assert_eq!(config.weights, WeightTable::default());

    let report = simulate_odds(&config.weights, catalog.items(), Modifier::RareLootbox, 10_000, 2024)
        .unwrap();
    assert_eq!(report.trials, 10_000);
}
