//! # rr-sim: Batch Odds Simulator
//!
//! Runs millions of outcome draws in parallel and compares the observed
//! tier rates against the analytic odds of the weight table.
//!
//! Trials are split into fixed-size chunks. Each chunk owns a `ChaCha8Rng`
//! seeded from the run seed on its own stream, so a report depends only on
//! `(seed, trials)` and never on the number of worker threads.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rr_draw::{CatalogItem, DrawError, Modifier, RarityTier, WeightTable, pick_winner, tier_odds};

/// Trials per RNG stream
pub const CHUNK_SIZE: u64 = 10_000;

/// Simulation error
#[derive(Error, Debug)]
pub enum SimError {
    #[error("trial count must be > 0")]
    NoTrials,

    #[error(transparent)]
    Draw(#[from] DrawError),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Observed vs analytic rate for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierOdds {
    pub tier: RarityTier,
    pub wins: u64,
    /// `wins / trials`
    pub empirical: f64,
    /// Share of total adjusted weight held by this tier's entries
    pub expected: f64,
}

impl TierOdds {
    /// `empirical - expected`
    pub fn deviation(&self) -> f64 {
        self.empirical - self.expected
    }
}

/// Result of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsReport {
    pub modifier: Modifier,
    pub trials: u64,
    pub seed: u64,
    /// One entry per tier in ordinal order
    pub tiers: Vec<TierOdds>,
    /// Wins per item id
    pub items: BTreeMap<String, u64>,
}

impl OddsReport {
    pub fn tier(&self, tier: RarityTier) -> &TierOdds {
        &self.tiers[tier.ordinal()]
    }

    /// Largest absolute gap between observed and analytic tier rates
    pub fn max_deviation(&self) -> f64 {
        self.tiers
            .iter()
            .map(|t| t.deviation().abs())
            .fold(0.0, f64::max)
    }
}

#[derive(Default)]
struct Tally {
    tiers: [u64; RarityTier::COUNT],
    items: BTreeMap<String, u64>,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        for (a, b) in self.tiers.iter_mut().zip(other.tiers) {
            *a += b;
        }
        for (id, wins) in other.items {
            *self.items.entry(id).or_default() += wins;
        }
        self
    }
}

fn run_chunk(
    items: &[CatalogItem],
    modifier: Modifier,
    table: &WeightTable,
    seed: u64,
    chunk: u64,
    trials: u64,
) -> Result<Tally> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chunk);

    let mut tally = Tally::default();
    for _ in 0..trials {
        let winner = pick_winner(items, modifier, table, &mut rng)?;
        tally.tiers[winner.tier.ordinal()] += 1;
        *tally.items.entry(winner.id.clone()).or_default() += 1;
    }
    Ok(tally)
}

/// Draw `trials` outcomes from `items` and report per-tier rates
pub fn simulate_odds(
    table: &WeightTable,
    items: &[CatalogItem],
    modifier: Modifier,
    trials: u64,
    seed: u64,
) -> Result<OddsReport> {
    if trials == 0 {
        return Err(SimError::NoTrials);
    }

    let chunks = trials.div_ceil(CHUNK_SIZE);
    log::debug!("Simulating {trials} draws ({modifier}) in {chunks} chunks, seed {seed}");

    let tally = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_SIZE;
            let count = CHUNK_SIZE.min(trials - start);
            run_chunk(items, modifier, table, seed, chunk, count)
        })
        .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))?;

    let expected = tier_odds(items, modifier, table);
    let tiers = RarityTier::ALL
        .into_iter()
        .map(|tier| {
            let wins = tally.tiers[tier.ordinal()];
            TierOdds {
                tier,
                wins,
                empirical: wins as f64 / trials as f64,
                expected: expected[tier.ordinal()],
            }
        })
        .collect();

    let report = OddsReport {
        modifier,
        trials,
        seed,
        tiers,
        items: tally.items,
    };
    log::info!(
        "Simulated {} draws ({}), max tier deviation {:.5}",
        trials,
        modifier,
        report.max_deviation()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_per_tier() -> Vec<CatalogItem> {
        RarityTier::ALL
            .into_iter()
            .map(|tier| CatalogItem::new(tier.name(), tier.name(), tier))
            .collect()
    }

    #[test]
    fn test_empirical_rates_track_table() {
        let table = WeightTable::default();
        let report =
            simulate_odds(&table, &one_per_tier(), Modifier::PremiumLootbox, 200_000, 11).unwrap();

        assert_eq!(report.tiers.len(), RarityTier::COUNT);
        assert_eq!(report.tiers.iter().map(|t| t.wins).sum::<u64>(), 200_000);
        assert_eq!(report.items.values().sum::<u64>(), 200_000);
        assert!(report.max_deviation() < 0.01, "{report:?}");
        assert_abs_diff_eq!(
            report.tiers.iter().map(|t| t.expected).sum::<f64>(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_repeated_entries_count_separately() {
        let table = WeightTable::default();
        let items = vec![
            CatalogItem::new("a", "A", RarityTier::Common),
            CatalogItem::new("b", "B", RarityTier::Common),
            CatalogItem::new("a", "A", RarityTier::Common),
        ];
        let report = simulate_odds(&table, &items, Modifier::Normal, 90_000, 3).unwrap();

        let a = report.items["a"] as f64 / 90_000.0;
        assert_abs_diff_eq!(a, 2.0 / 3.0, epsilon = 0.01);
        assert_eq!(report.tier(RarityTier::Common).wins, 90_000);
    }

    #[test]
    fn test_same_seed_same_report() {
        let table = WeightTable::default();
        let items = one_per_tier();
        let a = simulate_odds(&table, &items, Modifier::Event, 25_001, 99).unwrap();
        let b = simulate_odds(&table, &items, Modifier::Event, 25_001, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tiers.iter().map(|t| t.wins).sum::<u64>(), 25_001);
    }

    #[test]
    fn test_invalid_runs_rejected() {
        let table = WeightTable::default();
        assert!(matches!(
            simulate_odds(&table, &one_per_tier(), Modifier::Normal, 0, 1),
            Err(SimError::NoTrials)
        ));
        assert!(matches!(
            simulate_odds(&table, &[], Modifier::Normal, 10, 1),
            Err(SimError::Draw(DrawError::EmptyCandidates))
        ));
    }

    #[test]
    fn test_report_serializes() {
        let table = WeightTable::default();
        let report = simulate_odds(&table, &one_per_tier(), Modifier::Normal, 100, 5).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["modifier"], "normal");
        assert_eq!(json["tiers"][4]["tier"], "legendary");
    }
}
