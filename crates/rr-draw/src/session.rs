//! Draw session: one mounted reel plus the catalog and RNG that feed it

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::DrawConfig;
use crate::cue::CuePlayer;
use crate::error::{DrawError, Result};
use crate::outcome::pick_winner;
use crate::pool::{DisplayPool, PoolBuilder};
use crate::rarity::{Modifier, RarityTier};
use crate::reel::{ReelEngine, ReelEvent, SpinRequest, SpinStart};
use crate::scheduler::{self, StepTimer};
use crate::settlement::SettlementClient;

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Completed draws
    pub draws: u64,
    /// Completed draws per tier, indexed by ordinal
    pub wins_by_tier: [u64; RarityTier::COUNT],
    /// Draws the ledger accepted
    pub settled: u64,
    /// Draws revealed but not committed
    pub settlement_failures: u64,
}

impl SessionStats {
    pub fn wins(&self, tier: RarityTier) -> u64 {
        self.wins_by_tier[tier.ordinal()]
    }

    fn record(&mut self, event: &ReelEvent) {
        match event {
            ReelEvent::Landed { outcome, .. } => {
                self.draws += 1;
                self.wins_by_tier[outcome.tier.ordinal()] += 1;
            }
            ReelEvent::Settled { .. } => self.settled += 1,
            ReelEvent::SettlementFailed { .. } => self.settlement_failures += 1,
            ReelEvent::StepAdvanced { .. } => {}
        }
    }
}

/// Catalog, pool, RNG and reel for one mounted draw widget
pub struct DrawSession {
    config: DrawConfig,
    catalog: Catalog,
    builder: PoolBuilder,
    rng: ChaCha8Rng,
    reel: ReelEngine,
    stats: SessionStats,
}

impl DrawSession {
    /// Validate config, build the display pool and mount the reel
    pub fn new(
        config: DrawConfig,
        catalog: Catalog,
        settlement: Box<dyn SettlementClient>,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        let builder = PoolBuilder::new(config.weights.base, config.target_count);
        let pool = builder.build(&catalog, &mut rng);
        log::debug!(
            "Display pool built: {} slots, {} placeholders",
            pool.len(),
            pool.placeholder_count()
        );

        let reel = ReelEngine::new(pool, settlement)
            .with_config(config.reel)
            .with_timing(config.timing.clone());

        Ok(Self {
            config,
            catalog,
            builder,
            rng,
            reel,
            stats: SessionStats::default(),
        })
    }

    /// Builder: set the step cue player
    pub fn with_cue(mut self, cue: Box<dyn CuePlayer>) -> Self {
        self.reel = self.reel.with_cue(cue);
        self
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pool(&self) -> &DisplayPool {
        self.reel.pool()
    }

    pub fn reel(&self) -> &ReelEngine {
        &self.reel
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Resolve a winner and start the reel.
    ///
    /// A no-op while the reel is spinning: no outcome is drawn and nothing
    /// changes.
    pub fn spin(&mut self, modifier: Modifier, draw_context_id: Option<String>) -> Result<SpinStart> {
        if self.reel.is_animating() {
            return Ok(SpinStart::AlreadySpinning);
        }

        let outcome = pick_winner(
            self.catalog.items(),
            modifier,
            &self.config.weights,
            &mut self.rng,
        )?
        .clone();

        self.reel.spin(SpinRequest {
            outcome,
            modifier,
            draw_context_id,
        })
    }

    /// Feed elapsed time to the reel
    pub fn advance(&mut self, dt_ms: f64) -> Vec<ReelEvent> {
        let events = self.reel.advance(dt_ms);
        self.record(&events);
        events
    }

    /// Drive the current spin to the end with `timer`
    pub fn run_to_completion(&mut self, timer: &mut dyn StepTimer) -> Vec<ReelEvent> {
        let events = scheduler::run_to_completion(&mut self.reel, timer);
        self.record(&events);
        events
    }

    /// Take a new catalog snapshot and rebuild the display pool
    pub fn refresh_catalog(&mut self, catalog: Catalog) -> Result<()> {
        if self.reel.is_animating() {
            return Err(DrawError::Spinning);
        }
        let pool = self.builder.build(&catalog, &mut self.rng);
        self.reel.replace_pool(pool)?;
        self.catalog = catalog;
        Ok(())
    }

    fn record(&mut self, events: &[ReelEvent]) {
        for event in events {
            self.stats.record(event);
        }
    }
}
