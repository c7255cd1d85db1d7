//! # rr-draw: Reward Draw Engine
//!
//! Builds a weighted display pool for a reward reel, resolves the real
//! winner independently by weighted sampling, and drives a circular reel
//! that lands exactly on that winner after a fixed number of laps.
//!
//! ## Features
//!
//! - **Largest-remainder pools**: per-tier slot counts proportional to base weight
//! - **Modifier odds**: per-context multipliers on top of the base weight table
//! - **Landing reel**: explicit state machine with a quartic ease-in schedule
//! - **Injected timing**: drive steps in real time or synchronously in tests
//! - **Fire-once settlement**: the outcome is committed after the reveal
//!
//! ## Architecture
//!
//! ```text
//! WeightTable
//!     │
//!     ├── PoolBuilder ──────► DisplayPool (cosmetic)
//!     └── pick_winner ──────► outcome (CatalogItem)
//!                                 │
//!                                 v
//!                  ReelEngine ── StepTimer
//!                     │   └──── CuePlayer
//!                     v
//!              SettlementClient
//! ```

pub mod catalog;
pub mod config;
pub mod cue;
pub mod error;
pub mod outcome;
pub mod pool;
pub mod rarity;
pub mod reel;
pub mod scheduler;
pub mod session;
pub mod settlement;
pub mod timing;

pub use catalog::*;
pub use config::*;
pub use cue::*;
pub use error::{DrawError, Result};
pub use outcome::*;
pub use pool::*;
pub use rarity::*;
pub use reel::*;
pub use scheduler::*;
pub use session::*;
pub use settlement::*;
pub use timing::*;
