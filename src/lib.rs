pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvRevenueStore, MemoryRevenueStore, ScenarioSource};
pub use config::EngineConfig;
pub use core::revenue_updater::{compute_market, PeriodSummary, RevenueUpdater, UpdaterSettings};
pub use utils::error::{RevenueError, Result};
