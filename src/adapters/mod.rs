// Adapters layer: concrete implementations of the domain ports.

pub mod csv_store;
pub mod memory_store;
pub mod scenario;

pub use csv_store::CsvRevenueStore;
pub use memory_store::MemoryRevenueStore;
pub use scenario::ScenarioSource;
