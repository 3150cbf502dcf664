pub mod market_allocator;
pub mod reputation;
pub mod revenue_updater;
pub mod route_allocator;

pub use crate::domain::model::{DemandBucket, FlightCapacity, RouteRevenueRecord};
pub use crate::domain::ports::{MarketDataSource, RevenueStore};
pub use crate::utils::error::Result;
