use crate::domain::model::{MarketPair, MarketSnapshot, RouteRevenueRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Supplies the routes, flights and demand of each market pair.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn list_markets(&self) -> Result<Vec<MarketPair>>;
    async fn load_market(&self, market: &MarketPair) -> Result<MarketSnapshot>;
}

/// Durable home of the per-route revenue records.
#[async_trait]
pub trait RevenueStore: Send + Sync {
    /// Upserts the records of one market pair on `(route_id, period)` in a
    /// single transaction: either every record is written or none is.
    async fn upsert_market(
        &self,
        market: &MarketPair,
        period: u32,
        records: &[RouteRevenueRecord],
    ) -> Result<()>;

    async fn load_period(&self, period: u32) -> Result<Vec<RouteRevenueRecord>>;
}
