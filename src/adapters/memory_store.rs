use crate::domain::model::{MarketPair, RouteId, RouteRevenueRecord};
use crate::domain::ports::RevenueStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process revenue store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryRevenueStore {
    records: Arc<Mutex<BTreeMap<(RouteId, u32), RouteRevenueRecord>>>,
}

impl MemoryRevenueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RevenueStore for MemoryRevenueStore {
    async fn upsert_market(
        &self,
        _market: &MarketPair,
        _period: u32,
        records: &[RouteRevenueRecord],
    ) -> Result<()> {
        let mut stored = self.records.lock().await;
        for record in records {
            stored.insert(record.key(), record.clone());
        }
        Ok(())
    }

    async fn load_period(&self, period: u32) -> Result<Vec<RouteRevenueRecord>> {
        let stored = self.records.lock().await;
        Ok(stored
            .values()
            .filter(|record| record.period == period)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(route_id: &str, period: u32, revenue: f64) -> RouteRevenueRecord {
        RouteRevenueRecord {
            route_id: route_id.to_string(),
            period,
            revenue,
            exclusive_economy_revenue: 0.0,
            exclusive_premium_economy_revenue: 0.0,
            exclusive_business_revenue: 0.0,
            economy_pax: 0.0,
            premium_economy_pax: 0.0,
            business_pax: 0.0,
        }
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let store = MemoryRevenueStore::new();
        let shared = store.clone();
        assert!(store.is_empty().await);

        shared
            .upsert_market(&MarketPair::new("NYC", "LON"), 1, &[record("A", 1, 10.0)])
            .await
            .unwrap();
        store
            .upsert_market(&MarketPair::new("NYC", "LON"), 1, &[record("A", 1, 12.0)])
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(shared.load_period(1).await.unwrap(), vec![record("A", 1, 12.0)]);
    }
}
