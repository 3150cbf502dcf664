use crate::domain::model::{MarketPair, RouteId, RouteRevenueRecord};
use crate::domain::ports::RevenueStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const DEFAULT_FILE_NAME: &str = "route_revenue.csv";

/// Revenue records kept in one CSV file, one row per `(route_id, period)`.
///
/// Every upsert rewrites the file through a temporary sibling and a rename,
/// so readers see either the previous contents or the new ones.
#[derive(Debug)]
pub struct CsvRevenueStore {
    base_path: String,
    file_name: String,
    write_lock: Mutex<()>,
}

impl CsvRevenueStore {
    pub fn new(base_path: String) -> Self {
        Self::with_file_name(base_path, DEFAULT_FILE_NAME.to_string())
    }

    pub fn with_file_name(base_path: String, file_name: String) -> Self {
        Self {
            base_path,
            file_name,
            write_lock: Mutex::new(()),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        Path::new(&self.base_path).join(&self.file_name)
    }

    fn read_all(&self) -> Result<BTreeMap<(RouteId, u32), RouteRevenueRecord>> {
        let path = self.file_path();
        let mut records = BTreeMap::new();
        if !path.exists() {
            return Ok(records);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        for row in reader.deserialize() {
            let record: RouteRevenueRecord = row?;
            records.insert(record.key(), record);
        }
        Ok(records)
    }

    fn write_all(&self, records: &BTreeMap<(RouteId, u32), RouteRevenueRecord>) -> Result<()> {
        let path = self.file_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&staging)?;
            for record in records.values() {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        fs::rename(&staging, &path)?;
        Ok(())
    }
}

#[async_trait]
impl RevenueStore for CsvRevenueStore {
    async fn upsert_market(
        &self,
        market: &MarketPair,
        period: u32,
        records: &[RouteRevenueRecord],
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all()?;
        for record in records {
            all.insert(record.key(), record.clone());
        }
        self.write_all(&all)?;

        tracing::debug!(
            "Upserted {} records for market {} period {} into {}",
            records.len(),
            market,
            period,
            self.file_path().display()
        );
        Ok(())
    }

    async fn load_period(&self, period: u32) -> Result<Vec<RouteRevenueRecord>> {
        let _guard = self.write_lock.lock().await;
        Ok(self
            .read_all()?
            .into_values()
            .filter(|record| record.period == period)
            .collect())
    }
}
