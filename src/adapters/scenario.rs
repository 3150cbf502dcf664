use crate::domain::model::{ClassValues, MarketPair, MarketSnapshot, ServiceClass};
use crate::domain::ports::MarketDataSource;
use crate::utils::error::{RevenueError, Result};
use crate::utils::validation::{validate_finite, validate_non_empty_string, Validate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 情境檔案格式：每個市場對一個 `[[markets]]` 區塊
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub markets: Vec<MarketSnapshot>,
}

impl Validate for ScenarioFile {
    fn validate(&self) -> Result<()> {
        let mut markets = HashSet::new();
        let mut routes = HashSet::new();

        for snapshot in &self.markets {
            validate_non_empty_string("market.origin_market", &snapshot.market.origin_market)?;
            validate_non_empty_string(
                "market.destination_market",
                &snapshot.market.destination_market,
            )?;
            validate_class_values("markets.demand", &snapshot.demand)?;
            for demand in &snapshot.airport_demand {
                validate_class_values("airport_demand.dollars", &demand.dollars)?;
            }
            for inertia in &snapshot.inertia_flights {
                validate_class_values("inertia_flights.seats", &inertia.seats)?;
                validate_class_values("inertia_flights.fares", &inertia.fares)?;
                validate_finite("inertia_flights.service_quality", inertia.service_quality)?;
                validate_class_values("inertia_flights.seat_comfort", &inertia.seat_comfort)?;
            }

            if !markets.insert(snapshot.market.clone()) {
                return Err(RevenueError::ConfigValidationError {
                    field: "markets".to_string(),
                    message: format!("Market pair {} is listed more than once", snapshot.market),
                });
            }

            for route in &snapshot.routes {
                validate_non_empty_string("routes.route_id", &route.route_id)?;
                validate_non_empty_string("routes.origin_airport", &route.origin_airport)?;
                validate_non_empty_string("routes.destination_airport", &route.destination_airport)?;
                validate_class_values("routes.fares", &route.fares)?;
                for flight in &route.flights {
                    validate_class_values("flights.seats", &flight.seats)?;
                    validate_finite("flights.service_quality", flight.service_quality)?;
                    validate_class_values("flights.seat_comfort", &flight.seat_comfort)?;
                }
                // Revenue records are keyed by route id alone.
                if !routes.insert(route.route_id.as_str()) {
                    return Err(RevenueError::ConfigValidationError {
                        field: "routes.route_id".to_string(),
                        message: format!("Route {} is listed more than once", route.route_id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// NaN 或無限大會擴散到整個市場的聲譽與營收，載入時就拒絕
fn validate_class_values(field_name: &str, values: &ClassValues<f64>) -> Result<()> {
    for class in ServiceClass::ALL {
        validate_finite(&format!("{}.{}", field_name, class.as_str()), values.get(class))?;
    }
    Ok(())
}

/// Market data read once from a scenario file and served from memory.
#[derive(Debug, Clone)]
pub struct ScenarioSource {
    markets: Vec<MarketSnapshot>,
}

impl ScenarioSource {
    /// 從檔案載入情境，`.json` 以外一律視為 TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let file: ScenarioFile = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        tracing::debug!(
            "Loaded scenario {} with {} markets",
            path.display(),
            file.markets.len()
        );
        Self::from_scenario(file)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(content)?;
        Self::from_scenario(file)
    }

    pub fn from_snapshots(markets: Vec<MarketSnapshot>) -> Result<Self> {
        Self::from_scenario(ScenarioFile { markets })
    }

    fn from_scenario(file: ScenarioFile) -> Result<Self> {
        file.validate()?;
        Ok(Self {
            markets: file.markets,
        })
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }
}

#[async_trait]
impl MarketDataSource for ScenarioSource {
    async fn list_markets(&self) -> Result<Vec<MarketPair>> {
        Ok(self.markets.iter().map(|s| s.market.clone()).collect())
    }

    async fn load_market(&self, market: &MarketPair) -> Result<MarketSnapshot> {
        self.markets
            .iter()
            .find(|s| &s.market == market)
            .cloned()
            .ok_or_else(|| RevenueError::MarketNotFound {
                market: market.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ServiceClass;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENARIO: &str = r#"
[[markets]]
demand = { economy = 12000.0, premium_economy = 3000.0, business = 2500.0 }

[markets.market]
origin_market = "NYC"
destination_market = "LON"

[[markets.airport_demand]]
origin_airport = "JFK"
destination_airport = "LHR"
dollars = { economy = 1500.0 }

[[markets.routes]]
route_id = "R-100"
airline = "Atlantic"
origin_airport = "JFK"
destination_airport = "LHR"
fares = { economy = 350.0, premium_economy = 700.0, business = 2100.0 }

[[markets.routes.flights]]
flight_id = "R-100-A"
frequencies = 7
seats = { economy = 180.0, premium_economy = 24.0, business = 12.0 }
service_quality = 3.5
seat_comfort = { economy = 31.0, premium_economy = 38.0, business = 78.0 }

[[markets.inertia_flights]]
flight_id = "latent-nyc-lon"
origin_airport = "EWR"
destination_airport = "LGW"
frequencies = 3
seats = { economy = 150.0 }
fares = { economy = 300.0 }
service_quality = 2.0
seat_comfort = { economy = 30.0 }
"#;

    #[test]
    fn test_parse_scenario() {
        let source = ScenarioSource::from_toml_str(SCENARIO).unwrap();
        assert_eq!(source.market_count(), 1);

        let snapshot = &source.markets[0];
        assert_eq!(snapshot.market.to_string(), "NYC-LON");
        assert_eq!(snapshot.demand.get(ServiceClass::Business), 2500.0);
        assert_eq!(snapshot.airport_demand[0].dollars.premium_economy, 0.0);
        assert_eq!(snapshot.routes[0].flights[0].frequencies, 7);
        assert_eq!(snapshot.inertia_flights[0].fares.business, 0.0);
    }

    #[test]
    fn test_duplicate_route_ids_rejected() {
        let duplicated = format!(
            "{}\n{}",
            SCENARIO,
            r#"
[[markets]]
demand = { economy = 100.0 }

[markets.market]
origin_market = "BOS"
destination_market = "LON"

[[markets.routes]]
route_id = "R-100"
airline = "Other"
origin_airport = "BOS"
destination_airport = "LHR"
fares = { economy = 300.0 }
"#
        );

        let result = ScenarioSource::from_toml_str(&duplicated);
        assert!(matches!(
            result,
            Err(RevenueError::ConfigValidationError { ref field, .. }) if field == "routes.route_id"
        ));
    }

    #[test]
    fn test_scenario_from_json_file() {
        let source = ScenarioSource::from_toml_str(SCENARIO).unwrap();
        let json = serde_json::to_string(&ScenarioFile {
            markets: source.markets.clone(),
        })
        .unwrap();

        let mut temp_file: NamedTempFile = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();

        let loaded = ScenarioSource::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.markets, source.markets);
    }

    #[test]
    fn test_non_finite_inertia_comfort_rejected() {
        let poisoned = format!(
            "{}\n{}",
            SCENARIO,
            r#"
[[markets]]
demand = { economy = 9000.0 }

[markets.market]
origin_market = "BOS"
destination_market = "LON"

[[markets.routes]]
route_id = "R-200"
airline = "Harbour"
origin_airport = "BOS"
destination_airport = "LGW"
fares = { economy = 310.0 }

[[markets.routes.flights]]
flight_id = "R-200-A"
frequencies = 5
seats = { economy = 160.0 }
service_quality = 3.0
seat_comfort = { economy = 35.0 }

[[markets.inertia_flights]]
flight_id = "latent-bos-lon"
origin_airport = "BOS"
destination_airport = "LHR"
frequencies = 2
seats = { economy = 120.0 }
fares = { economy = 280.0 }
service_quality = 2.0
seat_comfort = { economy = nan }
"#
        );

        let result = ScenarioSource::from_toml_str(&poisoned);
        assert!(matches!(
            result,
            Err(RevenueError::ConfigValidationError { ref field, .. })
                if field == "inertia_flights.seat_comfort.economy"
        ));
    }

    #[test]
    fn test_infinite_fare_rejected() {
        let poisoned = SCENARIO.replace("economy = 350.0", "economy = inf");

        let result = ScenarioSource::from_toml_str(&poisoned);
        assert!(matches!(
            result,
            Err(RevenueError::ConfigValidationError { ref field, .. })
                if field == "routes.fares.economy"
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_toml_error() {
        let result = ScenarioSource::from_toml_str("[[markets]\ndemand = ");
        assert!(matches!(result, Err(RevenueError::TomlError(_))));
    }

    #[tokio::test]
    async fn test_list_markets_and_missing_market() {
        let source = ScenarioSource::from_toml_str(SCENARIO).unwrap();

        let markets = source.list_markets().await.unwrap();
        assert_eq!(markets, vec![MarketPair::new("NYC", "LON")]);

        let missing = source.load_market(&MarketPair::new("LON", "NYC")).await;
        assert!(matches!(missing, Err(RevenueError::MarketNotFound { .. })));
    }
}
