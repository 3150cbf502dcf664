use serde::{Deserialize, Serialize};
use std::fmt;

pub type RouteId = String;

/// Class of service. Each class is allocated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceClass {
    Economy,
    PremiumEconomy,
    Business,
}

impl ServiceClass {
    pub const ALL: [ServiceClass; 3] = [
        ServiceClass::Economy,
        ServiceClass::PremiumEconomy,
        ServiceClass::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceClass::Economy => "economy",
            ServiceClass::PremiumEconomy => "premium_economy",
            ServiceClass::Business => "business",
        }
    }
}

impl fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per class of service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassValues<T> {
    #[serde(default)]
    pub economy: T,
    #[serde(default)]
    pub premium_economy: T,
    #[serde(default)]
    pub business: T,
}

impl<T: Copy> ClassValues<T> {
    pub fn new(economy: T, premium_economy: T, business: T) -> Self {
        Self {
            economy,
            premium_economy,
            business,
        }
    }

    pub fn get(&self, class: ServiceClass) -> T {
        match class {
            ServiceClass::Economy => self.economy,
            ServiceClass::PremiumEconomy => self.premium_economy,
            ServiceClass::Business => self.business,
        }
    }

    pub fn get_mut(&mut self, class: ServiceClass) -> &mut T {
        match class {
            ServiceClass::Economy => &mut self.economy,
            ServiceClass::PremiumEconomy => &mut self.premium_economy,
            ServiceClass::Business => &mut self.business,
        }
    }
}

/// Qualitative attributes that feed the reputation score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReputationInputs {
    pub service_quality: f64,
    pub seat_comfort: f64,
}

/// Dollars of unsatisfied demand for one class of service this period.
///
/// An empty origin or destination key is a wildcard that matches any airport
/// in the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandBucket {
    pub origin_key: String,
    pub destination_key: String,
    pub dollars: f64,
}

impl DemandBucket {
    pub fn new(origin_key: impl Into<String>, destination_key: impl Into<String>, dollars: f64) -> Self {
        Self {
            origin_key: origin_key.into(),
            destination_key: destination_key.into(),
            dollars,
        }
    }

    /// Demand that any airport in either market can satisfy.
    pub fn market_wide(dollars: f64) -> Self {
        Self::new("", "", dollars)
    }

    pub fn is_inert(&self) -> bool {
        !crate::utils::rounding::has_dollars_left(self.dollars)
    }

    pub fn matches(&self, capacity: &FlightCapacity) -> bool {
        key_matches(&self.origin_key, &capacity.origin_key)
            && key_matches(&self.destination_key, &capacity.destination_key)
    }
}

fn key_matches(bucket_key: &str, capacity_key: &str) -> bool {
    bucket_key.is_empty() || bucket_key == capacity_key
}

/// Sellable inventory of one candidate flight for one class of service.
///
/// Built fresh for every allocation pass and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightCapacity {
    pub flight_id: String,
    pub origin_key: String,
    pub destination_key: String,
    pub available_seats: f64,
    pub frequencies: u32,
    pub reputation_inputs: ReputationInputs,
    pub fare: f64,
    /// `None` for inertia flights.
    pub owning_route: Option<RouteId>,
}

impl FlightCapacity {
    pub fn is_full(&self) -> bool {
        self.available_seats <= 0.0
    }
}

/// Pair of markets (cities) whose demand is allocated together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketPair {
    pub origin_market: String,
    pub destination_market: String,
}

impl MarketPair {
    pub fn new(origin_market: impl Into<String>, destination_market: impl Into<String>) -> Self {
        Self {
            origin_market: origin_market.into(),
            destination_market: destination_market.into(),
        }
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin_market, self.destination_market)
    }
}

/// Demand that only service between one exact airport pair can capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportPairDemand {
    pub origin_airport: String,
    pub destination_airport: String,
    pub dollars: ClassValues<f64>,
}

/// A weekly block of departures flown on a route by one aircraft type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatedFlight {
    pub flight_id: String,
    pub frequencies: u32,
    /// Seats per departure.
    pub seats: ClassValues<f64>,
    pub service_quality: f64,
    pub seat_comfort: ClassValues<f64>,
}

impl OperatedFlight {
    pub fn reputation_inputs(&self, class: ServiceClass) -> ReputationInputs {
        ReputationInputs {
            service_quality: self.service_quality,
            seat_comfort: self.seat_comfort.get(class),
        }
    }
}

/// One airline's commercial route between two airports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub route_id: RouteId,
    pub airline: String,
    pub origin_airport: String,
    pub destination_airport: String,
    /// One-way fares.
    pub fares: ClassValues<f64>,
    #[serde(default)]
    pub flights: Vec<OperatedFlight>,
}

/// Synthetic competitor standing in for latent, unmodeled competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InertiaFlight {
    pub flight_id: String,
    pub origin_airport: String,
    pub destination_airport: String,
    pub frequencies: u32,
    pub seats: ClassValues<f64>,
    pub fares: ClassValues<f64>,
    pub service_quality: f64,
    pub seat_comfort: ClassValues<f64>,
}

/// Everything the allocator needs to know about one market pair for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market: MarketPair,
    /// Market-wide round-trip demand in dollars per week.
    pub demand: ClassValues<f64>,
    #[serde(default)]
    pub airport_demand: Vec<AirportPairDemand>,
    #[serde(default)]
    pub routes: Vec<RouteSnapshot>,
    #[serde(default)]
    pub inertia_flights: Vec<InertiaFlight>,
}

/// Durable per-route, per-period output. Upserted on `(route_id, period)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRevenueRecord {
    pub route_id: RouteId,
    pub period: u32,
    pub revenue: f64,
    pub exclusive_economy_revenue: f64,
    pub exclusive_premium_economy_revenue: f64,
    pub exclusive_business_revenue: f64,
    pub economy_pax: f64,
    pub premium_economy_pax: f64,
    pub business_pax: f64,
}

impl RouteRevenueRecord {
    pub fn key(&self) -> (RouteId, u32) {
        (self.route_id.clone(), self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(origin: &str, destination: &str) -> FlightCapacity {
        FlightCapacity {
            flight_id: "F1".to_string(),
            origin_key: origin.to_string(),
            destination_key: destination.to_string(),
            available_seats: 10.0,
            frequencies: 1,
            reputation_inputs: ReputationInputs::default(),
            fare: 100.0,
            owning_route: None,
        }
    }

    #[test]
    fn test_wildcard_bucket_matches_every_capacity() {
        let bucket = DemandBucket::market_wide(500.0);
        assert!(bucket.matches(&capacity("JFK", "LHR")));
        assert!(bucket.matches(&capacity("EWR", "LGW")));
    }

    #[test]
    fn test_concrete_bucket_matches_exact_keys_only() {
        let bucket = DemandBucket::new("JFK", "LHR", 500.0);
        assert!(bucket.matches(&capacity("JFK", "LHR")));
        assert!(!bucket.matches(&capacity("EWR", "LHR")));
        assert!(!bucket.matches(&capacity("JFK", "LGW")));
    }

    #[test]
    fn test_half_wildcard_bucket() {
        let bucket = DemandBucket::new("JFK", "", 500.0);
        assert!(bucket.matches(&capacity("JFK", "LGW")));
        assert!(!bucket.matches(&capacity("EWR", "LGW")));
    }

    #[test]
    fn test_inert_bucket() {
        assert!(DemandBucket::market_wide(0.0).is_inert());
        assert!(DemandBucket::market_wide(-10.0).is_inert());
        assert!(!DemandBucket::market_wide(0.01).is_inert());
    }

    #[test]
    fn test_market_pair_display() {
        assert_eq!(MarketPair::new("NYC", "LON").to_string(), "NYC-LON");
    }
}
