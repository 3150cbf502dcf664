use crate::core::market_allocator::MarketAllocator;
use crate::core::reputation::{ReputationModel, ReputationWeights};
use crate::core::route_allocator::{self, RouteSolicitation};
use crate::domain::model::{
    ClassValues, DemandBucket, FlightCapacity, MarketPair, MarketSnapshot, ReputationInputs,
    RouteId, RouteRevenueRecord, RouteSnapshot, ServiceClass,
};
use crate::domain::ports::{MarketDataSource, RevenueStore};
use crate::utils::error::{RevenueError, Result};
use crate::utils::rounding::{has_dollars_left, round_money, round_pax};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy)]
pub struct UpdaterSettings {
    pub reputation: ReputationWeights,
    pub max_concurrent_markets: usize,
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            reputation: ReputationWeights::default(),
            max_concurrent_markets: 4,
        }
    }
}

/// 單一期間的執行摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: u32,
    pub markets_updated: usize,
    pub routes_updated: usize,
    pub total_revenue: f64,
}

/// Computes per-route revenue for every market pair and persists it.
pub struct RevenueUpdater<D, S> {
    source: Arc<D>,
    store: Arc<S>,
    model: ReputationModel,
    max_concurrent_markets: usize,
}

impl<D, S> Clone for RevenueUpdater<D, S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            model: self.model,
            max_concurrent_markets: self.max_concurrent_markets,
        }
    }
}

impl<D, S> RevenueUpdater<D, S>
where
    D: MarketDataSource + 'static,
    S: RevenueStore + 'static,
{
    pub fn new(source: D, store: S, settings: UpdaterSettings) -> Self {
        Self::from_shared(Arc::new(source), Arc::new(store), settings)
    }

    pub fn from_shared(source: Arc<D>, store: Arc<S>, settings: UpdaterSettings) -> Self {
        Self {
            source,
            store,
            model: ReputationModel::new(settings.reputation),
            max_concurrent_markets: settings.max_concurrent_markets.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Recomputes one market pair and upserts its records in one transaction.
    pub async fn update_market(
        &self,
        market: &MarketPair,
        period: u32,
    ) -> Result<Vec<RouteRevenueRecord>> {
        let snapshot = self.source.load_market(market).await?;
        tracing::debug!(
            "📥 Loaded market {} ({} routes, {} inertia flights)",
            market,
            snapshot.routes.len(),
            snapshot.inertia_flights.len()
        );

        let records = compute_market(&self.model, &snapshot, period);

        self.store
            .upsert_market(market, period, &records)
            .await
            .map_err(|e| match e {
                e @ RevenueError::PersistenceError { .. } => e,
                other => RevenueError::PersistenceError {
                    market: market.to_string(),
                    message: other.to_string(),
                },
            })?;

        tracing::info!(
            "💾 Market {} updated for period {} ({} routes)",
            market,
            period,
            records.len()
        );
        Ok(records)
    }

    /// Updates every market the source knows about. Markets run concurrently;
    /// a failed market does not stop the others but fails the period.
    pub async fn run_period(&self, period: u32) -> Result<PeriodSummary> {
        let markets = self.source.list_markets().await?;
        tracing::info!(
            "🚀 Updating {} markets for period {} (concurrency {})",
            markets.len(),
            period,
            self.max_concurrent_markets
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_markets));
        let mut tasks = JoinSet::new();
        for market in markets {
            let updater = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = updater.update_market(&market, period).await;
                (market, outcome)
            });
        }

        let mut updated = Vec::new();
        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((market, Ok(records))) => updated.push((market, records)),
                Ok((market, Err(e))) => {
                    tracing::error!("❌ Market {} failed for period {}: {}", market, period, e);
                    failed.push(market.to_string());
                }
                Err(join_error) => {
                    tracing::error!("❌ Market update task aborted: {}", join_error);
                    failed.push("<aborted task>".to_string());
                }
            }
        }

        if !failed.is_empty() {
            failed.sort();
            return Err(RevenueError::PeriodUpdateFailed { period, failed });
        }

        // Completion order varies between runs; sum in market order.
        updated.sort_by(|a, b| a.0.cmp(&b.0));
        let summary = PeriodSummary {
            period,
            markets_updated: updated.len(),
            routes_updated: updated.iter().map(|(_, records)| records.len()).sum(),
            total_revenue: round_money(
                updated
                    .iter()
                    .flat_map(|(_, records)| records.iter().map(|r| r.revenue))
                    .sum(),
            ),
        };
        tracing::info!(
            "✅ Period {} complete: {} markets, {} routes, revenue {:.2}",
            summary.period,
            summary.markets_updated,
            summary.routes_updated,
            summary.total_revenue
        );
        Ok(summary)
    }

    /// Computes every market for `period` without writing anything.
    pub async fn preview_period(&self, period: u32) -> Result<Vec<RouteRevenueRecord>> {
        let mut markets = self.source.list_markets().await?;
        markets.sort();

        let mut records = Vec::new();
        for market in &markets {
            let snapshot = self.source.load_market(market).await?;
            records.extend(compute_market(&self.model, &snapshot, period));
        }
        Ok(records)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RouteTotals {
    exclusive: ClassValues<f64>,
    market: ClassValues<f64>,
}

impl RouteTotals {
    fn class_revenue(&self, class: ServiceClass) -> f64 {
        self.exclusive.get(class) + self.market.get(class)
    }
}

/// Allocates every class of service of one market and builds one record per route.
pub fn compute_market(
    model: &ReputationModel,
    snapshot: &MarketSnapshot,
    period: u32,
) -> Vec<RouteRevenueRecord> {
    let mut totals: BTreeMap<RouteId, RouteTotals> = snapshot
        .routes
        .iter()
        .map(|route| (route.route_id.clone(), RouteTotals::default()))
        .collect();

    for class in ServiceClass::ALL {
        allocate_class(model, snapshot, class, &mut totals);
    }

    snapshot
        .routes
        .iter()
        .map(|route| build_record(route, period, &totals[&route.route_id]))
        .collect()
}

fn allocate_class(
    model: &ReputationModel,
    snapshot: &MarketSnapshot,
    class: ServiceClass,
    totals: &mut BTreeMap<RouteId, RouteTotals>,
) {
    // Remaining weekly seats of each operated flight, indexed [route][flight].
    let mut seats: Vec<Vec<f64>> = snapshot
        .routes
        .iter()
        .map(|route| {
            route
                .flights
                .iter()
                .map(|flight| flight.seats.get(class).max(0.0) * f64::from(flight.frequencies))
                .collect()
        })
        .collect();
    let mut buckets = Vec::new();

    for demand in &snapshot.airport_demand {
        let dollars = demand.dollars.get(class);
        if !has_dollars_left(dollars) {
            continue;
        }

        let serving: Vec<usize> = snapshot
            .routes
            .iter()
            .enumerate()
            .filter(|(_, route)| {
                route.origin_airport == demand.origin_airport
                    && route.destination_airport == demand.destination_airport
                    && route.fares.get(class) > 0.0
            })
            .map(|(index, _)| index)
            .collect();

        let solicitations = route_solicitations(model, snapshot, &serving, &seats, class);
        let allocation = route_allocator::split(&solicitations, dollars);

        for &route_index in &serving {
            let route = &snapshot.routes[route_index];
            let Some(earned) = allocation.earned.get(&route.route_id) else {
                continue;
            };
            if let Some(route_totals) = totals.get_mut(&route.route_id) {
                *route_totals.exclusive.get_mut(class) += earned;
            }

            let round_trip_fare = route.fares.get(class) * 2.0;
            let unconsumed = allocation
                .remaining
                .get(&route.route_id)
                .map(RouteSolicitation::dollars_by_flight)
                .unwrap_or_default();
            for (flight_index, remaining_seats) in seats[route_index].iter_mut().enumerate() {
                *remaining_seats =
                    unconsumed.get(&flight_index).copied().unwrap_or(0.0) / round_trip_fare;
            }
        }

        let leftover = dollars - allocation.total_earned();
        if has_dollars_left(leftover) {
            buckets.push(DemandBucket::new(
                demand.origin_airport.clone(),
                demand.destination_airport.clone(),
                leftover,
            ));
        }
    }

    buckets.push(DemandBucket::market_wide(snapshot.demand.get(class)));

    let capacities = flight_capacities(snapshot, &seats, class);
    let initial_seats: Vec<f64> = capacities.iter().map(|c| c.available_seats).collect();
    let allocated = MarketAllocator::new(model, capacities, buckets).allocate_route_dollars();

    for (capacity, initial) in allocated.iter().zip(initial_seats) {
        let Some(route_id) = &capacity.owning_route else {
            continue;
        };
        let earned = (initial - capacity.available_seats) * capacity.fare;
        if let Some(route_totals) = totals.get_mut(route_id) {
            *route_totals.market.get_mut(class) += earned;
        }
    }
}

/// Route-level inputs for the routes serving one airport pair. Each route's
/// reputation is fixed for the whole exclusive allocation.
fn route_solicitations(
    model: &ReputationModel,
    snapshot: &MarketSnapshot,
    serving: &[usize],
    seats: &[Vec<f64>],
    class: ServiceClass,
) -> BTreeMap<RouteId, RouteSolicitation> {
    let scored: Vec<(usize, ReputationInputs)> = serving
        .iter()
        .filter_map(|&index| route_inputs(&snapshot.routes[index], class).map(|inputs| (index, inputs)))
        .collect();
    let cohort: Vec<ReputationInputs> = scored.iter().map(|(_, inputs)| *inputs).collect();

    let mut solicitations = BTreeMap::new();
    for (index, inputs) in &scored {
        let route = &snapshot.routes[*index];
        let round_trip_fare = route.fares.get(class) * 2.0;
        let mut solicitation = RouteSolicitation::new(model.score(inputs, &cohort));
        for (flight_index, flight) in route.flights.iter().enumerate() {
            if flight.frequencies == 0 {
                continue;
            }
            let seats_per_frequency = seats[*index][flight_index] / f64::from(flight.frequencies);
            solicitation.push_flight(
                flight_index,
                flight.frequencies,
                seats_per_frequency * round_trip_fare,
            );
        }
        solicitations.insert(route.route_id.clone(), solicitation);
    }
    solicitations
}

/// Frequency-weighted mean of a route's flight attributes.
fn route_inputs(route: &RouteSnapshot, class: ServiceClass) -> Option<ReputationInputs> {
    let frequencies: u32 = route.flights.iter().map(|f| f.frequencies).sum();
    if frequencies == 0 {
        return None;
    }
    let weight = f64::from(frequencies);
    let (service_quality, seat_comfort) =
        route
            .flights
            .iter()
            .fold((0.0, 0.0), |(service, comfort), flight| {
                let inputs = flight.reputation_inputs(class);
                let frequencies = f64::from(flight.frequencies);
                (
                    service + inputs.service_quality * frequencies,
                    comfort + inputs.seat_comfort * frequencies,
                )
            });
    Some(ReputationInputs {
        service_quality: service_quality / weight,
        seat_comfort: seat_comfort / weight,
    })
}

fn flight_capacities(
    snapshot: &MarketSnapshot,
    seats: &[Vec<f64>],
    class: ServiceClass,
) -> Vec<FlightCapacity> {
    let mut capacities = Vec::new();

    for (route_index, route) in snapshot.routes.iter().enumerate() {
        let round_trip_fare = route.fares.get(class) * 2.0;
        for (flight_index, flight) in route.flights.iter().enumerate() {
            capacities.push(FlightCapacity {
                flight_id: flight.flight_id.clone(),
                origin_key: route.origin_airport.clone(),
                destination_key: route.destination_airport.clone(),
                available_seats: seats[route_index][flight_index],
                frequencies: flight.frequencies,
                reputation_inputs: flight.reputation_inputs(class),
                fare: round_trip_fare,
                owning_route: Some(route.route_id.clone()),
            });
        }
    }

    for inertia in &snapshot.inertia_flights {
        capacities.push(FlightCapacity {
            flight_id: inertia.flight_id.clone(),
            origin_key: inertia.origin_airport.clone(),
            destination_key: inertia.destination_airport.clone(),
            available_seats: inertia.seats.get(class).max(0.0) * f64::from(inertia.frequencies),
            frequencies: inertia.frequencies,
            reputation_inputs: ReputationInputs {
                service_quality: inertia.service_quality,
                seat_comfort: inertia.seat_comfort.get(class),
            },
            fare: inertia.fares.get(class) * 2.0,
            owning_route: None,
        });
    }

    capacities
}

fn build_record(route: &RouteSnapshot, period: u32, totals: &RouteTotals) -> RouteRevenueRecord {
    let pax = |class: ServiceClass| {
        let round_trip_fare = route.fares.get(class) * 2.0;
        if round_trip_fare > 0.0 {
            round_pax(totals.class_revenue(class) / round_trip_fare)
        } else {
            0.0
        }
    };
    let revenue: f64 = ServiceClass::ALL
        .iter()
        .map(|&class| totals.class_revenue(class))
        .sum();

    RouteRevenueRecord {
        route_id: route.route_id.clone(),
        period,
        revenue: round_money(revenue),
        exclusive_economy_revenue: round_money(totals.exclusive.economy),
        exclusive_premium_economy_revenue: round_money(totals.exclusive.premium_economy),
        exclusive_business_revenue: round_money(totals.exclusive.business),
        economy_pax: pax(ServiceClass::Economy),
        premium_economy_pax: pax(ServiceClass::PremiumEconomy),
        business_pax: pax(ServiceClass::Business),
    }
}
