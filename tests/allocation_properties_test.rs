use route_revenue::core::market_allocator::MarketAllocator;
use route_revenue::core::reputation::{ReputationModel, REPUTATION_CEILING, REPUTATION_FLOOR};
use route_revenue::core::route_allocator::{self, RouteSolicitation};
use route_revenue::domain::model::{DemandBucket, FlightCapacity, ReputationInputs};
use std::collections::BTreeMap;

fn capacity(
    id: &str,
    origin: &str,
    destination: &str,
    seats: f64,
    fare: f64,
    seat_comfort: f64,
) -> FlightCapacity {
    FlightCapacity {
        flight_id: id.to_string(),
        origin_key: origin.to_string(),
        destination_key: destination.to_string(),
        available_seats: seats,
        frequencies: 1,
        reputation_inputs: ReputationInputs {
            service_quality: 3.0,
            seat_comfort,
        },
        fare,
        owning_route: Some(format!("route-{}", id)),
    }
}

fn sold_dollars(before: &[FlightCapacity], after: &[FlightCapacity]) -> f64 {
    before
        .iter()
        .zip(after)
        .map(|(b, a)| (b.available_seats - a.available_seats) * b.fare)
        .sum()
}

fn fleet() -> Vec<FlightCapacity> {
    vec![
        capacity("F1", "JFK", "LHR", 120.0, 300.0, 31.0),
        capacity("F2", "JFK", "LGW", 80.0, 250.0, 29.0),
        capacity("F3", "EWR", "LHR", 150.0, 280.0, 34.0),
        capacity("F4", "EWR", "LCY", 40.0, 600.0, 30.0),
    ]
}

#[test]
fn test_market_allocation_conserves_dollars() {
    let model = ReputationModel::default();
    let before = fleet();
    let buckets = vec![
        DemandBucket::new("JFK", "", 20_000.0),
        DemandBucket::new("", "LHR", 15_000.0),
        DemandBucket::market_wide(12_345.67),
    ];

    let after = MarketAllocator::new(&model, before.clone(), buckets).allocate_route_dollars();

    let sold = sold_dollars(&before, &after);
    assert!((sold - 47_345.67).abs() < 1e-4, "sold {}", sold);
}

#[test]
fn test_market_allocation_never_oversells() {
    let model = ReputationModel::default();
    let before = fleet();
    let capacity_dollars: f64 = before.iter().map(|c| c.available_seats * c.fare).sum();

    let after = MarketAllocator::new(&model, before.clone(), vec![DemandBucket::market_wide(1e9)])
        .allocate_route_dollars();

    for (b, a) in before.iter().zip(&after) {
        assert!(a.available_seats >= 0.0);
        assert!(a.available_seats <= b.available_seats);
        assert!(a.is_full(), "{} should be sold out", a.flight_id);
    }
    assert!((sold_dollars(&before, &after) - capacity_dollars).abs() < 1e-4);
}

#[test]
fn test_wildcard_buckets_only_reach_matching_flights() {
    let model = ReputationModel::default();
    let before = fleet();

    let after = MarketAllocator::new(&model, before.clone(), vec![DemandBucket::new("", "LHR", 5_000.0)])
        .allocate_route_dollars();

    assert!(after[0].available_seats < before[0].available_seats);
    assert_eq!(after[1].available_seats, before[1].available_seats);
    assert!(after[2].available_seats < before[2].available_seats);
    assert_eq!(after[3].available_seats, before[3].available_seats);
}

#[test]
fn test_better_reputation_sells_more_of_identical_capacity() {
    let model = ReputationModel::default();
    let before = vec![
        capacity("plain", "JFK", "LHR", 100.0, 200.0, 28.0),
        capacity("comfy", "JFK", "LHR", 100.0, 200.0, 36.0),
    ];

    let after = MarketAllocator::new(&model, before.clone(), vec![DemandBucket::market_wide(10_000.0)])
        .allocate_route_dollars();

    let plain_sold = before[0].available_seats - after[0].available_seats;
    let comfy_sold = before[1].available_seats - after[1].available_seats;
    assert!(comfy_sold > plain_sold);
    assert!(((plain_sold + comfy_sold) * 200.0 - 10_000.0).abs() < 1e-6);
}

#[test]
fn test_reputation_scores_stay_in_band() {
    let model = ReputationModel::default();
    let cohort: Vec<ReputationInputs> = [(1.0, 20.0), (5.0, 40.0), (3.2, 31.5), (4.8, 22.0)]
        .iter()
        .map(|&(service_quality, seat_comfort)| ReputationInputs {
            service_quality,
            seat_comfort,
        })
        .collect();

    let scores = model.score_cohort(&cohort);

    assert_eq!(scores.len(), cohort.len());
    for score in &scores {
        assert!(*score >= REPUTATION_FLOOR && *score <= REPUTATION_CEILING);
    }
    assert!(scores[1] > scores[0]);
}

#[test]
fn test_route_allocation_respects_ceilings() {
    let mut solicitations = BTreeMap::new();
    let mut small = RouteSolicitation::new(1.8);
    small.push_flight(0, 2, 500.0);
    let mut large = RouteSolicitation::new(1.2);
    large.push_flight(0, 3, 4_000.0);
    solicitations.insert("small".to_string(), small);
    solicitations.insert("large".to_string(), large);

    let allocation = route_allocator::split(&solicitations, 6_000.0);

    assert!(allocation.earned["small"] <= 1_000.0 + 1e-9);
    assert!(allocation.earned["large"] <= 12_000.0 + 1e-9);
    assert!((allocation.total_earned() - 6_000.0).abs() < 1e-6);

    // The small route is capped, so all of it is consumed.
    assert!(!allocation.remaining.contains_key("small"));
    let left = allocation.remaining["large"].total_dollars();
    assert!((left + allocation.earned["large"] - 12_000.0).abs() < 1e-6);
}

#[test]
fn test_route_allocation_with_excess_demand_fills_every_ceiling() {
    let mut solicitations = BTreeMap::new();
    let mut only = RouteSolicitation::new(1.5);
    only.push_flight(0, 1, 700.0);
    only.push_flight(1, 2, 150.0);
    solicitations.insert("only".to_string(), only);

    let earned = route_allocator::allocate(&solicitations, 10_000.0);
    let remaining = route_allocator::subtract_exclusive_allocations(&solicitations, 10_000.0);

    assert!((earned["only"] - 1_000.0).abs() < 1e-9);
    assert!(remaining.is_empty());
}
