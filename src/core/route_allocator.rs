//! Route-level allocation: splits demand already attributed to a set of
//! commercial routes among the weekly frequencies those routes fly.
//!
//! Every round, each route's share of the unallocated dollars is
//! `reputation / Σ(reputation × open ceilings)` per open ceiling. A ceiling
//! smaller than its share is filled and closed; the leftover is offered again
//! in the next round to the ceilings still open.

use crate::domain::model::RouteId;
use crate::utils::rounding::has_dollars_left;
use std::collections::BTreeMap;

/// Dollar ceiling of one weekly frequency of an operated flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ceiling {
    /// Index of the operated flight within its route.
    pub flight: usize,
    pub dollars: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteSolicitation {
    pub reputation: f64,
    pub ceilings: Vec<Ceiling>,
}

impl RouteSolicitation {
    pub fn new(reputation: f64) -> Self {
        Self {
            reputation,
            ceilings: Vec::new(),
        }
    }

    /// Adds one ceiling per weekly frequency of `flight`.
    pub fn push_flight(&mut self, flight: usize, frequencies: u32, dollars_per_frequency: f64) {
        self.ceilings.extend((0..frequencies).map(|_| Ceiling {
            flight,
            dollars: dollars_per_frequency,
        }));
    }

    pub fn total_dollars(&self) -> f64 {
        self.ceilings.iter().map(|c| c.dollars).sum()
    }

    /// Unconsumed dollars per operated flight index.
    pub fn dollars_by_flight(&self) -> BTreeMap<usize, f64> {
        let mut by_flight = BTreeMap::new();
        for ceiling in &self.ceilings {
            *by_flight.entry(ceiling.flight).or_insert(0.0) += ceiling.dollars;
        }
        by_flight
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteAllocation {
    /// Earned dollars, seeded at zero for every route offered.
    pub earned: BTreeMap<RouteId, f64>,
    /// Routes that still have unconsumed ceilings.
    pub remaining: BTreeMap<RouteId, RouteSolicitation>,
}

impl RouteAllocation {
    pub fn total_earned(&self) -> f64 {
        self.earned.values().sum()
    }
}

/// Dollars earned by each route when `class_revenue` is spread across their ceilings.
pub fn allocate(
    solicitations: &BTreeMap<RouteId, RouteSolicitation>,
    class_revenue: f64,
) -> BTreeMap<RouteId, f64> {
    split(solicitations, class_revenue).earned
}

/// Ceilings left unconsumed once `exclusive_revenue` has been carved out.
pub fn subtract_exclusive_allocations(
    solicitations: &BTreeMap<RouteId, RouteSolicitation>,
    exclusive_revenue: f64,
) -> BTreeMap<RouteId, RouteSolicitation> {
    split(solicitations, exclusive_revenue).remaining
}

/// Runs the allocation once and returns both the earned totals and the unconsumed ceilings.
pub fn split(
    solicitations: &BTreeMap<RouteId, RouteSolicitation>,
    class_revenue: f64,
) -> RouteAllocation {
    let mut earned: BTreeMap<RouteId, f64> =
        solicitations.keys().map(|route| (route.clone(), 0.0)).collect();

    // Routes without a positive reputation can never be offered a share; they
    // sit out the rounds and hand their ceilings back untouched.
    let mut idle = BTreeMap::new();
    let mut working = BTreeMap::new();
    for (route, solicitation) in solicitations {
        if solicitation.ceilings.is_empty() {
            continue;
        }
        let mut copy = solicitation.clone();
        for ceiling in copy.ceilings.iter_mut() {
            ceiling.dollars = ceiling.dollars.max(0.0);
        }
        if copy.reputation > 0.0 {
            working.insert(route.clone(), copy);
        } else {
            idle.insert(route.clone(), copy);
        }
    }

    let mut unallocated = class_revenue;
    let mut rounds = 0usize;
    while has_dollars_left(unallocated) && !working.is_empty() {
        rounds += 1;
        let total_reputation: f64 = working
            .values()
            .map(|s: &RouteSolicitation| s.reputation * s.ceilings.len() as f64)
            .sum();
        let round_revenue = unallocated;

        for (route, solicitation) in working.iter_mut() {
            let desired_per_flight = solicitation.reputation / total_reputation * round_revenue;
            let credited = earned.entry(route.clone()).or_insert(0.0);

            solicitation.ceilings.retain_mut(|ceiling| {
                let actual = desired_per_flight.min(ceiling.dollars);
                *credited += actual;
                unallocated -= actual;
                if ceiling.dollars <= desired_per_flight {
                    false
                } else {
                    ceiling.dollars -= actual;
                    true
                }
            });
        }

        working.retain(|_, solicitation| !solicitation.ceilings.is_empty());
    }

    tracing::trace!(
        rounds,
        routes = solicitations.len(),
        unallocated,
        "route-level allocation finished"
    );

    working.append(&mut idle);
    RouteAllocation {
        earned,
        remaining: working,
    }
}
