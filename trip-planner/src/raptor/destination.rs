//! Arrivals at the destination.

use crate::domain::{AccessEgress, TransitTime};

use super::arrival::ArrivalId;
use super::{C2Policy, ParetoComparator, ParetoSet, TimeCalculator, TracingListener};

/// A transit arrival extended with an egress leg to the destination.
///
/// Times are in search terms, like stop arrivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationArrival {
    pub egress: AccessEgress,
    pub previous: ArrivalId,
    /// When the egress leg leaves its stop.
    pub departure_time: TransitTime,
    pub arrival_time: TransitTime,
    pub pareto_round: u32,
    pub c1: i32,
    pub c2: u32,
}

/// Destination dominance: arrival time, c1, c2 and optionally the round.
#[derive(Debug, Clone)]
pub struct DestinationComparator {
    calculator: TimeCalculator,
    c2: C2Policy,
    include_round: bool,
}

impl DestinationComparator {
    pub fn new(calculator: TimeCalculator, c2: C2Policy, include_round: bool) -> Self {
        Self {
            calculator,
            c2,
            include_round,
        }
    }
}

impl ParetoComparator<DestinationArrival> for DestinationComparator {
    fn left_better(&self, left: &DestinationArrival, right: &DestinationArrival) -> bool {
        self.calculator.is_better(left.arrival_time, right.arrival_time)
            || left.c1 < right.c1
            || self.c2.better(left.c2, right.c2)
            || (self.include_round && left.pareto_round < right.pareto_round)
    }
}

/// The Pareto set of destination arrivals for one request.
pub type DestinationArrivals = ParetoSet<DestinationArrival, DestinationComparator>;

/// Create the destination set, logging its events when `debug` is set.
pub fn destination_arrivals(comparator: DestinationComparator, debug: bool) -> DestinationArrivals {
    let set = ParetoSet::new(comparator);
    if debug {
        set.with_listener(TracingListener::new("destination"))
    } else {
        set
    }
}
