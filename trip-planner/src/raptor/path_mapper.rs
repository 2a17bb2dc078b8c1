//! Turn destination arrivals into paths.
//!
//! A forward search leaves a chain of arrivals from the destination back to
//! the origin; a reverse search leaves one from the origin forward to the
//! destination. Both are first flattened into legs in travel order, then a
//! single builder puts real times and costs on them:
//!
//! - the access leg is moved as late as it can go while still catching the
//!   first trip,
//! - transfers start as soon as the previous trip has been left,
//! - the egress leg starts as soon as its opening hours allow.
//!
//! c1 is recomputed from the finished legs, so both directions produce
//! exactly the same path for the same itinerary.

use crate::domain::{
    AccessEgress, AccessLeg, EgressLeg, Path, PathLeg, PatternIndex, StopIndex, TransferLeg,
    TransitLeg, TransitTime,
};
use crate::transit::{SlackProvider, TransitDataProvider};

use super::arrival::{Arrival, ArrivalArena, ArrivalKind};
use super::destination::DestinationArrival;
use super::{CostCalculator, SearchDirection};

/// A leg in travel order, before times are adjusted and costs computed.
#[derive(Debug, Clone, Copy)]
enum RawLeg {
    Access(AccessEgress),
    Transit {
        pattern: PatternIndex,
        trip: usize,
        from: StopIndex,
        to: StopIndex,
        departure: TransitTime,
        arrival: TransitTime,
    },
    Transfer {
        from: StopIndex,
        to: StopIndex,
        duration: i32,
        c1: i32,
    },
    Egress(AccessEgress),
}

/// Maps the destination arrivals of one search into paths.
pub struct PathMapper<'a> {
    transit: &'a dyn TransitDataProvider,
    slack: &'a dyn SlackProvider,
    costs: &'a CostCalculator,
    direction: SearchDirection,
    include_c2: bool,
}

impl<'a> PathMapper<'a> {
    pub fn new(
        transit: &'a dyn TransitDataProvider,
        slack: &'a dyn SlackProvider,
        costs: &'a CostCalculator,
        direction: SearchDirection,
        include_c2: bool,
    ) -> Self {
        Self {
            transit,
            slack,
            costs,
            direction,
            include_c2,
        }
    }

    /// Build the path ending in `destination`.
    ///
    /// # Panics
    ///
    /// Panics if the arrival chain does not describe a valid itinerary; the
    /// search only ever creates chains that do.
    pub fn map(&self, arena: &ArrivalArena, destination: &DestinationArrival) -> Path {
        let legs = if self.direction.is_forward() {
            forward_legs(arena, destination)
        } else {
            reverse_legs(arena, destination)
        };
        let c2 = self.include_c2.then_some(destination.c2);
        self.build(&legs, c2)
    }

    fn build(&self, legs: &[RawLeg], c2: Option<u32>) -> Path {
        let mut out = Vec::with_capacity(legs.len());
        // Time the traveller is free to move on from the current stop
        let mut ready_at = TransitTime::MIDNIGHT;
        let mut first_boarding = true;

        for (i, leg) in legs.iter().enumerate() {
            match *leg {
                RawLeg::Access(access) => {
                    let (mode, departure) = match legs.get(i + 1) {
                        Some(&RawLeg::Transit {
                            pattern, departure, ..
                        }) => (self.transit.pattern(pattern).mode(), departure),
                        _ => panic!("access leg must be followed by a transit leg"),
                    };
                    let latest = departure.minus(self.slack.board_slack(mode));
                    let arrival = access
                        .latest_arrival_time(latest)
                        .expect("access leg reaches its stop in time for the first trip");
                    out.push(PathLeg::Access(AccessLeg {
                        stop: access.stop(),
                        departure: arrival.minus(access.duration()),
                        arrival,
                        c1: access.c1(),
                    }));
                    ready_at = arrival;
                }
                RawLeg::Transit {
                    pattern: index,
                    trip,
                    from,
                    to,
                    departure,
                    arrival,
                } => {
                    let pattern = self.transit.pattern(index);
                    let mode = pattern.mode();
                    let board_pos = pattern
                        .find_departure_stop_position(trip, 0, departure, from)
                        .expect("trip departs the boarding stop at the boarding time");
                    let alight_pos = pattern
                        .find_arrival_stop_position(trip, board_pos, arrival, to)
                        .expect("trip arrives at the alighting stop at the alighting time");
                    let alight_slack = self.slack.alight_slack(mode);

                    let c1 = self.costs.board_cost(first_boarding, from)
                        + self.costs.wait_cost(departure.seconds_since(ready_at))
                        + self
                            .costs
                            .transit_cost(mode, arrival.seconds_since(departure))
                        + self.costs.wait_cost(alight_slack)
                        + self.costs.alight_cost(to);

                    out.push(PathLeg::Transit(TransitLeg {
                        pattern: index,
                        trip,
                        trip_id: pattern.trip(trip).id().to_string(),
                        line: pattern.line().to_string(),
                        mode,
                        board_stop: from,
                        board_pos,
                        alight_stop: to,
                        alight_pos,
                        departure,
                        arrival,
                        c1,
                    }));
                    ready_at = arrival.plus(alight_slack);
                    first_boarding = false;
                }
                RawLeg::Transfer {
                    from,
                    to,
                    duration,
                    c1,
                } => {
                    let arrival = ready_at.plus(duration);
                    out.push(PathLeg::Transfer(TransferLeg {
                        from_stop: from,
                        to_stop: to,
                        departure: ready_at,
                        arrival,
                        c1,
                    }));
                    ready_at = arrival;
                }
                RawLeg::Egress(egress) => {
                    let departure = egress
                        .earliest_departure_time(ready_at)
                        .expect("egress leg is open after the last trip");
                    out.push(PathLeg::Egress(EgressLeg {
                        stop: egress.stop(),
                        departure,
                        arrival: departure.plus(egress.duration()),
                        c1: egress.c1() + self.costs.wait_cost(departure.seconds_since(ready_at)),
                    }));
                }
            }
        }

        Path::new(out, c2).expect("mapped path is valid")
    }
}

/// Legs of a forward chain. The chain runs from the destination backwards.
fn forward_legs(arena: &ArrivalArena, destination: &DestinationArrival) -> Vec<RawLeg> {
    let mut legs = vec![RawLeg::Egress(destination.egress)];
    for arrival in arena.chain(destination.previous) {
        legs.push(forward_leg(arrival));
    }
    legs.reverse();
    legs
}

fn forward_leg(arrival: &Arrival) -> RawLeg {
    match arrival.kind {
        ArrivalKind::Access { access, .. } => RawLeg::Access(access),
        ArrivalKind::Transit {
            pattern,
            trip,
            board_stop,
            board_time,
            alight_time,
        } => RawLeg::Transit {
            pattern,
            trip,
            from: board_stop,
            to: arrival.stop,
            departure: board_time,
            arrival: alight_time,
        },
        ArrivalKind::Transfer {
            from_stop,
            duration,
            c1,
        } => RawLeg::Transfer {
            from: from_stop,
            to: arrival.stop,
            duration,
            c1,
        },
    }
}

/// Legs of a reverse chain. The chain already runs from the origin, and the
/// search's access leg is the traveller's egress.
fn reverse_legs(arena: &ArrivalArena, destination: &DestinationArrival) -> Vec<RawLeg> {
    let mut legs = vec![RawLeg::Access(destination.egress)];
    for arrival in arena.chain(destination.previous) {
        legs.push(reverse_leg(arrival));
    }
    legs
}

fn reverse_leg(arrival: &Arrival) -> RawLeg {
    match arrival.kind {
        ArrivalKind::Access { access, .. } => RawLeg::Egress(access),
        ArrivalKind::Transit {
            pattern,
            trip,
            board_stop,
            board_time,
            alight_time,
        } => RawLeg::Transit {
            pattern,
            trip,
            from: arrival.stop,
            to: board_stop,
            departure: alight_time,
            arrival: board_time,
        },
        ArrivalKind::Transfer {
            from_stop,
            duration,
            c1,
        } => RawLeg::Transfer {
            from: arrival.stop,
            to: from_stop,
            duration,
            c1,
        },
    }
}
