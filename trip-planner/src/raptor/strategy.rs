//! Routing strategy: board, ride and alight on one pattern, and walk.
//!
//! The strategy scans a pattern's stop positions in search order. At each
//! position it first alights every ride in progress, then boards from the
//! arrivals the previous round left at that stop. Rides compete in a
//! per-pattern Pareto set so that a ride on a later trip with no cost
//! advantage is dropped as soon as a better one exists.

use crate::domain::{PatternIndex, StopIndex, TransitTime};
use crate::transit::{SlackProvider, TransitDataProvider};

use super::arrival::{ArrivalArena, ArrivalId, ArrivalKind, TransitArrival, time_shift};
use super::state::{StopArrivals, StopEntry};
use super::{C2Policy, CostCalculator, ParetoComparator, ParetoSet, SearchStats, TimeCalculator};

/// A ride in progress on one trip of the pattern being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRide {
    pub previous: ArrivalId,
    pub board_stop: StopIndex,
    pub board_time: TransitTime,
    pub trip: usize,
    /// c1 at boarding minus the in-vehicle cost up to `board_time`, so that
    /// adding the in-vehicle cost up to any alight time gives the c1 there.
    pub relative_c1: i32,
    /// c2 at the position being scanned. Stops passed on board are added
    /// as the scan reaches them.
    pub c2: u32,
}

/// Ride dominance: earlier trip, lower relative c1, then c2.
#[derive(Debug, Clone)]
pub struct RideComparator {
    calculator: TimeCalculator,
    c2: C2Policy,
}

impl RideComparator {
    pub fn new(calculator: TimeCalculator, c2: C2Policy) -> Self {
        Self { calculator, c2 }
    }
}

impl ParetoComparator<PatternRide> for RideComparator {
    fn left_better(&self, left: &PatternRide, right: &PatternRide) -> bool {
        self.calculator.trip_is_better(left.trip, right.trip)
            || left.relative_c1 < right.relative_c1
            || self.c2.better(left.c2, right.c2)
    }
}

pub type PatternRides = ParetoSet<PatternRide, RideComparator>;

/// Read-only inputs shared by every pattern scan in a request.
pub struct RoutingStrategy<'a> {
    pub transit: &'a dyn TransitDataProvider,
    pub slack: &'a dyn SlackProvider,
    pub calculator: TimeCalculator,
    pub costs: &'a CostCalculator,
    pub c2: &'a C2Policy,
}

/// Mutable search state touched by a pattern scan.
pub struct ScanState<'s> {
    pub arena: &'s mut ArrivalArena,
    pub stops: &'s mut StopArrivals,
    pub rides: &'s mut PatternRides,
    pub stats: &'s mut SearchStats,
}

impl RoutingStrategy<'_> {
    /// Scan one pattern, boarding from `candidates` (indexed by stop).
    pub fn scan_pattern(
        &self,
        index: PatternIndex,
        candidates: &[Vec<StopEntry>],
        state: &mut ScanState<'_>,
    ) {
        let pattern = self.transit.pattern(index);
        let mode = pattern.mode();
        let factor = self.costs.transit_factor(mode);
        let board_slack = self.calculator.board_slack(self.slack, mode);
        let alight_slack = self.calculator.alight_slack(self.slack, mode);
        state.rides.clear();

        for pos in self.calculator.positions(pattern.len()) {
            let stop = pattern.stop(pos);
            if self.c2.counts_stops_on_board() && !state.rides.is_empty() {
                state.rides.update(|ride| ride.c2 = self.c2.ride(ride.c2, stop));
            }

            for ride in state.rides.iter() {
                let trip = pattern.trip(ride.trip);
                let alight_time = self.calculator.alight_time(trip, pos);
                assert!(
                    !self.calculator.is_better(alight_time, ride.board_time),
                    "trip {} on {} alights at {} before boarding at {}",
                    trip.id(),
                    pattern.line(),
                    alight_time,
                    ride.board_time
                );

                let c1 = ride.relative_c1
                    + factor * self.calculator.signed(alight_time)
                    + self.costs.wait_cost(alight_slack)
                    + self.costs.alight_cost(stop);
                let c2 = ride.c2;
                let candidate = StopEntry {
                    id: state.arena.next_id(),
                    time: self.calculator.plus(alight_time, alight_slack),
                    round: state.arena.get(ride.previous).next_transit_round(),
                    c1,
                    c2,
                    on_board: true,
                };
                if !state.stops.qualify(stop, &candidate) {
                    state.stats.rejected_arrivals += 1;
                    continue;
                }

                let id = state.arena.transit_arrival(TransitArrival {
                    previous: ride.previous,
                    pattern: index,
                    trip: ride.trip,
                    board_stop: ride.board_stop,
                    board_time: ride.board_time,
                    alight_stop: stop,
                    alight_time,
                    arrival_time: candidate.time,
                    c1,
                    c2,
                });
                state.stops.offer(stop, StopEntry { id, ..candidate });
                state.stats.accepted_arrivals += 1;
            }

            for entry in &candidates[stop.index()] {
                let prev = state.arena.get(entry.id);
                let first_boarding = prev.is_access();
                let transfer_slack = if first_boarding {
                    0
                } else {
                    self.slack.transfer_slack()
                };
                let earliest = self
                    .calculator
                    .plus(entry.time, board_slack + transfer_slack);
                let Some(trip_index) = self.calculator.find_trip(pattern, pos, earliest) else {
                    continue;
                };
                let board_time = self.calculator.board_time(pattern.trip(trip_index), pos);

                // Waiting after an access leg is measured from the latest
                // time the leg could have arrived
                let waited_from = match &prev.kind {
                    ArrivalKind::Access { access, .. } => time_shift(
                        self.calculator,
                        *access,
                        self.calculator.minus(board_time, board_slack),
                    )
                    .unwrap_or(entry.time),
                    _ => entry.time,
                };
                let wait = self.calculator.duration_between(waited_from, board_time);
                let board_c1 = prev.c1
                    + self.costs.board_cost(first_boarding, stop)
                    + self.costs.wait_cost(wait);

                let ride = PatternRide {
                    previous: entry.id,
                    board_stop: stop,
                    board_time,
                    trip: trip_index,
                    relative_c1: board_c1 - factor * self.calculator.signed(board_time),
                    c2: self.c2.board(prev.c2, pattern, stop),
                };
                if state.rides.offer(ride) {
                    state.stats.boardings += 1;
                }
            }
        }
    }

    /// Walk from each arrival in `from` along its stop's transfers.
    pub fn transfers(
        &self,
        from: &[StopEntry],
        arena: &mut ArrivalArena,
        stops: &mut StopArrivals,
        stats: &mut SearchStats,
    ) {
        for entry in from {
            let stop = arena.get(entry.id).stop;
            for &transfer in self.calculator.transfers(self.transit, stop) {
                let candidate = StopEntry {
                    id: arena.next_id(),
                    time: self.calculator.plus(entry.time, transfer.duration()),
                    round: entry.round + 1,
                    c1: entry.c1 + transfer.c1(),
                    c2: self.c2.transfer(entry.c2, transfer.stop()),
                    on_board: false,
                };
                if !stops.qualify(transfer.stop(), &candidate) {
                    stats.rejected_arrivals += 1;
                    continue;
                }
                let id = arena.transfer_arrival(entry.id, transfer, candidate.time, candidate.c2);
                stops.offer(transfer.stop(), StopEntry { id, ..candidate });
                stats.accepted_arrivals += 1;
            }
        }
    }
}
