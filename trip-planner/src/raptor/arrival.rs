//! Stop arrivals.
//!
//! Every arrival the search accepts is stored once in an [`ArrivalArena`]
//! and never changes. Arrivals point back to the arrival they were reached
//! from by [`ArrivalId`], so a path is a chain of ids ending at an access
//! arrival.
//!
//! Times and stops are in search terms: in a reverse search an "access"
//! arrival is reached from the destination, and a transit arrival's
//! `board_stop` is where the search boarded, which is where the traveller
//! gets off.

use crate::domain::{AccessEgress, PatternIndex, StopIndex, Transfer, TransitTime};

use super::TimeCalculator;

/// Index of an arrival in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrivalId(u32);

impl ArrivalId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// How the search reached a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalKind {
    /// Reached by a street leg from the origin (or destination, in reverse).
    Access {
        access: AccessEgress,
        /// When the leg started, in search time.
        departure_time: TransitTime,
    },
    /// Reached by riding a trip.
    Transit {
        pattern: PatternIndex,
        trip: usize,
        board_stop: StopIndex,
        /// Scheduled time the search boarded, without slack.
        board_time: TransitTime,
        /// Scheduled time the search alighted, without slack.
        alight_time: TransitTime,
    },
    /// Reached by walking from another stop.
    Transfer {
        from_stop: StopIndex,
        duration: i32,
        c1: i32,
    },
}

/// An accepted stop arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub stop: StopIndex,
    /// Time at the stop, slack included, in search time.
    pub arrival_time: TransitTime,
    pub pareto_round: u32,
    pub c1: i32,
    pub c2: u32,
    pub previous: Option<ArrivalId>,
    pub kind: ArrivalKind,
}

impl Arrival {
    pub fn is_access(&self) -> bool {
        matches!(self.kind, ArrivalKind::Access { .. })
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, ArrivalKind::Transit { .. })
    }

    /// Round of an arrival reached from this one by riding a trip.
    ///
    /// Transit after transit skips a round so that an on-board arrival
    /// never competes with an on-foot arrival of the same round.
    pub fn next_transit_round(&self) -> u32 {
        if self.is_transit() {
            self.pareto_round + 2
        } else {
            self.pareto_round + 1
        }
    }
}

/// Values of a pattern ride needed to create a transit arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitArrival {
    pub previous: ArrivalId,
    pub pattern: PatternIndex,
    pub trip: usize,
    pub board_stop: StopIndex,
    pub board_time: TransitTime,
    pub alight_stop: StopIndex,
    pub alight_time: TransitTime,
    pub arrival_time: TransitTime,
    pub c1: i32,
    pub c2: u32,
}

/// Append-only storage for the arrivals of one request.
#[derive(Debug, Default)]
pub struct ArrivalArena {
    arrivals: Vec<Arrival>,
}

impl ArrivalArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ArrivalId) -> &Arrival {
        &self.arrivals[id.index()]
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// The id the next arrival will get.
    pub fn next_id(&self) -> ArrivalId {
        ArrivalId(self.arrivals.len() as u32)
    }

    fn push(&mut self, arrival: Arrival) -> ArrivalId {
        let id = self.next_id();
        self.arrivals.push(arrival);
        id
    }

    /// Create an access arrival for a leg starting at `departure_time`.
    ///
    /// Returns `None` if the leg's opening hours rule it out.
    pub fn access_arrival(
        &mut self,
        calculator: TimeCalculator,
        departure_time: TransitTime,
        access: AccessEgress,
        c2: u32,
    ) -> Option<ArrivalId> {
        let (departure_time, arrival_time) =
            street_leg_times(calculator, departure_time, access)?;
        Some(self.push(Arrival {
            stop: access.stop(),
            arrival_time,
            pareto_round: 0,
            c1: access.c1(),
            c2,
            previous: None,
            kind: ArrivalKind::Access {
                access,
                departure_time,
            },
        }))
    }

    /// Create a transit arrival from a finished ride.
    pub fn transit_arrival(&mut self, ride: TransitArrival) -> ArrivalId {
        let pareto_round = self.get(ride.previous).next_transit_round();
        self.push(Arrival {
            stop: ride.alight_stop,
            arrival_time: ride.arrival_time,
            pareto_round,
            c1: ride.c1,
            c2: ride.c2,
            previous: Some(ride.previous),
            kind: ArrivalKind::Transit {
                pattern: ride.pattern,
                trip: ride.trip,
                board_stop: ride.board_stop,
                board_time: ride.board_time,
                alight_time: ride.alight_time,
            },
        })
    }

    /// Create a transfer arrival walking from `previous`.
    ///
    /// `transfer.stop()` is the stop walked to, in search terms.
    pub fn transfer_arrival(
        &mut self,
        previous: ArrivalId,
        transfer: Transfer,
        arrival_time: TransitTime,
        c2: u32,
    ) -> ArrivalId {
        let prev = self.get(previous);
        let arrival = Arrival {
            stop: transfer.stop(),
            arrival_time,
            pareto_round: prev.pareto_round + 1,
            c1: prev.c1 + transfer.c1(),
            c2,
            previous: Some(previous),
            kind: ArrivalKind::Transfer {
                from_stop: prev.stop,
                duration: transfer.duration(),
                c1: transfer.c1(),
            },
        };
        self.push(arrival)
    }

    /// Arrivals from `id` back to the access arrival, newest first.
    pub fn chain(&self, id: ArrivalId) -> impl Iterator<Item = &Arrival> {
        std::iter::successors(Some(self.get(id)), |arrival| {
            arrival.previous.map(|prev| self.get(prev))
        })
    }
}

/// Start and end, in search time, of a street leg that may start at
/// `departure_time`. Used for access legs and for egress to the destination.
pub fn street_leg_times(
    calculator: TimeCalculator,
    departure_time: TransitTime,
    access: AccessEgress,
) -> Option<(TransitTime, TransitTime)> {
    if calculator.is_forward() {
        let start = access.earliest_departure_time(departure_time)?;
        Some((start, start.plus(access.duration())))
    } else {
        let end = access.latest_arrival_time(departure_time)?;
        Some((end, end.minus(access.duration())))
    }
}

/// Move an access leg so it reaches its stop as late as possible, in search
/// time, no later than `requested`.
///
/// Returns the new time at the stop, or `None` if the opening hours do not
/// allow it.
pub fn time_shift(
    calculator: TimeCalculator,
    access: AccessEgress,
    requested: TransitTime,
) -> Option<TransitTime> {
    if calculator.is_forward() {
        access.latest_arrival_time(requested)
    } else {
        access.earliest_departure_time(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OpeningHours;
    use crate::raptor::SearchDirection;

    fn t(s: &str) -> TransitTime {
        TransitTime::parse(s).unwrap()
    }

    fn forward() -> TimeCalculator {
        TimeCalculator::new(SearchDirection::Forward)
    }

    fn ride(previous: ArrivalId, stop: u32, time: &str) -> TransitArrival {
        TransitArrival {
            previous,
            pattern: PatternIndex(0),
            trip: 0,
            board_stop: StopIndex(0),
            board_time: t("10:00"),
            alight_stop: StopIndex(stop),
            alight_time: t(time),
            arrival_time: t(time),
            c1: 100,
            c2: 0,
        }
    }

    #[test]
    fn access_arrival_forward_and_reverse() {
        let mut arena = ArrivalArena::new();
        let walk = AccessEgress::new(StopIndex(1), 180, 36_000);

        let id = arena.access_arrival(forward(), t("10:00"), walk, 0).unwrap();
        let arrival = arena.get(id);
        assert_eq!(arrival.arrival_time, t("10:03"));
        assert_eq!(arrival.pareto_round, 0);
        assert_eq!(arrival.c1, 36_000);
        assert!(arrival.is_access());

        let reverse = TimeCalculator::new(SearchDirection::Reverse);
        let id = arena.access_arrival(reverse, t("12:00"), walk, 0).unwrap();
        assert_eq!(arena.get(id).arrival_time, t("11:57"));
    }

    #[test]
    fn access_outside_opening_hours() {
        let mut arena = ArrivalArena::new();
        let hours = OpeningHours::new(t("08:00"), t("09:00")).unwrap();
        let flex = AccessEgress::new(StopIndex(1), 600, 0).with_opening_hours(hours);

        assert!(arena.access_arrival(forward(), t("10:00"), flex, 0).is_none());
        let id = arena.access_arrival(forward(), t("07:00"), flex, 0).unwrap();
        assert_eq!(arena.get(id).arrival_time, t("08:10"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn round_increments() {
        let mut arena = ArrivalArena::new();
        let access = arena
            .access_arrival(forward(), t("10:00"), AccessEgress::new(StopIndex(0), 60, 0), 0)
            .unwrap();

        let first = arena.transit_arrival(ride(access, 1, "10:10"));
        assert_eq!(arena.get(first).pareto_round, 1);

        let same_stop_change = arena.transit_arrival(ride(first, 2, "10:20"));
        assert_eq!(arena.get(same_stop_change).pareto_round, 3);

        let walk = arena.transfer_arrival(first, Transfer::new(StopIndex(4), 120, 500), t("10:12"), 0);
        assert_eq!(arena.get(walk).pareto_round, 2);
        assert_eq!(arena.get(walk).c1, 600);
        assert!(matches!(arena.get(walk).kind, ArrivalKind::Transfer { .. }));

        let after_walk = arena.transit_arrival(ride(walk, 5, "10:30"));
        assert_eq!(arena.get(after_walk).pareto_round, 3);
    }

    #[test]
    fn chain_walks_back_to_access() {
        let mut arena = ArrivalArena::new();
        let access = arena
            .access_arrival(forward(), t("10:00"), AccessEgress::new(StopIndex(0), 60, 0), 0)
            .unwrap();
        let transit = arena.transit_arrival(ride(access, 1, "10:10"));
        let walk = arena.transfer_arrival(transit, Transfer::new(StopIndex(2), 60, 0), t("10:11"), 0);

        let stops: Vec<_> = arena.chain(walk).map(|a| a.stop).collect();
        assert_eq!(stops, vec![StopIndex(2), StopIndex(1), StopIndex(0)]);
    }

    #[test]
    fn time_shift_follows_direction() {
        let walk = AccessEgress::new(StopIndex(0), 180, 0);
        assert_eq!(time_shift(forward(), walk, t("10:03:15")), Some(t("10:03:15")));

        let hours = OpeningHours::new(t("10:00"), t("10:30")).unwrap();
        let flex = walk.with_opening_hours(hours);
        assert_eq!(time_shift(forward(), flex, t("11:00")), Some(t("10:33")));

        let reverse = TimeCalculator::new(SearchDirection::Reverse);
        assert_eq!(time_shift(reverse, flex, t("09:50")), Some(t("10:00")));
        assert_eq!(time_shift(reverse, flex, t("10:40")), None);
    }
}
