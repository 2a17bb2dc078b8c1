//! Per-stop arrival state.

use crate::domain::{StopIndex, TransitTime};

use super::arrival::{Arrival, ArrivalId};
use super::{C2Policy, ParetoComparator, ParetoSet, TimeCalculator};

/// The criteria of a stop arrival, as kept in the per-stop Pareto sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopEntry {
    pub id: ArrivalId,
    pub time: TransitTime,
    pub round: u32,
    pub c1: i32,
    pub c2: u32,
    pub on_board: bool,
}

impl StopEntry {
    pub fn new(id: ArrivalId, arrival: &Arrival) -> Self {
        Self {
            id,
            time: arrival.arrival_time,
            round: arrival.pareto_round,
            c1: arrival.c1,
            c2: arrival.c2,
            on_board: arrival.is_transit(),
        }
    }
}

/// Stop-arrival dominance: arrival time, pareto round, c1 and c2.
#[derive(Debug, Clone)]
pub struct StopArrivalComparator {
    calculator: TimeCalculator,
    c2: C2Policy,
}

impl StopArrivalComparator {
    pub fn new(calculator: TimeCalculator, c2: C2Policy) -> Self {
        Self { calculator, c2 }
    }
}

impl ParetoComparator<StopEntry> for StopArrivalComparator {
    fn left_better(&self, left: &StopEntry, right: &StopEntry) -> bool {
        self.calculator.is_better(left.time, right.time)
            || left.round < right.round
            || left.c1 < right.c1
            || self.c2.better(left.c2, right.c2)
    }
}

/// Pareto sets of arrivals, one per stop, plus the stops touched since the
/// last round started.
pub struct StopArrivals {
    sets: Vec<ParetoSet<StopEntry, StopArrivalComparator>>,
    touched: Vec<bool>,
    touched_stops: Vec<StopIndex>,
}

impl StopArrivals {
    pub fn new(num_stops: usize, comparator: StopArrivalComparator) -> Self {
        Self {
            sets: (0..num_stops)
                .map(|_| ParetoSet::new(comparator.clone()))
                .collect(),
            touched: vec![false; num_stops],
            touched_stops: Vec::new(),
        }
    }

    /// Would a candidate with these criteria be accepted at `stop`?
    pub fn qualify(&self, stop: StopIndex, candidate: &StopEntry) -> bool {
        self.sets[stop.index()].qualify(candidate)
    }

    /// Offer an arrival at `stop`. Returns `true` if accepted.
    pub fn offer(&mut self, stop: StopIndex, entry: StopEntry) -> bool {
        let accepted = self.sets[stop.index()].offer(entry);
        if accepted {
            self.touch(stop);
        }
        accepted
    }

    /// Record `stop` as touched without offering anything.
    pub fn touch(&mut self, stop: StopIndex) {
        if !self.touched[stop.index()] {
            self.touched[stop.index()] = true;
            self.touched_stops.push(stop);
        }
    }

    /// Stops that accepted an arrival since the last call, sorted.
    pub fn take_touched(&mut self) -> Vec<StopIndex> {
        let mut stops = std::mem::take(&mut self.touched_stops);
        stops.sort_unstable();
        for &stop in &stops {
            self.touched[stop.index()] = false;
        }
        stops
    }

    /// Arrivals at `stop` accepted since its set was last marked.
    pub fn new_arrivals(&self, stop: StopIndex) -> &[StopEntry] {
        self.sets[stop.index()].elements_after_marker()
    }

    /// Mark every set and forget touched stops.
    pub fn mark_all(&mut self) {
        for set in &mut self.sets {
            set.mark_at_end();
        }
        for stop in std::mem::take(&mut self.touched_stops) {
            self.touched[stop.index()] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessEgress, PatternIndex};
    use crate::raptor::SearchDirection;
    use crate::raptor::arrival::{ArrivalArena, TransitArrival};

    fn t(s: &str) -> TransitTime {
        TransitTime::parse(s).unwrap()
    }

    fn entry(arena: &mut ArrivalArena, time: &str, c1: i32) -> StopEntry {
        let calc = TimeCalculator::new(SearchDirection::Forward);
        let id = arena
            .access_arrival(calc, t(time), AccessEgress::new(StopIndex(0), 0, c1), 0)
            .unwrap();
        StopEntry::new(id, arena.get(id))
    }

    fn arrivals() -> StopArrivals {
        let calc = TimeCalculator::new(SearchDirection::Forward);
        StopArrivals::new(3, StopArrivalComparator::new(calc, C2Policy::None))
    }

    #[test]
    fn touched_stops_are_tracked_once() {
        let mut arena = ArrivalArena::new();
        let mut state = arrivals();

        let early = entry(&mut arena, "10:00", 500);
        let cheap = entry(&mut arena, "10:05", 100);
        assert!(state.offer(StopIndex(2), early));
        assert!(state.offer(StopIndex(2), cheap));
        assert!(state.offer(StopIndex(1), early));

        assert_eq!(state.take_touched(), vec![StopIndex(1), StopIndex(2)]);
        assert!(state.take_touched().is_empty());
        assert_eq!(state.new_arrivals(StopIndex(2)).len(), 2);
    }

    #[test]
    fn rejected_offer_does_not_touch() {
        let mut arena = ArrivalArena::new();
        let mut state = arrivals();

        let good = entry(&mut arena, "10:00", 100);
        let bad = entry(&mut arena, "10:05", 200);
        state.offer(StopIndex(0), good);
        state.mark_all();

        assert!(!state.qualify(StopIndex(0), &bad));
        assert!(!state.offer(StopIndex(0), bad));
        assert!(state.take_touched().is_empty());
        assert!(state.new_arrivals(StopIndex(0)).is_empty());
    }

    #[test]
    fn round_is_a_criterion() {
        let mut arena = ArrivalArena::new();
        let mut state = arrivals();

        let access = entry(&mut arena, "10:00", 100);
        let id = arena.transit_arrival(TransitArrival {
            previous: access.id,
            pattern: PatternIndex(0),
            trip: 0,
            board_stop: StopIndex(0),
            board_time: t("10:00"),
            alight_stop: StopIndex(1),
            alight_time: t("10:00"),
            arrival_time: t("10:00"),
            c1: 100,
            c2: 0,
        });
        let transit = StopEntry::new(id, arena.get(id));
        assert!(transit.on_board);
        assert_eq!(transit.round, 1);

        assert!(state.offer(StopIndex(1), access));
        // Same time and cost but a later round: dominated
        assert!(!state.offer(StopIndex(1), transit));
        assert_eq!(state.new_arrivals(StopIndex(1)).len(), 1);
    }
}
