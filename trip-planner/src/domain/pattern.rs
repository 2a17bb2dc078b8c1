//! Trip patterns and trip schedules.
//!
//! A `TripPattern` is an ordered stop sequence served by a set of trips.
//! Trips on a pattern never overtake each other, so at every stop position
//! the trips are ordered by both departure and arrival. That lets the router
//! find the trip to board with a binary search.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DomainError, StopIndex, TransitMode, TransitTime};

/// Dense index of a pattern in the transit data.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternIndex(pub u32);

impl PatternIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for PatternIndex {
    fn from(value: usize) -> Self {
        PatternIndex(value as u32)
    }
}

impl fmt::Debug for PatternIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternIndex({})", self.0)
    }
}

/// Arrival and departure times of one trip at each position of its pattern.
///
/// # Invariants
///
/// - `arrivals.len() == departures.len() >= 2`
/// - `arrivals[i] <= departures[i]` (no negative dwell)
/// - `departures[i] <= arrivals[i + 1]` (no travel back in time)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTripSchedule")]
pub struct TripSchedule {
    id: String,
    arrivals: Vec<TransitTime>,
    departures: Vec<TransitTime>,
}

#[derive(Deserialize)]
struct RawTripSchedule {
    id: String,
    #[serde(default)]
    arrivals: Option<Vec<TransitTime>>,
    departures: Vec<TransitTime>,
}

impl TryFrom<RawTripSchedule> for TripSchedule {
    type Error = DomainError;

    fn try_from(raw: RawTripSchedule) -> Result<Self, Self::Error> {
        match raw.arrivals {
            Some(arrivals) => TripSchedule::new(raw.id, arrivals, raw.departures),
            None => TripSchedule::from_times(raw.id, raw.departures),
        }
    }
}

impl TripSchedule {
    /// Create a trip with separate arrival and departure times.
    pub fn new(
        id: impl Into<String>,
        arrivals: Vec<TransitTime>,
        departures: Vec<TransitTime>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if arrivals.len() != departures.len() {
            return Err(DomainError::TripLengthMismatch {
                trip: id,
                expected: departures.len(),
                actual: arrivals.len(),
            });
        }
        if departures.len() < 2 {
            return Err(DomainError::InvalidTrip {
                trip: id,
                reason: "trip must call at two or more stops",
            });
        }
        if arrivals.iter().zip(&departures).any(|(a, d)| d < a) {
            return Err(DomainError::InvalidTrip {
                trip: id,
                reason: "departure before arrival",
            });
        }
        if departures.iter().zip(&arrivals[1..]).any(|(d, a)| a < d) {
            return Err(DomainError::InvalidTrip {
                trip: id,
                reason: "arrival before previous departure",
            });
        }
        Ok(Self {
            id,
            arrivals,
            departures,
        })
    }

    /// Create a trip that arrives and departs at the same time at each stop.
    pub fn from_times(id: impl Into<String>, times: Vec<TransitTime>) -> Result<Self, DomainError> {
        Self::new(id, times.clone(), times)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of stop positions.
    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }

    pub fn arrival(&self, pos: usize) -> TransitTime {
        self.arrivals[pos]
    }

    pub fn departure(&self, pos: usize) -> TransitTime {
        self.departures[pos]
    }

    fn overtakes(&self, later: &TripSchedule) -> bool {
        (0..self.len()).any(|pos| {
            later.departures[pos] < self.departures[pos] || later.arrivals[pos] < self.arrivals[pos]
        })
    }
}

/// An ordered stop sequence with its trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPattern {
    line: String,
    mode: TransitMode,
    stops: Vec<StopIndex>,
    trips: Vec<TripSchedule>,
    transit_group: u8,
}

/// Largest transit-group id that fits the `u32` group bitset.
pub const MAX_TRANSIT_GROUP: u8 = 31;

impl TripPattern {
    /// Build a pattern, sorting trips by departure and rejecting trips that
    /// do not match the stop sequence or overtake each other.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_planner::domain::{StopIndex, TransitMode, TransitTime, TripPattern, TripSchedule};
    ///
    /// let t = |s: &str| TransitTime::parse(s).unwrap();
    /// let trip = TripSchedule::from_times("L11-1", vec![t("10:04"), t("10:35")]).unwrap();
    /// let pattern = TripPattern::new("L11", TransitMode::Bus, vec![StopIndex(1), StopIndex(2)], vec![trip]).unwrap();
    ///
    /// assert_eq!(pattern.earliest_departure(0, t("10:00")), Some(0));
    /// assert_eq!(pattern.earliest_departure(0, t("10:05")), None);
    /// ```
    pub fn new(
        line: impl Into<String>,
        mode: TransitMode,
        stops: Vec<StopIndex>,
        mut trips: Vec<TripSchedule>,
    ) -> Result<Self, DomainError> {
        let line = line.into();
        if stops.len() < 2 {
            return Err(DomainError::PatternTooShort(line));
        }
        if let Some(trip) = trips.iter().find(|trip| trip.len() != stops.len()) {
            return Err(DomainError::TripLengthMismatch {
                trip: trip.id.clone(),
                expected: stops.len(),
                actual: trip.len(),
            });
        }

        trips.sort_by_key(|trip| (trip.departure(0), trip.arrival(trip.len() - 1)));
        for pair in trips.windows(2) {
            if pair[0].overtakes(&pair[1]) {
                return Err(DomainError::OvertakingTrips {
                    line,
                    earlier: pair[0].id.clone(),
                    later: pair[1].id.clone(),
                });
            }
        }

        Ok(Self {
            line,
            mode,
            stops,
            trips,
            transit_group: 0,
        })
    }

    /// Assign the pattern to a transit group (0-31).
    pub fn with_transit_group(mut self, group: u8) -> Result<Self, DomainError> {
        if group > MAX_TRANSIT_GROUP {
            return Err(DomainError::InvalidTransitGroup(group));
        }
        self.transit_group = group;
        Ok(self)
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn mode(&self) -> TransitMode {
        self.mode
    }

    pub fn stops(&self) -> &[StopIndex] {
        &self.stops
    }

    pub fn stop(&self, pos: usize) -> StopIndex {
        self.stops[pos]
    }

    /// Number of stop positions.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn trips(&self) -> &[TripSchedule] {
        &self.trips
    }

    pub fn trip(&self, index: usize) -> &TripSchedule {
        &self.trips[index]
    }

    pub fn transit_group(&self) -> u8 {
        self.transit_group
    }

    /// Index of the first trip departing position `pos` at or after `time`.
    pub fn earliest_departure(&self, pos: usize, time: TransitTime) -> Option<usize> {
        let idx = self.trips.partition_point(|trip| trip.departure(pos) < time);
        (idx < self.trips.len()).then_some(idx)
    }

    /// Index of the last trip arriving at position `pos` at or before `time`.
    pub fn latest_arrival(&self, pos: usize, time: TransitTime) -> Option<usize> {
        self.trips
            .partition_point(|trip| trip.arrival(pos) <= time)
            .checked_sub(1)
    }

    /// First position at or after `from` where `trip` departs `stop` at `time`.
    pub fn find_departure_stop_position(
        &self,
        trip: usize,
        from: usize,
        time: TransitTime,
        stop: StopIndex,
    ) -> Option<usize> {
        let schedule = &self.trips[trip];
        (from..self.len()).find(|&pos| self.stops[pos] == stop && schedule.departure(pos) == time)
    }

    /// First position after `board_pos` where `trip` arrives at `stop` at `time`.
    pub fn find_arrival_stop_position(
        &self,
        trip: usize,
        board_pos: usize,
        time: TransitTime,
        stop: StopIndex,
    ) -> Option<usize> {
        let schedule = &self.trips[trip];
        (board_pos + 1..self.len())
            .find(|&pos| self.stops[pos] == stop && schedule.arrival(pos) == time)
    }

}
