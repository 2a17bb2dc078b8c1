//! Direction-dependent time arithmetic.
//!
//! The worker is written once, in terms of "search time": time that moves
//! forward in a forward search and backward in a reverse search. This
//! calculator maps search-time operations onto real times.

use crate::domain::{StopIndex, Transfer, TransitMode, TransitTime, TripPattern, TripSchedule};
use crate::transit::{SlackProvider, TransitDataProvider};

use super::SearchDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCalculator {
    direction: SearchDirection,
}

impl TimeCalculator {
    pub fn new(direction: SearchDirection) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn is_forward(&self) -> bool {
        self.direction.is_forward()
    }

    /// Move `time` forward in search time.
    pub fn plus(&self, time: TransitTime, seconds: i32) -> TransitTime {
        if self.is_forward() {
            time.plus(seconds)
        } else {
            time.minus(seconds)
        }
    }

    /// Move `time` backward in search time.
    pub fn minus(&self, time: TransitTime, seconds: i32) -> TransitTime {
        if self.is_forward() {
            time.minus(seconds)
        } else {
            time.plus(seconds)
        }
    }

    /// Seconds of search time from `from` to `to`.
    pub fn duration_between(&self, from: TransitTime, to: TransitTime) -> i32 {
        self.signed(to) - self.signed(from)
    }

    /// Time as a number that grows with search time.
    pub fn signed(&self, time: TransitTime) -> i32 {
        if self.is_forward() {
            time.seconds()
        } else {
            -time.seconds()
        }
    }

    /// Is `a` strictly earlier than `b` in search time?
    pub fn is_better(&self, a: TransitTime, b: TransitTime) -> bool {
        if self.is_forward() { a < b } else { a > b }
    }

    /// Stop positions of a pattern in search order.
    pub fn positions(&self, len: usize) -> StopPositions {
        StopPositions {
            front: 0,
            back: len,
            forward: self.is_forward(),
        }
    }

    /// Is trip `a` earlier than trip `b` in search time? Trips on a pattern
    /// never overtake, so trip order is time order at every position.
    pub fn trip_is_better(&self, a: usize, b: usize) -> bool {
        if self.is_forward() { a < b } else { a > b }
    }

    /// The first trip that can be boarded at `pos` at or after `time` in
    /// search time.
    pub fn find_trip(&self, pattern: &TripPattern, pos: usize, time: TransitTime) -> Option<usize> {
        if self.is_forward() {
            pattern.earliest_departure(pos, time)
        } else {
            pattern.latest_arrival(pos, time)
        }
    }

    /// Time the search boards `trip` at `pos`.
    pub fn board_time(&self, trip: &TripSchedule, pos: usize) -> TransitTime {
        if self.is_forward() {
            trip.departure(pos)
        } else {
            trip.arrival(pos)
        }
    }

    /// Time the search leaves `trip` at `pos`.
    pub fn alight_time(&self, trip: &TripSchedule, pos: usize) -> TransitTime {
        if self.is_forward() {
            trip.arrival(pos)
        } else {
            trip.departure(pos)
        }
    }

    /// Slack reserved before boarding in search time.
    pub fn board_slack(&self, slack: &dyn SlackProvider, mode: TransitMode) -> i32 {
        if self.is_forward() {
            slack.board_slack(mode)
        } else {
            slack.alight_slack(mode)
        }
    }

    /// Slack reserved after alighting in search time.
    pub fn alight_slack(&self, slack: &dyn SlackProvider, mode: TransitMode) -> i32 {
        if self.is_forward() {
            slack.alight_slack(mode)
        } else {
            slack.board_slack(mode)
        }
    }

    /// Transfers leaving `stop` in search time.
    pub fn transfers<'a>(
        &self,
        transit: &'a dyn TransitDataProvider,
        stop: StopIndex,
    ) -> &'a [Transfer] {
        if self.is_forward() {
            transit.transfers_from(stop)
        } else {
            transit.transfers_to(stop)
        }
    }
}

/// Iterator over pattern stop positions in search order.
#[derive(Debug, Clone)]
pub struct StopPositions {
    front: usize,
    back: usize,
    forward: bool,
}

impl Iterator for StopPositions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.front >= self.back {
            return None;
        }
        if self.forward {
            self.front += 1;
            Some(self.front - 1)
        } else {
            self.back -= 1;
            Some(self.back)
        }
    }
}
