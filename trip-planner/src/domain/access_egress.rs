//! Access and egress legs and walking transfers.
//!
//! These are produced by the street search and consumed as opaque
//! (stop, duration, cost) values; the router never recomputes them.

use serde::{Deserialize, Serialize};

use super::{DomainError, StopIndex, TransitTime};

/// Time window in which an access or egress leg may start.
///
/// Used for flexible or booking-restricted legs. The window is on the
/// service day and does not repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    opens: TransitTime,
    closes: TransitTime,
}

impl OpeningHours {
    /// Create a window; `closes` must not be before `opens`.
    pub fn new(opens: TransitTime, closes: TransitTime) -> Result<Self, DomainError> {
        if closes < opens {
            return Err(DomainError::InvalidOpeningHours);
        }
        Ok(Self { opens, closes })
    }

    pub fn opens(&self) -> TransitTime {
        self.opens
    }

    pub fn closes(&self) -> TransitTime {
        self.closes
    }
}

/// A street leg from the origin to a stop (access) or from a stop to the
/// destination (egress).
///
/// `c1` is the precomputed generalized cost in raptor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEgress {
    stop: StopIndex,
    duration: i32,
    c1: i32,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
}

impl AccessEgress {
    /// Create a leg to/from `stop` taking `duration` seconds.
    pub fn new(stop: StopIndex, duration: i32, c1: i32) -> Self {
        Self {
            stop,
            duration,
            c1,
            opening_hours: None,
        }
    }

    /// Restrict the leg to start inside the given window.
    pub fn with_opening_hours(mut self, opening_hours: OpeningHours) -> Self {
        self.opening_hours = Some(opening_hours);
        self
    }

    pub fn stop(&self) -> StopIndex {
        self.stop
    }

    /// Duration in seconds.
    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn c1(&self) -> i32 {
        self.c1
    }

    pub fn opening_hours(&self) -> Option<OpeningHours> {
        self.opening_hours
    }

    /// Returns true if the leg can start at any time.
    pub fn is_always_open(&self) -> bool {
        self.opening_hours.is_none()
    }

    /// The earliest time at or after `requested` the leg can start.
    ///
    /// Returns `None` if the leg has closed by then.
    ///
    /// ```
    /// use trip_planner::domain::{AccessEgress, OpeningHours, StopIndex, TransitTime};
    ///
    /// let hours = OpeningHours::new(TransitTime::hms(10, 0, 0), TransitTime::hms(11, 0, 0)).unwrap();
    /// let flex = AccessEgress::new(StopIndex(1), 600, 0).with_opening_hours(hours);
    ///
    /// assert_eq!(flex.earliest_departure_time(TransitTime::hms(9, 0, 0)), Some(TransitTime::hms(10, 0, 0)));
    /// assert_eq!(flex.earliest_departure_time(TransitTime::hms(10, 30, 0)), Some(TransitTime::hms(10, 30, 0)));
    /// assert_eq!(flex.earliest_departure_time(TransitTime::hms(11, 30, 0)), None);
    /// ```
    pub fn earliest_departure_time(&self, requested: TransitTime) -> Option<TransitTime> {
        match self.opening_hours {
            None => Some(requested),
            Some(hours) if requested <= hours.opens => Some(hours.opens),
            Some(hours) if requested <= hours.closes => Some(requested),
            Some(_) => None,
        }
    }

    /// The latest time at or before `requested` the leg can arrive.
    ///
    /// Returns `None` if the leg had not opened early enough.
    pub fn latest_arrival_time(&self, requested: TransitTime) -> Option<TransitTime> {
        let departure = requested.minus(self.duration);
        let departure = match self.opening_hours {
            None => departure,
            Some(hours) if departure >= hours.closes => hours.closes,
            Some(hours) if departure >= hours.opens => departure,
            Some(_) => return None,
        };
        Some(departure.plus(self.duration))
    }
}

/// A walking transfer between two stops.
///
/// In a stop's outgoing list `stop` is the target; in its incoming list it
/// is the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    stop: StopIndex,
    duration: i32,
    c1: i32,
}

impl Transfer {
    pub fn new(stop: StopIndex, duration: i32, c1: i32) -> Self {
        Self { stop, duration, c1 }
    }

    /// The stop at the other end of the transfer.
    pub fn stop(&self) -> StopIndex {
        self.stop
    }

    /// Duration in seconds.
    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn c1(&self) -> i32 {
        self.c1
    }
}
