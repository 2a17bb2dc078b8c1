//! Path types.
//!
//! A `Path` is a complete itinerary from origin to destination: an access
//! leg, one or more transit legs possibly separated by walking transfers,
//! and an egress leg. Paths are built once per surviving destination
//! arrival, after the search has finished.

use std::fmt::{self, Write as _};

use serde::Serialize;

use super::{
    DomainError, PatternIndex, StopIndex, TransitMode, TransitTime, format_cost, format_duration,
};

/// Street leg from the origin to the first boarding stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLeg {
    pub stop: StopIndex,
    pub departure: TransitTime,
    pub arrival: TransitTime,
    pub c1: i32,
}

/// A ride on one trip.
///
/// Times are the trip's scheduled departure and arrival, without slack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitLeg {
    pub pattern: PatternIndex,
    pub trip: usize,
    pub trip_id: String,
    pub line: String,
    pub mode: TransitMode,
    pub board_stop: StopIndex,
    pub board_pos: usize,
    pub alight_stop: StopIndex,
    pub alight_pos: usize,
    pub departure: TransitTime,
    pub arrival: TransitTime,
    pub c1: i32,
}

/// A walk between two stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferLeg {
    pub from_stop: StopIndex,
    pub to_stop: StopIndex,
    pub departure: TransitTime,
    pub arrival: TransitTime,
    pub c1: i32,
}

/// Street leg from the last alighting stop to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EgressLeg {
    pub stop: StopIndex,
    pub departure: TransitTime,
    pub arrival: TransitTime,
    pub c1: i32,
}

/// One leg of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathLeg {
    Access(AccessLeg),
    Transit(TransitLeg),
    Transfer(TransferLeg),
    Egress(EgressLeg),
}

impl PathLeg {
    pub fn departure(&self) -> TransitTime {
        match self {
            PathLeg::Access(leg) => leg.departure,
            PathLeg::Transit(leg) => leg.departure,
            PathLeg::Transfer(leg) => leg.departure,
            PathLeg::Egress(leg) => leg.departure,
        }
    }

    pub fn arrival(&self) -> TransitTime {
        match self {
            PathLeg::Access(leg) => leg.arrival,
            PathLeg::Transit(leg) => leg.arrival,
            PathLeg::Transfer(leg) => leg.arrival,
            PathLeg::Egress(leg) => leg.arrival,
        }
    }

    /// Leg duration in seconds.
    pub fn duration(&self) -> i32 {
        self.arrival().seconds_since(self.departure())
    }

    pub fn c1(&self) -> i32 {
        match self {
            PathLeg::Access(leg) => leg.c1,
            PathLeg::Transit(leg) => leg.c1,
            PathLeg::Transfer(leg) => leg.c1,
            PathLeg::Egress(leg) => leg.c1,
        }
    }

    /// Stop the leg starts at; `None` for access.
    pub fn from_stop(&self) -> Option<StopIndex> {
        match self {
            PathLeg::Access(_) => None,
            PathLeg::Transit(leg) => Some(leg.board_stop),
            PathLeg::Transfer(leg) => Some(leg.from_stop),
            PathLeg::Egress(leg) => Some(leg.stop),
        }
    }

    /// Stop the leg ends at; `None` for egress.
    pub fn to_stop(&self) -> Option<StopIndex> {
        match self {
            PathLeg::Access(leg) => Some(leg.stop),
            PathLeg::Transit(leg) => Some(leg.alight_stop),
            PathLeg::Transfer(leg) => Some(leg.to_stop),
            PathLeg::Egress(_) => None,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, PathLeg::Transit(_))
    }

    fn describe(&self, out: &mut String, stop_name: &dyn Fn(StopIndex) -> String) {
        // Writing to a String cannot fail
        let _ = match self {
            PathLeg::Access(leg) => write!(
                out,
                "Walk {} ~ {}",
                format_duration(self.duration()),
                stop_name(leg.stop)
            ),
            PathLeg::Transit(leg) => write!(
                out,
                "{} {} {} {} ~ {}",
                leg.mode,
                leg.line,
                leg.departure,
                leg.arrival,
                stop_name(leg.alight_stop)
            ),
            PathLeg::Transfer(leg) => write!(
                out,
                "Walk {} ~ {}",
                format_duration(self.duration()),
                stop_name(leg.to_stop)
            ),
            PathLeg::Egress(_) => write!(out, "Walk {}", format_duration(self.duration())),
        };
    }
}

/// A complete itinerary.
///
/// # Invariants
///
/// - Starts with an access leg and ends with an egress leg
/// - Contains at least one transit leg; no access/egress in between
/// - Consecutive legs connect at the same stop and do not overlap in time
/// - `c1` is the sum of the leg costs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    legs: Vec<PathLeg>,
    c1: i32,
    c2: Option<u32>,
}

impl Path {
    /// Build a path from its legs, validating the invariants.
    pub fn new(legs: Vec<PathLeg>, c2: Option<u32>) -> Result<Self, DomainError> {
        let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
            return Err(DomainError::InvalidPath("path has no legs"));
        };
        if !matches!(first, PathLeg::Access(_)) {
            return Err(DomainError::InvalidPath("path must start with access"));
        }
        if !matches!(last, PathLeg::Egress(_)) {
            return Err(DomainError::InvalidPath("path must end with egress"));
        }
        let inner = &legs[1..legs.len() - 1];
        if inner
            .iter()
            .any(|leg| matches!(leg, PathLeg::Access(_) | PathLeg::Egress(_)))
        {
            return Err(DomainError::InvalidPath(
                "access and egress may only be at the ends",
            ));
        }
        if !inner.iter().any(PathLeg::is_transit) {
            return Err(DomainError::InvalidPath("path has no transit leg"));
        }
        if legs.iter().any(|leg| leg.arrival() < leg.departure()) {
            return Err(DomainError::InvalidPath("leg arrives before it departs"));
        }
        for pair in legs.windows(2) {
            if pair[0].to_stop() != pair[1].from_stop() {
                return Err(DomainError::InvalidPath("legs do not connect"));
            }
            if pair[1].departure() < pair[0].arrival() {
                return Err(DomainError::InvalidPath("legs overlap in time"));
            }
        }

        let c1 = legs.iter().map(PathLeg::c1).sum();
        Ok(Self { legs, c1, c2 })
    }

    pub fn legs(&self) -> &[PathLeg] {
        &self.legs
    }

    /// The transit legs in travel order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(|leg| match leg {
            PathLeg::Transit(transit) => Some(transit),
            _ => None,
        })
    }

    /// Departure from the origin.
    pub fn start_time(&self) -> TransitTime {
        self.legs[0].departure()
    }

    /// Arrival at the destination.
    pub fn end_time(&self) -> TransitTime {
        self.legs[self.legs.len() - 1].arrival()
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> i32 {
        self.end_time().seconds_since(self.start_time())
    }

    /// Number of transfers (transit legs minus one).
    pub fn number_of_transfers(&self) -> usize {
        self.transit_legs().count().saturating_sub(1)
    }

    /// Generalized cost in raptor units.
    pub fn c1(&self) -> i32 {
        self.c1
    }

    /// Second cost dimension, if the search used one.
    pub fn c2(&self) -> Option<u32> {
        self.c2
    }

    /// Describe the path, naming stops with `stop_name`.
    ///
    /// ```text
    /// Walk 3m ~ A ~ BUS L11 10:04 10:35 ~ B ~ Walk 7m45s [10:00:15 10:43 42m45s Tx0 C1 1_234]
    /// ```
    pub fn to_string_with(&self, stop_name: impl Fn(StopIndex) -> String) -> String {
        let mut out = String::new();
        for (i, leg) in self.legs.iter().enumerate() {
            if i > 0 {
                out.push_str(" ~ ");
            }
            leg.describe(&mut out, &stop_name);
        }
        let _ = write!(
            out,
            " [{} {} {} Tx{} C1 {}",
            self.start_time(),
            self.end_time(),
            format_duration(self.duration()),
            self.number_of_transfers(),
            format_cost(self.c1)
        );
        if let Some(c2) = self.c2 {
            let _ = write!(out, " C2 {c2}");
        }
        out.push(']');
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(|stop| stop.to_string()))
    }
}
