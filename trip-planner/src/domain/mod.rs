//! Domain types for the trip planner.
//!
//! This module contains the value types shared by the transit data, the
//! search engine and its consumers. Types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod access_egress;
mod cost;
mod error;
mod mode;
mod path;
mod pattern;
mod stop;
mod time;

pub use access_egress::{AccessEgress, OpeningHours, Transfer};
pub use cost::{
    RAPTOR_COST_PER_SECOND, format_cost, from_raptor_cost, raptor_cost_to_seconds,
    seconds_to_raptor_cost, to_raptor_cost,
};
pub use error::DomainError;
pub use mode::TransitMode;
pub use path::{AccessLeg, EgressLeg, Path, PathLeg, TransferLeg, TransitLeg};
pub use pattern::{MAX_TRANSIT_GROUP, PatternIndex, TripPattern, TripSchedule};
pub use stop::StopIndex;
pub use time::{TimeError, TransitTime, format_duration};
