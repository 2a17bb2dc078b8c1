//! Transit data consumed by the router.
//!
//! The router only sees transit data through [`TransitDataProvider`] and
//! slack through [`SlackProvider`]. [`Timetable`] is the in-memory
//! implementation, built with [`TimetableBuilder`] or loaded from a JSON
//! network file.

mod network;
mod slack;
mod timetable;

pub use network::{NetworkFile, NetworkFileError, load_network};
pub use slack::{SlackConfig, SlackProvider};
pub use timetable::{Timetable, TimetableBuilder};

use crate::domain::{PatternIndex, StopIndex, Transfer, TripPattern};

/// Read-only transit network.
///
/// Implementations are shared between concurrent searches, so they must be
/// `Send + Sync` and must not change while a search runs.
pub trait TransitDataProvider: Send + Sync {
    /// Number of stops; valid stop indices are `0..num_stops()`.
    fn num_stops(&self) -> usize;

    /// Number of patterns; valid pattern indices are `0..num_patterns()`.
    fn num_patterns(&self) -> usize;

    fn pattern(&self, index: PatternIndex) -> &TripPattern;

    /// Patterns calling at `stop`.
    fn patterns_at(&self, stop: StopIndex) -> &[PatternIndex];

    /// Walking transfers leaving `stop`; `Transfer::stop` is the target.
    fn transfers_from(&self, stop: StopIndex) -> &[Transfer];

    /// Walking transfers arriving at `stop`; `Transfer::stop` is the source.
    fn transfers_to(&self, stop: StopIndex) -> &[Transfer];

    /// Human-readable stop name, if known.
    fn stop_name(&self, _stop: StopIndex) -> Option<&str> {
        None
    }
}
