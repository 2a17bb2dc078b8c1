//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from search errors.

use super::StopIndex;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Trip times are inconsistent (e.g., departure before arrival)
    #[error("invalid trip {trip}: {reason}")]
    InvalidTrip { trip: String, reason: &'static str },

    /// Trip does not have one time per pattern stop
    #[error("trip {trip} has {actual} stop times, pattern has {expected} stops")]
    TripLengthMismatch {
        trip: String,
        expected: usize,
        actual: usize,
    },

    /// A later trip overtakes an earlier one on the same pattern
    #[error("trips {earlier} and {later} overtake each other on line {line}")]
    OvertakingTrips {
        line: String,
        earlier: String,
        later: String,
    },

    /// Pattern needs at least two stops
    #[error("pattern {0} must have at least two stops")]
    PatternTooShort(String),

    /// Stop index is not known to the transit data
    #[error("unknown stop {0}")]
    UnknownStop(StopIndex),

    /// Opening hours close before they open
    #[error("opening hours close before they open")]
    InvalidOpeningHours,

    /// Transit group id does not fit the group bitset
    #[error("transit group {0} is out of range (0-31)")]
    InvalidTransitGroup(u8),

    /// Path legs do not form a valid itinerary
    #[error("invalid path: {0}")]
    InvalidPath(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidTrip {
            trip: "T1".into(),
            reason: "departure before arrival",
        };
        assert_eq!(err.to_string(), "invalid trip T1: departure before arrival");

        let err = DomainError::TripLengthMismatch {
            trip: "T1".into(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "trip T1 has 2 stop times, pattern has 3 stops"
        );

        let err = DomainError::UnknownStop(StopIndex(9));
        assert_eq!(err.to_string(), "unknown stop #9");

        let err = DomainError::InvalidPath("path must end with egress");
        assert_eq!(err.to_string(), "invalid path: path must end with egress");

        let err = DomainError::InvalidTransitGroup(40);
        assert_eq!(err.to_string(), "transit group 40 is out of range (0-31)");
    }
}
