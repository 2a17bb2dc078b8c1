//! Generalized-cost units.
//!
//! The router compares costs as integers in centi-seconds ("raptor cost"):
//! one second of generalized cost is 100 units. Integer arithmetic keeps
//! dominance checks exact, and two decimals are enough for reluctance factors
//! like 0.8.

/// Number of raptor-cost units in one second of generalized cost.
pub const RAPTOR_COST_PER_SECOND: i32 = 100;

/// Convert seconds of generalized cost to raptor cost, rounding to the
/// nearest unit.
///
/// ```
/// use trip_planner::domain::{from_raptor_cost, to_raptor_cost};
///
/// assert_eq!(to_raptor_cost(81.54), 8154);
/// assert_eq!(to_raptor_cost(from_raptor_cost(815_400)), 815_400);
/// ```
pub fn to_raptor_cost(seconds: f64) -> i32 {
    (seconds * f64::from(RAPTOR_COST_PER_SECOND)).round() as i32
}

/// Convert whole seconds to raptor cost exactly.
pub const fn seconds_to_raptor_cost(seconds: i32) -> i32 {
    seconds * RAPTOR_COST_PER_SECOND
}

/// Convert raptor cost back to seconds of generalized cost.
pub fn from_raptor_cost(cost: i32) -> f64 {
    f64::from(cost) / f64::from(RAPTOR_COST_PER_SECOND)
}

/// Raptor cost rounded to whole seconds, for display.
pub fn raptor_cost_to_seconds(cost: i32) -> i32 {
    from_raptor_cost(cost).round() as i32
}

/// Format a raptor cost in seconds with `_` thousands separators,
/// e.g. `8_154`.
pub fn format_cost(cost: i32) -> String {
    let seconds = raptor_cost_to_seconds(cost);
    let digits = seconds.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if seconds < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(c);
    }
    out
}
