//! A five-stop network used by the router tests.
//!
//! ```text
//!  origin ~ A --L11--> B ~walk~ C --L21--> D --L31--> E ~ destination
//! ```
//!
//! The best itinerary leaves the origin at 10:00:15 and arrives at 12:00.

use crate::domain::{
    AccessEgress, Path, StopIndex, TransitMode, TransitTime, TripPattern, TripSchedule,
};
use crate::transit::{SlackConfig, Timetable, TimetableBuilder, TransitDataProvider};

use super::CostConfig;

pub const EXPECTED_PATH: &str = "Walk 3m ~ A ~ BUS L11 10:04 10:35 ~ B ~ Walk 3m45s ~ C ~ \
     BUS L21 11:00 11:23 ~ D ~ BUS L31 11:40 11:52 ~ E ~ Walk 7m45s \
     [10:00:15 12:00 1h59m45s Tx2 C1 8_154]";

pub fn t(s: &str) -> TransitTime {
    TransitTime::parse(s).unwrap()
}

/// Builder holding the five stops, the three lines and the B-C walk.
///
/// Lines get pattern indices 0, 1 and 2 in the order L11, L21, L31.
pub fn builder() -> TimetableBuilder {
    let mut builder = TimetableBuilder::new();
    for name in ["A", "B", "C", "D", "E"] {
        builder.add_stop(name);
    }
    add_line(&mut builder, "L11", &["A", "B"], &["10:04", "10:35"]);
    add_line(&mut builder, "L21", &["C", "D"], &["11:00", "11:23"]);
    add_line(&mut builder, "L31", &["D", "E"], &["11:40", "11:52"]);
    let (b, c) = (stop(&builder, "B"), stop(&builder, "C"));
    builder.add_transfer(b, c, 225, 45_000).unwrap();
    builder
}

pub fn stop(builder: &TimetableBuilder, name: &str) -> StopIndex {
    builder.stop_index(name).unwrap()
}

/// Add a bus line with a single trip.
pub fn add_line(builder: &mut TimetableBuilder, line: &str, stops: &[&str], times: &[&str]) {
    let pattern = bus_line(builder, line, stops, times);
    builder.add_pattern(pattern).unwrap();
}

pub fn bus_line(
    builder: &TimetableBuilder,
    line: &str,
    stops: &[&str],
    times: &[&str],
) -> TripPattern {
    let stops = stops.iter().map(|name| stop(builder, name)).collect();
    let trip =
        TripSchedule::from_times(format!("{line}-1"), times.iter().map(|s| t(s)).collect()).unwrap();
    TripPattern::new(line, TransitMode::Bus, stops, vec![trip]).unwrap()
}

/// Walk 3 minutes to `stop`; walking costs twice its time.
pub fn access(stop: StopIndex) -> AccessEgress {
    AccessEgress::new(stop, 180, 36_000)
}

/// Walk 7m45s from `stop`.
pub fn egress(stop: StopIndex) -> AccessEgress {
    AccessEgress::new(stop, 465, 93_000)
}

pub fn slack() -> SlackConfig {
    SlackConfig::new(45, 15, 60)
}

pub fn costs(timetable: &Timetable) -> CostConfig {
    CostConfig {
        board_cost: 60,
        transfer_cost: 120,
        wait_reluctance: 0.8,
        transit_reluctance: 1.0,
        ..CostConfig::default()
    }
    .with_stop_cost(timetable.stop_index("B").unwrap(), 3_000)
    .with_stop_cost(timetable.stop_index("D").unwrap(), 6_000)
}

/// Describe `path` with stop names.
pub fn describe(timetable: &Timetable, path: &Path) -> String {
    path.to_string_with(|stop| timetable.stop_name(stop).unwrap_or("?").to_string())
}
