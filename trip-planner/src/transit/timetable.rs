//! In-memory transit network.

use std::collections::HashMap;

use crate::domain::{DomainError, PatternIndex, StopIndex, Transfer, TripPattern};

use super::TransitDataProvider;

/// An immutable in-memory network: stops, patterns and walking transfers.
///
/// Per-stop lookups are precomputed, so every provider query is a slice
/// access.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    stop_names: Vec<String>,
    stop_lookup: HashMap<String, StopIndex>,
    patterns: Vec<TripPattern>,
    patterns_by_stop: Vec<Vec<PatternIndex>>,
    transfers_from: Vec<Vec<Transfer>>,
    transfers_to: Vec<Vec<Transfer>>,
}

impl Timetable {
    /// Look up a stop by name.
    pub fn stop_index(&self, name: &str) -> Option<StopIndex> {
        self.stop_lookup.get(name).copied()
    }

    pub fn patterns(&self) -> &[TripPattern] {
        &self.patterns
    }

    /// Total number of trips over all patterns.
    pub fn num_trips(&self) -> usize {
        self.patterns.iter().map(|p| p.trips().len()).sum()
    }
}

impl TransitDataProvider for Timetable {
    fn num_stops(&self) -> usize {
        self.stop_names.len()
    }

    fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn pattern(&self, index: PatternIndex) -> &TripPattern {
        &self.patterns[index.index()]
    }

    fn patterns_at(&self, stop: StopIndex) -> &[PatternIndex] {
        &self.patterns_by_stop[stop.index()]
    }

    fn transfers_from(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers_from[stop.index()]
    }

    fn transfers_to(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers_to[stop.index()]
    }

    fn stop_name(&self, stop: StopIndex) -> Option<&str> {
        self.stop_names.get(stop.index()).map(String::as_str)
    }
}

/// Builder for [`Timetable`].
///
/// # Examples
///
/// ```
/// use trip_planner::domain::{TransitMode, TransitTime, TripPattern, TripSchedule};
/// use trip_planner::transit::{TimetableBuilder, TransitDataProvider};
///
/// let mut builder = TimetableBuilder::new();
/// let a = builder.add_stop("A");
/// let b = builder.add_stop("B");
/// let t = |s: &str| TransitTime::parse(s).unwrap();
/// let trip = TripSchedule::from_times("L1-1", vec![t("10:00"), t("10:10")]).unwrap();
/// builder
///     .add_pattern(TripPattern::new("L1", TransitMode::Bus, vec![a, b], vec![trip]).unwrap())
///     .unwrap();
/// builder.add_transfer(b, a, 120, 24_000).unwrap();
///
/// let timetable = builder.build();
/// assert_eq!(timetable.num_stops(), 2);
/// assert_eq!(timetable.patterns_at(a).len(), 1);
/// assert_eq!(timetable.transfers_to(a)[0].stop(), b);
/// ```
#[derive(Debug, Default)]
pub struct TimetableBuilder {
    stop_names: Vec<String>,
    stop_lookup: HashMap<String, StopIndex>,
    patterns: Vec<TripPattern>,
    transfers: Vec<(StopIndex, Transfer)>,
}

impl TimetableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop, returning its index. Adding an existing name returns the
    /// existing index.
    pub fn add_stop(&mut self, name: impl Into<String>) -> StopIndex {
        let name = name.into();
        if let Some(&index) = self.stop_lookup.get(&name) {
            return index;
        }
        let index = StopIndex::from(self.stop_names.len());
        self.stop_lookup.insert(name.clone(), index);
        self.stop_names.push(name);
        index
    }

    pub fn stop_index(&self, name: &str) -> Option<StopIndex> {
        self.stop_lookup.get(name).copied()
    }

    fn check_stop(&self, stop: StopIndex) -> Result<(), DomainError> {
        if stop.index() < self.stop_names.len() {
            Ok(())
        } else {
            Err(DomainError::UnknownStop(stop))
        }
    }

    /// Add a pattern whose stops have all been added.
    pub fn add_pattern(&mut self, pattern: TripPattern) -> Result<PatternIndex, DomainError> {
        for &stop in pattern.stops() {
            self.check_stop(stop)?;
        }
        let index = PatternIndex::from(self.patterns.len());
        self.patterns.push(pattern);
        Ok(index)
    }

    /// Add a one-way walking transfer.
    pub fn add_transfer(
        &mut self,
        from: StopIndex,
        to: StopIndex,
        duration: i32,
        c1: i32,
    ) -> Result<(), DomainError> {
        self.check_stop(from)?;
        self.check_stop(to)?;
        self.transfers
            .push((from, Transfer::new(to, duration, c1)));
        Ok(())
    }

    /// Add a walking transfer in both directions with the same duration and
    /// cost.
    pub fn add_walk(
        &mut self,
        a: StopIndex,
        b: StopIndex,
        duration: i32,
        c1: i32,
    ) -> Result<(), DomainError> {
        self.add_transfer(a, b, duration, c1)?;
        self.add_transfer(b, a, duration, c1)
    }

    pub fn build(self) -> Timetable {
        let num_stops = self.stop_names.len();

        let mut patterns_by_stop = vec![Vec::new(); num_stops];
        for (i, pattern) in self.patterns.iter().enumerate() {
            for &stop in pattern.stops() {
                let list: &mut Vec<PatternIndex> = &mut patterns_by_stop[stop.index()];
                // Loop patterns visit a stop twice; list them once
                if list.last() != Some(&PatternIndex::from(i)) {
                    list.push(PatternIndex::from(i));
                }
            }
        }

        let mut transfers_from = vec![Vec::new(); num_stops];
        let mut transfers_to = vec![Vec::new(); num_stops];
        for (from, transfer) in self.transfers {
            transfers_from[from.index()].push(transfer);
            transfers_to[transfer.stop().index()].push(Transfer::new(
                from,
                transfer.duration(),
                transfer.c1(),
            ));
        }

        Timetable {
            stop_names: self.stop_names,
            stop_lookup: self.stop_lookup,
            patterns: self.patterns,
            patterns_by_stop,
            transfers_from,
            transfers_to,
        }
    }
}
