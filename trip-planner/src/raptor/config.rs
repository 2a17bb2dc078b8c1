//! Search and cost configuration for the router.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Deserialize;

use crate::domain::{StopIndex, TransitMode};

/// Direction of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDirection {
    /// Depart after the request time, iterating departures latest first.
    #[default]
    Forward,
    /// Arrive by the request time, searching backwards in time.
    Reverse,
}

impl SearchDirection {
    pub fn is_forward(self) -> bool {
        self == SearchDirection::Forward
    }
}

/// Widest accepted search window: two service days.
pub const MAX_SEARCH_WINDOW_MINS: i64 = 48 * 60;

/// Configuration parameters for a search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Width of the departure (or arrival) window (minutes).
    pub search_window_mins: i64,

    /// Distance between two Range-Raptor iterations (seconds).
    pub iteration_step_secs: i32,

    /// Maximum number of transfers; the search runs one more round than this.
    pub max_transfers: usize,

    /// Maximum number of paths to return.
    pub max_results: usize,

    pub direction: SearchDirection,

    /// Time budget for one search (milliseconds).
    pub timeout_ms: u64,

    /// Keep destination arrivals that only win on number of transfers.
    pub transfers_as_destination_criterion: bool,

    /// Log Pareto-set events at the destination.
    pub debug: bool,
}

impl SearchConfig {
    /// Returns the search window as a Duration.
    ///
    /// Windows longer than [`MAX_SEARCH_WINDOW_MINS`] are clamped; requests
    /// carrying one fail validation.
    pub fn search_window(&self) -> Duration {
        Duration::minutes(self.search_window_mins.clamp(0, MAX_SEARCH_WINDOW_MINS))
    }

    /// Returns the iteration step as a Duration.
    pub fn iteration_step(&self) -> Duration {
        Duration::seconds(i64::from(self.iteration_step_secs))
    }

    /// Returns the time budget.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// Number of rounds the search runs.
    pub fn max_rounds(&self) -> usize {
        self.max_transfers + 1
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_window_mins: 60,
            iteration_step_secs: 60,
            max_transfers: 12,
            max_results: 50,
            direction: SearchDirection::Forward,
            timeout_ms: 5_000,
            transfers_as_destination_criterion: false,
            debug: false,
        }
    }
}

/// Generalized-cost parameters.
///
/// Costs are in seconds of generalized cost; reluctances are multipliers on
/// time. `stop_costs` is already in raptor units and indexed by stop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Cost of every boarding (seconds).
    pub board_cost: i32,

    /// Extra cost of every boarding after the first (seconds).
    pub transfer_cost: i32,

    /// Multiplier on waiting time, including slack.
    pub wait_reluctance: f64,

    /// Default multiplier on in-vehicle time.
    pub transit_reluctance: f64,

    /// Per-mode in-vehicle multipliers.
    pub transit_reluctance_for_mode: BTreeMap<TransitMode, f64>,

    /// Cost of boarding or alighting at a stop (raptor units).
    pub stop_costs: Vec<i32>,
}

impl CostConfig {
    pub fn transit_reluctance(&self, mode: TransitMode) -> f64 {
        self.transit_reluctance_for_mode
            .get(&mode)
            .copied()
            .unwrap_or(self.transit_reluctance)
    }

    /// Set the cost of boarding or alighting at `stop`.
    pub fn with_stop_cost(mut self, stop: StopIndex, cost: i32) -> Self {
        if self.stop_costs.len() <= stop.index() {
            self.stop_costs.resize(stop.index() + 1, 0);
        }
        self.stop_costs[stop.index()] = cost;
        self
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            board_cost: 60,
            transfer_cost: 0,
            wait_reluctance: 1.0,
            transit_reluctance: 1.0,
            transit_reluctance_for_mode: BTreeMap::new(),
            stop_costs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.search_window_mins, 60);
        assert_eq!(config.iteration_step_secs, 60);
        assert_eq!(config.max_transfers, 12);
        assert_eq!(config.max_rounds(), 13);
        assert_eq!(config.direction, SearchDirection::Forward);
        assert!(!config.transfers_as_destination_criterion);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::default();

        assert_eq!(config.search_window(), Duration::minutes(60));
        assert_eq!(config.iteration_step(), Duration::seconds(60));
        assert_eq!(config.timeout(), std::time::Duration::from_secs(5));
    }

    #[test]
    fn huge_window_is_clamped() {
        let config = SearchConfig {
            search_window_mins: i64::MAX,
            ..SearchConfig::default()
        };
        assert_eq!(config.search_window(), Duration::hours(48));
    }

    #[test]
    fn deserialize_partial_config() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"direction": "reverse", "max_transfers": 2}"#).unwrap();
        assert_eq!(config.direction, SearchDirection::Reverse);
        assert_eq!(config.max_rounds(), 3);
        assert_eq!(config.search_window_mins, 60);
    }

    #[test]
    fn mode_reluctance_overrides_default() {
        let mut cost = CostConfig::default();
        cost.transit_reluctance_for_mode.insert(TransitMode::Rail, 0.9);

        assert_eq!(cost.transit_reluctance(TransitMode::Rail), 0.9);
        assert_eq!(cost.transit_reluctance(TransitMode::Bus), 1.0);
    }

    #[test]
    fn stop_costs_grow_on_demand() {
        let cost = CostConfig::default()
            .with_stop_cost(StopIndex(3), 6000)
            .with_stop_cost(StopIndex(1), 3000);
        assert_eq!(cost.stop_costs, vec![0, 3000, 0, 6000]);
    }
}
