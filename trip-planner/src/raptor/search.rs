//! Range-Raptor search entry point.
//!
//! A [`Planner`] validates a [`SearchRequest`], runs one
//! [`RangeRaptorWorker`](super::worker::RangeRaptorWorker) over the search
//! window, maps the surviving destination arrivals into paths and ranks
//! them.

use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use crate::domain::{AccessEgress, Path, StopIndex, TransitTime};
use crate::transit::{SlackProvider, TransitDataProvider};

use super::path_mapper::PathMapper;
use super::rank::{deduplicate, rank_paths};
use super::worker::{RangeRaptorWorker, SearchStats, WorkerParams};
use super::{
    C2Policy, CostCalculator, CostConfig, MAX_PASS_THROUGH_POINTS, MAX_SEARCH_WINDOW_MINS,
    PassThroughPoints, SearchConfig, TimeCalculator,
};

/// Error from a search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// The search ran out of time
    #[error("search timed out after {elapsed:?}")]
    Timeout { elapsed: std::time::Duration },
}

/// Request for a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Earliest departure for a forward search, latest arrival for a
    /// reverse one.
    pub time: TransitTime,

    /// Street legs from the origin to the first stop.
    pub access: Vec<AccessEgress>,

    /// Street legs from the last stop to the destination.
    pub egress: Vec<AccessEgress>,

    pub config: SearchConfig,

    pub costs: CostConfig,

    /// Second criterion. Pass-through points are given in travel order,
    /// whatever the search direction.
    pub c2: C2Policy,
}

impl SearchRequest {
    /// Create a request with default configuration and no c2.
    pub fn new(time: TransitTime, access: Vec<AccessEgress>, egress: Vec<AccessEgress>) -> Self {
        Self {
            time,
            access,
            egress,
            config: SearchConfig::default(),
            costs: CostConfig::default(),
            c2: C2Policy::None,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_costs(mut self, costs: CostConfig) -> Self {
        self.costs = costs;
        self
    }

    /// Require every path to visit each group of stops, in order.
    pub fn with_pass_through(mut self, points: Vec<Vec<StopIndex>>) -> Self {
        self.c2 = C2Policy::PassThrough(PassThroughPoints::new(points));
        self
    }

    /// Keep paths that ride fewer transit groups, even if slower or dearer.
    pub fn with_transit_group_priority(mut self) -> Self {
        self.c2 = C2Policy::TransitGroupPriority;
        self
    }

    /// Validate the request against a network with `num_stops` stops.
    pub fn validate(&self, num_stops: usize) -> Result<(), SearchError> {
        if !(1..=MAX_SEARCH_WINDOW_MINS).contains(&self.config.search_window_mins) {
            return Err(SearchError::InvalidRequest(format!(
                "search window must be between 1 and {MAX_SEARCH_WINDOW_MINS} minutes"
            )));
        }
        let step = self.config.iteration_step();
        if step <= chrono::Duration::zero() || step > self.config.search_window() {
            return Err(SearchError::InvalidRequest(
                "iteration step must be positive and no wider than the search window".to_string(),
            ));
        }

        let unknown = |stop: StopIndex| stop.index() >= num_stops;
        for leg in self.access.iter().chain(&self.egress) {
            if unknown(leg.stop()) {
                return Err(SearchError::InvalidRequest(format!(
                    "unknown stop {}",
                    leg.stop()
                )));
            }
            if leg.duration() < 0 || leg.c1() < 0 {
                return Err(SearchError::InvalidRequest(format!(
                    "negative duration or cost on street leg to {}",
                    leg.stop()
                )));
            }
        }

        if let C2Policy::PassThrough(points) = &self.c2 {
            if points.is_empty() {
                return Err(SearchError::InvalidRequest(
                    "no pass-through points given".to_string(),
                ));
            }
            if points.len() > MAX_PASS_THROUGH_POINTS {
                return Err(SearchError::InvalidRequest(format!(
                    "at most {MAX_PASS_THROUGH_POINTS} pass-through points are supported, got {}",
                    points.len()
                )));
            }
            for group in points.points() {
                if group.is_empty() {
                    return Err(SearchError::InvalidRequest(
                        "pass-through point has no stops".to_string(),
                    ));
                }
                if let Some(&stop) = group.iter().find(|&&stop| unknown(stop)) {
                    return Err(SearchError::InvalidRequest(format!("unknown stop {stop}")));
                }
            }
        }

        Ok(())
    }

    /// Iteration start times, in the order the worker runs them.
    ///
    /// A forward search starts from the end of the window and works back to
    /// the request time; a reverse search starts from the beginning of the
    /// window and works forward to it.
    pub fn iteration_times(&self) -> Vec<TransitTime> {
        let calculator = TimeCalculator::new(self.config.direction);
        let step = self.config.iteration_step_secs.max(1);
        let count = i32::try_from(self.config.search_window().num_seconds() / i64::from(step))
            .unwrap_or(i32::MAX)
            .max(1);
        (0..count)
            .rev()
            .map(|i| calculator.plus(self.time, i * step))
            .collect()
    }
}

/// Why a search found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoResultReason {
    /// No access or egress leg could be used.
    NoAccessOrEgress,
    /// No trip could be boarded from the access stops.
    NoTransitConnection,
    /// Trips were boarded but none reached the destination in time.
    NoneWithinSearchWindow,
}

impl fmt::Display for NoResultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoResultReason::NoAccessOrEgress => "no access or egress",
            NoResultReason::NoTransitConnection => "no transit connection",
            NoResultReason::NoneWithinSearchWindow => "no result within the search window",
        };
        f.write_str(text)
    }
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Found paths, ranked best-first.
    pub paths: Vec<Path>,

    /// Set when `paths` is empty.
    pub no_result: Option<NoResultReason>,

    pub stats: SearchStats,
}

impl SearchResult {
    /// A result with no paths.
    pub fn empty(reason: NoResultReason) -> Self {
        Self {
            paths: Vec::new(),
            no_result: Some(reason),
            stats: SearchStats::default(),
        }
    }
}

/// Multi-criteria Range-Raptor planner over one network.
pub struct Planner<'a, P: TransitDataProvider> {
    transit: &'a P,
    slack: &'a dyn SlackProvider,
}

impl<'a, P: TransitDataProvider> Planner<'a, P> {
    pub fn new(transit: &'a P, slack: &'a dyn SlackProvider) -> Self {
        Self { transit, slack }
    }

    /// Search for Pareto-optimal paths.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        request.validate(self.transit.num_stops())?;

        if request.access.is_empty() || request.egress.is_empty() {
            debug!("request has no access or egress legs");
            return Ok(SearchResult::empty(NoResultReason::NoAccessOrEgress));
        }

        let config = &request.config;
        let direction = config.direction;
        let calculator = TimeCalculator::new(direction);
        let costs = CostCalculator::new(&request.costs);
        let c2 = match &request.c2 {
            C2Policy::PassThrough(points) => C2Policy::PassThrough(points.for_direction(direction)),
            other => other.clone(),
        };
        let (access, egress) = if direction.is_forward() {
            (&request.access, &request.egress)
        } else {
            (&request.egress, &request.access)
        };

        let worker = RangeRaptorWorker::new(WorkerParams {
            transit: self.transit,
            slack: self.slack,
            config,
            calculator,
            costs: &costs,
            c2: &c2,
            access,
            egress,
            deadline: started + config.timeout(),
        });
        let output = worker.route(&request.iteration_times())?;

        let mapper = PathMapper::new(self.transit, self.slack, &costs, direction, c2.is_enabled());
        let paths: Vec<Path> = output
            .destination
            .iter()
            .map(|arrival| mapper.map(&output.arena, arrival))
            .collect();
        let mut paths = deduplicate(rank_paths(paths));
        paths.truncate(config.max_results);

        let stats = output.stats;
        let no_result = if !paths.is_empty() {
            None
        } else if stats.access_arrivals == 0 {
            Some(NoResultReason::NoAccessOrEgress)
        } else if stats.boardings == 0 {
            Some(NoResultReason::NoTransitConnection)
        } else {
            Some(NoResultReason::NoneWithinSearchWindow)
        };

        info!(
            ?direction,
            time = %request.time,
            paths = paths.len(),
            iterations = stats.iterations,
            rounds = stats.rounds,
            arrivals = output.arena.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );

        Ok(SearchResult {
            paths,
            no_result,
            stats,
        })
    }
}
