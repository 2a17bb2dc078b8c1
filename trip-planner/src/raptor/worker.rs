//! The Range-Raptor worker.
//!
//! One worker runs one request. It iterates the search window from the
//! latest iteration time to the earliest (in search time) and runs the
//! round loop once per iteration. Stop arrivals are kept between
//! iterations: an arrival found from a later departure still prunes
//! arrivals found from earlier ones, which is what makes the range search
//! cheap.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};

use crate::domain::{AccessEgress, PatternIndex, StopIndex, TransitTime};
use crate::transit::{SlackProvider, TransitDataProvider};

use super::arrival::{ArrivalArena, street_leg_times};
use super::destination::{
    DestinationArrival, DestinationArrivals, DestinationComparator, destination_arrivals,
};
use super::state::{StopArrivalComparator, StopArrivals, StopEntry};
use super::strategy::{PatternRides, RideComparator, RoutingStrategy, ScanState};
use super::{C2Policy, CostCalculator, ParetoSet, SearchConfig, SearchError, TimeCalculator};

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Range-Raptor iterations run.
    pub iterations: usize,
    /// Rounds run over all iterations.
    pub rounds: usize,
    /// Rides started (trips boarded).
    pub boardings: usize,
    /// Stop arrivals accepted.
    pub accepted_arrivals: usize,
    /// Stop arrivals rejected as dominated.
    pub rejected_arrivals: usize,
    /// Access arrivals created.
    pub access_arrivals: usize,
    /// Destination arrivals offered.
    pub destination_arrivals: usize,
}

/// What a finished worker hands to the path mappers.
pub struct WorkerOutput {
    pub arena: ArrivalArena,
    pub destination: Vec<DestinationArrival>,
    pub stats: SearchStats,
}

/// Inputs for one worker, with access and egress already in search terms.
pub struct WorkerParams<'a> {
    pub transit: &'a dyn TransitDataProvider,
    pub slack: &'a dyn SlackProvider,
    pub config: &'a SearchConfig,
    pub calculator: TimeCalculator,
    pub costs: &'a CostCalculator,
    pub c2: &'a C2Policy,
    pub access: &'a [AccessEgress],
    pub egress: &'a [AccessEgress],
    pub deadline: Instant,
}

pub struct RangeRaptorWorker<'a> {
    strategy: RoutingStrategy<'a>,
    config: &'a SearchConfig,
    access: &'a [AccessEgress],
    egress_by_stop: HashMap<StopIndex, Vec<AccessEgress>>,
    deadline: Instant,
    started: Instant,
    arena: ArrivalArena,
    stops: StopArrivals,
    destination: DestinationArrivals,
    rides: PatternRides,
    candidates: Vec<Vec<StopEntry>>,
    candidate_stops: Vec<StopIndex>,
    pattern_seen: Vec<bool>,
    stats: SearchStats,
}

impl<'a> RangeRaptorWorker<'a> {
    pub fn new(params: WorkerParams<'a>) -> Self {
        let num_stops = params.transit.num_stops();
        let c2 = params.c2.clone();

        let mut egress_by_stop: HashMap<StopIndex, Vec<AccessEgress>> = HashMap::new();
        for egress in params.egress {
            egress_by_stop.entry(egress.stop()).or_default().push(*egress);
        }

        Self {
            strategy: RoutingStrategy {
                transit: params.transit,
                slack: params.slack,
                calculator: params.calculator,
                costs: params.costs,
                c2: params.c2,
            },
            config: params.config,
            access: params.access,
            egress_by_stop,
            deadline: params.deadline,
            started: Instant::now(),
            arena: ArrivalArena::new(),
            stops: StopArrivals::new(
                num_stops,
                StopArrivalComparator::new(params.calculator, c2.clone()),
            ),
            destination: destination_arrivals(
                DestinationComparator::new(
                    params.calculator,
                    c2.clone(),
                    params.config.transfers_as_destination_criterion,
                ),
                params.config.debug,
            ),
            rides: ParetoSet::new(RideComparator::new(params.calculator, c2)),
            candidates: vec![Vec::new(); num_stops],
            candidate_stops: Vec::new(),
            pattern_seen: vec![false; params.transit.num_patterns()],
            stats: SearchStats::default(),
        }
    }

    /// Run every iteration, latest first in search time.
    pub fn route(mut self, iterations: &[TransitTime]) -> Result<WorkerOutput, SearchError> {
        for &time in iterations {
            self.check_deadline()?;
            self.run_iteration(time)?;
        }
        Ok(WorkerOutput {
            arena: self.arena,
            destination: self.destination.iter().copied().collect(),
            stats: self.stats,
        })
    }

    fn check_deadline(&self) -> Result<(), SearchError> {
        if Instant::now() >= self.deadline {
            return Err(SearchError::Timeout {
                elapsed: self.started.elapsed(),
            });
        }
        Ok(())
    }

    fn run_iteration(&mut self, time: TransitTime) -> Result<(), SearchError> {
        debug!(%time, "range raptor iteration");
        self.stats.iterations += 1;
        self.stops.mark_all();

        let calculator = self.strategy.calculator;
        for &access in self.access {
            let c2 = self.strategy.c2.access(access.stop());
            let Some(id) = self.arena.access_arrival(calculator, time, access, c2) else {
                continue;
            };
            self.stats.access_arrivals += 1;
            let entry = StopEntry::new(id, self.arena.get(id));
            if self.stops.offer(access.stop(), entry) {
                self.stats.accepted_arrivals += 1;
            } else {
                self.stats.rejected_arrivals += 1;
            }
        }

        for round in 1..=self.config.max_rounds() {
            self.check_deadline()?;
            if !self.run_round(round) {
                break;
            }
        }
        Ok(())
    }

    /// Run one round. Returns `false` if no stop was reached in the previous
    /// round, so there is nothing to do.
    fn run_round(&mut self, round: usize) -> bool {
        let touched = self.stops.take_touched();
        if touched.is_empty() {
            return false;
        }
        trace!(round, stops = touched.len(), "round");
        self.stats.rounds += 1;

        // Snapshot the boarding candidates before anything changes
        for stop in self.candidate_stops.drain(..) {
            self.candidates[stop.index()].clear();
        }
        for &stop in &touched {
            self.candidates[stop.index()].extend_from_slice(self.stops.new_arrivals(stop));
        }
        self.candidate_stops = touched;
        self.stops.mark_all();

        let patterns = self.patterns_to_scan();
        {
            let mut state = ScanState {
                arena: &mut self.arena,
                stops: &mut self.stops,
                rides: &mut self.rides,
                stats: &mut self.stats,
            };
            for pattern in patterns {
                self.strategy
                    .scan_pattern(pattern, &self.candidates, &mut state);
            }
        }

        // Transfers and egress start from the transit arrivals that survived
        // the whole transit phase
        let transit_stops = self.stops.take_touched();
        let transit_arrivals: Vec<StopEntry> = transit_stops
            .iter()
            .flat_map(|&stop| self.stops.new_arrivals(stop).iter().copied())
            .filter(|entry| entry.on_board)
            .collect();
        for &stop in &transit_stops {
            self.stops.touch(stop);
        }

        self.strategy.transfers(
            &transit_arrivals,
            &mut self.arena,
            &mut self.stops,
            &mut self.stats,
        );
        self.offer_destination(&transit_arrivals);
        true
    }

    /// Patterns serving a stop reached in the previous round, in index order.
    fn patterns_to_scan(&mut self) -> Vec<PatternIndex> {
        let mut patterns = Vec::new();
        for &stop in &self.candidate_stops {
            for &pattern in self.strategy.transit.patterns_at(stop) {
                if !self.pattern_seen[pattern.index()] {
                    self.pattern_seen[pattern.index()] = true;
                    patterns.push(pattern);
                }
            }
        }
        for pattern in &patterns {
            self.pattern_seen[pattern.index()] = false;
        }
        patterns.sort_unstable();
        patterns
    }

    fn offer_destination(&mut self, arrivals: &[StopEntry]) {
        let calculator = self.strategy.calculator;
        for entry in arrivals {
            let stop = self.arena.get(entry.id).stop;
            let Some(egress_legs) = self.egress_by_stop.get(&stop) else {
                continue;
            };
            for &egress in egress_legs {
                if !self.strategy.c2.accepts_at_destination(entry.c2) {
                    continue;
                }
                let Some((departure_time, arrival_time)) =
                    street_leg_times(calculator, entry.time, egress)
                else {
                    continue;
                };
                let wait = calculator.duration_between(entry.time, departure_time);
                let arrival = DestinationArrival {
                    egress,
                    previous: entry.id,
                    departure_time,
                    arrival_time,
                    pareto_round: entry.round + 1,
                    c1: entry.c1 + egress.c1() + self.strategy.costs.wait_cost(wait),
                    c2: entry.c2,
                };
                self.stats.destination_arrivals += 1;
                self.destination.offer(arrival);
            }
        }
    }
}
