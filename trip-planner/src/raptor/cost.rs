//! Generalized cost.
//!
//! `c1` is the primary generalized cost, in raptor units. `c2` is an
//! optional second criterion whose meaning depends on the request's
//! [`C2Policy`].

use crate::domain::{
    StopIndex, TransitMode, TripPattern, seconds_to_raptor_cost, to_raptor_cost,
};

use super::{CostConfig, SearchDirection};

/// Computes c1 for boarding, riding, alighting and waiting.
///
/// All factors are pre-scaled to raptor units per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostCalculator {
    board_cost: i32,
    transfer_cost: i32,
    wait_factor: i32,
    transit_factors: [i32; TransitMode::COUNT],
    stop_costs: Vec<i32>,
}

impl CostCalculator {
    pub fn new(config: &CostConfig) -> Self {
        Self {
            board_cost: seconds_to_raptor_cost(config.board_cost),
            transfer_cost: seconds_to_raptor_cost(config.transfer_cost),
            wait_factor: to_raptor_cost(config.wait_reluctance),
            transit_factors: TransitMode::ALL.map(|mode| to_raptor_cost(config.transit_reluctance(mode))),
            stop_costs: config.stop_costs.clone(),
        }
    }

    /// Cost of boarding at `stop`. The transfer cost is added to every
    /// boarding but the first.
    pub fn board_cost(&self, first_boarding: bool, stop: StopIndex) -> i32 {
        let base = if first_boarding {
            self.board_cost
        } else {
            self.board_cost + self.transfer_cost
        };
        base + self.stop_cost(stop)
    }

    /// Cost of alighting at `stop`, excluding alight slack.
    pub fn alight_cost(&self, stop: StopIndex) -> i32 {
        self.stop_cost(stop)
    }

    pub fn stop_cost(&self, stop: StopIndex) -> i32 {
        self.stop_costs.get(stop.index()).copied().unwrap_or(0)
    }

    pub fn wait_cost(&self, seconds: i32) -> i32 {
        self.wait_factor * seconds
    }

    pub fn transit_factor(&self, mode: TransitMode) -> i32 {
        self.transit_factors[mode.index()]
    }

    pub fn transit_cost(&self, mode: TransitMode, seconds: i32) -> i32 {
        self.transit_factor(mode) * seconds
    }
}

/// How `c2` is computed and compared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum C2Policy {
    /// No second criterion; c2 is always zero and never compared.
    #[default]
    None,

    /// Journeys must pass through an ordered list of stop groups. c2 is a
    /// bitset: bit `i` is set once point `i` has been visited, in order.
    PassThrough(PassThroughPoints),

    /// c2 is the bitset of transit groups ridden; fewer groups is better.
    TransitGroupPriority,
}

impl C2Policy {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, C2Policy::None)
    }

    /// Is `left` strictly better than `right` in c2?
    pub fn better(&self, left: u32, right: u32) -> bool {
        match self {
            C2Policy::None => false,
            C2Policy::PassThrough(_) => left & !right != 0,
            C2Policy::TransitGroupPriority => right & !left != 0,
        }
    }

    /// c2 of an access arrival at `stop`.
    pub fn access(&self, stop: StopIndex) -> u32 {
        match self {
            C2Policy::PassThrough(points) => points.visit(0, stop),
            _ => 0,
        }
    }

    /// c2 after boarding `pattern` at `stop`.
    pub fn board(&self, c2: u32, pattern: &TripPattern, stop: StopIndex) -> u32 {
        match self {
            C2Policy::None => 0,
            C2Policy::PassThrough(points) => points.visit(c2, stop),
            C2Policy::TransitGroupPriority => c2 | (1 << pattern.transit_group()),
        }
    }

    /// Does riding past a stop change c2? Only pass-through points count
    /// stops visited on board.
    pub fn counts_stops_on_board(&self) -> bool {
        matches!(self, C2Policy::PassThrough(_))
    }

    /// c2 of a ride in progress once it reaches `stop`.
    pub fn ride(&self, c2: u32, stop: StopIndex) -> u32 {
        match self {
            C2Policy::PassThrough(points) => points.visit(c2, stop),
            _ => c2,
        }
    }

    /// c2 after walking to `stop`.
    pub fn transfer(&self, c2: u32, stop: StopIndex) -> u32 {
        match self {
            C2Policy::PassThrough(points) => points.visit(c2, stop),
            _ => c2,
        }
    }

    /// May an arrival with this c2 reach the destination?
    pub fn accepts_at_destination(&self, c2: u32) -> bool {
        match self {
            C2Policy::PassThrough(points) => c2 == points.all_visited(),
            _ => true,
        }
    }
}

/// An ordered list of pass-through points, each a group of stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassThroughPoints {
    points: Vec<Vec<StopIndex>>,
}

/// Largest number of pass-through points that fits the c2 bitset.
pub const MAX_PASS_THROUGH_POINTS: usize = 32;

impl PassThroughPoints {
    /// Create the points; callers validate the count against
    /// [`MAX_PASS_THROUGH_POINTS`].
    pub fn new(points: Vec<Vec<StopIndex>>) -> Self {
        Self { points }
    }

    /// The same points in the order a reverse search meets them.
    pub fn for_direction(&self, direction: SearchDirection) -> Self {
        let mut points = self.points.clone();
        if !direction.is_forward() {
            points.reverse();
        }
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec<StopIndex>] {
        &self.points
    }

    /// Bitset with every point visited.
    pub fn all_visited(&self) -> u32 {
        match self.points.len() {
            32 => u32::MAX,
            n => (1u32 << n) - 1,
        }
    }

    /// Visit `stop`: marks the next unvisited point, and the ones after it,
    /// while they contain `stop`.
    pub fn visit(&self, c2: u32, stop: StopIndex) -> u32 {
        let mut c2 = c2;
        let mut next = c2.trailing_ones() as usize;
        while next < self.points.len() && self.points[next].contains(&stop) {
            c2 |= 1 << next;
            next += 1;
        }
        c2
    }
}
