//! Multi-criteria Range-Raptor router.
//!
//! The router answers: "which itineraries from these access stops to these
//! egress stops, starting within this window, are not beaten by any other
//! on arrival time, number of transfers, generalized cost and (optionally)
//! a second cost?"
//!
//! Raptor works in rounds. Round `n` rides one more trip than round `n - 1`,
//! starting from every stop improved in the previous round, then walks the
//! transfers out of every stop it reached. Range-Raptor repeats the rounds
//! once per departure minute in the window, latest first, keeping the
//! arrivals found so far so that later iterations only add what is better.
//!
//! The same code runs forwards (depart after) and in reverse (arrive by);
//! [`TimeCalculator`] hides which way time flows.

mod arrival;
mod calculator;
mod config;
mod cost;
mod destination;
mod pareto;
mod path_mapper;
mod rank;
mod search;
mod state;
mod strategy;
mod worker;

#[cfg(test)]
mod search_tests;
#[cfg(test)]
mod test_network;

pub use calculator::TimeCalculator;
pub use config::{CostConfig, MAX_SEARCH_WINDOW_MINS, SearchConfig, SearchDirection};
pub use cost::{C2Policy, CostCalculator, MAX_PASS_THROUGH_POINTS, PassThroughPoints};
pub use pareto::{ParetoComparator, ParetoSet, ParetoSetEventListener, TracingListener};
pub use rank::rank_paths;
pub use search::{NoResultReason, Planner, SearchError, SearchRequest, SearchResult};
pub use worker::SearchStats;
