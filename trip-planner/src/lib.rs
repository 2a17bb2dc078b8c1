//! Multi-criteria transit trip planner.
//!
//! Answers: "given ways to walk to some stops and from others, which
//! itineraries through the timetable are not beaten by any other on
//! arrival time, transfers and generalized cost?"

pub mod domain;
pub mod raptor;
pub mod service;
pub mod transit;
