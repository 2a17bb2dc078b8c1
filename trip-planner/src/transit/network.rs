//! JSON network files.
//!
//! A small JSON description of stops, patterns, trips and transfers, used by
//! the binary and in tests. Stops are referenced by name.
//!
//! ```json
//! {
//!   "stops": ["A", "B", "C"],
//!   "patterns": [
//!     {"line": "L1", "mode": "bus", "stops": ["A", "B"],
//!      "trips": [{"id": "L1-1", "departures": ["10:00", "10:10"]}]}
//!   ],
//!   "transfers": [{"from": "B", "to": "C", "duration": 225}],
//!   "slack": {"board_slack": 45, "alight_slack": 15}
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::domain::{DomainError, TransitMode, TripPattern, TripSchedule, to_raptor_cost};

use super::{SlackConfig, Timetable, TimetableBuilder};

/// Errors that can occur when loading a network file.
#[derive(Debug, thiserror::Error)]
pub enum NetworkFileError {
    /// File could not be read
    #[error("failed to read network file: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for a network
    #[error("invalid network JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Network data is inconsistent
    #[error("invalid network: {0}")]
    Domain(#[from] DomainError),

    /// A pattern or transfer names a stop missing from `stops`
    #[error("unknown stop name: {0}")]
    UnknownStop(String),
}

fn default_walk_reluctance() -> f64 {
    2.0
}

/// Parsed network file.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkFile {
    pub stops: Vec<String>,

    #[serde(default)]
    pub patterns: Vec<PatternEntry>,

    #[serde(default)]
    pub transfers: Vec<TransferEntry>,

    /// Multiplier turning transfer duration into cost when a transfer has no
    /// explicit `c1`.
    #[serde(default = "default_walk_reluctance")]
    pub walk_reluctance: f64,

    /// Slack to search this network with.
    #[serde(default)]
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    pub line: String,
    pub mode: TransitMode,
    pub stops: Vec<String>,
    pub trips: Vec<TripSchedule>,
    #[serde(default)]
    pub transit_group: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferEntry {
    pub from: String,
    pub to: String,
    /// Seconds.
    pub duration: i32,
    /// Raptor cost; derived from `walk_reluctance` when absent.
    #[serde(default)]
    pub c1: Option<i32>,
    /// Also add the reverse transfer.
    #[serde(default)]
    pub bidirectional: bool,
}

impl NetworkFile {
    /// Parse a network from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, NetworkFileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a network file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkFileError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Build the in-memory timetable.
    pub fn into_timetable(self) -> Result<Timetable, NetworkFileError> {
        let mut builder = TimetableBuilder::new();
        for name in &self.stops {
            builder.add_stop(name.as_str());
        }
        let lookup = |builder: &TimetableBuilder, name: &str| {
            builder
                .stop_index(name)
                .ok_or_else(|| NetworkFileError::UnknownStop(name.to_string()))
        };

        for entry in self.patterns {
            let stops = entry
                .stops
                .iter()
                .map(|name| lookup(&builder, name))
                .collect::<Result<Vec<_>, _>>()?;
            let pattern = TripPattern::new(entry.line, entry.mode, stops, entry.trips)?
                .with_transit_group(entry.transit_group)?;
            builder.add_pattern(pattern)?;
        }

        for entry in self.transfers {
            let from = lookup(&builder, &entry.from)?;
            let to = lookup(&builder, &entry.to)?;
            let c1 = entry
                .c1
                .unwrap_or_else(|| to_raptor_cost(self.walk_reluctance * f64::from(entry.duration)));
            if entry.bidirectional {
                builder.add_walk(from, to, entry.duration, c1)?;
            } else {
                builder.add_transfer(from, to, entry.duration, c1)?;
            }
        }

        Ok(builder.build())
    }
}

/// Load a timetable from a JSON network file.
pub fn load_network(path: impl AsRef<Path>) -> Result<Timetable, NetworkFileError> {
    NetworkFile::load(path)?.into_timetable()
}
