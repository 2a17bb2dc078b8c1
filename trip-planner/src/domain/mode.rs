//! Transit modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The vehicle type serving a trip pattern.
///
/// Slack and in-vehicle reluctance are configured per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Bus,
    Tram,
    Subway,
    Rail,
    Ferry,
    Coach,
    Cable,
}

impl TransitMode {
    /// All modes, in index order.
    pub const ALL: [TransitMode; 7] = [
        TransitMode::Bus,
        TransitMode::Tram,
        TransitMode::Subway,
        TransitMode::Rail,
        TransitMode::Ferry,
        TransitMode::Coach,
        TransitMode::Cable,
    ];

    /// Number of modes.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index for per-mode lookup tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Upper-case label used in path descriptions.
    pub fn label(self) -> &'static str {
        match self {
            TransitMode::Bus => "BUS",
            TransitMode::Tram => "TRAM",
            TransitMode::Subway => "SUBWAY",
            TransitMode::Rail => "RAIL",
            TransitMode::Ferry => "FERRY",
            TransitMode::Coach => "COACH",
            TransitMode::Cable => "CABLE",
        }
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
