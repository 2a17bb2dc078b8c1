//! Boarding, alighting and transfer slack.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::TransitMode;

/// Extra time the router reserves around boarding and alighting.
///
/// All values are in seconds.
pub trait SlackProvider {
    /// Time needed at a stop before the vehicle departs.
    fn board_slack(&self, mode: TransitMode) -> i32;

    /// Time needed to get off and clear the stop after the vehicle arrives.
    fn alight_slack(&self, mode: TransitMode) -> i32;

    /// Minimum time between two transit legs, on top of board/alight slack.
    fn transfer_slack(&self) -> i32;
}

/// Slack configuration with optional per-mode overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Default board slack (seconds).
    pub board_slack: i32,

    /// Default alight slack (seconds).
    pub alight_slack: i32,

    /// Transfer slack (seconds).
    pub transfer_slack: i32,

    /// Per-mode board slack overrides.
    pub board_slack_for_mode: BTreeMap<TransitMode, i32>,

    /// Per-mode alight slack overrides.
    pub alight_slack_for_mode: BTreeMap<TransitMode, i32>,
}

impl SlackConfig {
    /// Create a configuration with the same slack for every mode.
    pub fn new(board_slack: i32, alight_slack: i32, transfer_slack: i32) -> Self {
        Self {
            board_slack,
            alight_slack,
            transfer_slack,
            board_slack_for_mode: BTreeMap::new(),
            alight_slack_for_mode: BTreeMap::new(),
        }
    }

    /// Override board slack for one mode.
    pub fn with_board_slack(mut self, mode: TransitMode, seconds: i32) -> Self {
        self.board_slack_for_mode.insert(mode, seconds);
        self
    }

    /// Override alight slack for one mode.
    pub fn with_alight_slack(mut self, mode: TransitMode, seconds: i32) -> Self {
        self.alight_slack_for_mode.insert(mode, seconds);
        self
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self::new(0, 0, 120)
    }
}

impl SlackProvider for SlackConfig {
    fn board_slack(&self, mode: TransitMode) -> i32 {
        self.board_slack_for_mode
            .get(&mode)
            .copied()
            .unwrap_or(self.board_slack)
    }

    fn alight_slack(&self, mode: TransitMode) -> i32 {
        self.alight_slack_for_mode
            .get(&mode)
            .copied()
            .unwrap_or(self.alight_slack)
    }

    fn transfer_slack(&self) -> i32 {
        self.transfer_slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slack() {
        let slack = SlackConfig::default();
        assert_eq!(slack.board_slack(TransitMode::Bus), 0);
        assert_eq!(slack.alight_slack(TransitMode::Bus), 0);
        assert_eq!(slack.transfer_slack(), 120);
    }

    #[test]
    fn mode_overrides() {
        let slack = SlackConfig::new(45, 15, 60)
            .with_board_slack(TransitMode::Rail, 120)
            .with_alight_slack(TransitMode::Ferry, 300);

        assert_eq!(slack.board_slack(TransitMode::Bus), 45);
        assert_eq!(slack.board_slack(TransitMode::Rail), 120);
        assert_eq!(slack.alight_slack(TransitMode::Rail), 15);
        assert_eq!(slack.alight_slack(TransitMode::Ferry), 300);
    }

    #[test]
    fn deserialize_partial() {
        let slack: SlackConfig =
            serde_json::from_str(r#"{"board_slack": 45, "board_slack_for_mode": {"rail": 90}}"#)
                .unwrap();
        assert_eq!(slack.board_slack(TransitMode::Bus), 45);
        assert_eq!(slack.board_slack(TransitMode::Rail), 90);
        assert_eq!(slack.transfer_slack(), 120);
    }
}
