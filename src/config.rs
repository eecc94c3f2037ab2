use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::action::COUP_COST;
use crate::card::CHARACTER_VARIANTS;
use crate::deck::Deck;
use crate::error::CoupError;

/// Match rules and negotiation timing.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "objection_timeout_ms": 5000, "seed": 42 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub starting_coins: u32,
    pub hand_size: usize,
    /// At or above this balance the only legal action is Coup.
    pub forced_coup_threshold: u32,
    /// How long the active player has to pick an action.
    pub turn_timeout_ms: u64,
    /// Targets, defenses, card reveals and discards.
    pub prompt_timeout_ms: u64,
    /// Broadcast challenge / block windows.
    pub objection_timeout_ms: u64,
    pub max_reoffers: usize,
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
            starting_coins: 2,
            hand_size: 2,
            forced_coup_threshold: 10,
            turn_timeout_ms: 30_000,
            prompt_timeout_ms: 15_000,
            objection_timeout_ms: 10_000,
            max_reoffers: 3,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub fn from_json(json: &str) -> Result<Self, CoupError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoupError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Rejects rule sets a match could not be played under.
    pub fn validate(&self) -> Result<(), CoupError> {
        if self.min_players < 2 {
            return Err(CoupError::Rules(format!("min_players must be at least 2, got {}", self.min_players)));
        }
        if self.max_players < self.min_players {
            return Err(CoupError::Rules(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players,
            )));
        }
        if self.hand_size == 0 {
            return Err(CoupError::Rules("hand_size must be at least 1".into()));
        }
        // below the coup cost a forced player could not afford the only action left
        if self.forced_coup_threshold < COUP_COST {
            return Err(CoupError::Rules(format!(
                "forced_coup_threshold must be at least {}, got {}",
                COUP_COST, self.forced_coup_threshold,
            )));
        }
        if let Some(count) = (self.min_players..=self.max_players)
            .find(|&n| n * self.hand_size > Deck::copies_per_variant(n) * CHARACTER_VARIANTS.len())
        {
            return Err(CoupError::Rules(format!(
                "{} players cannot be dealt {} cards each",
                count, self.hand_size,
            )));
        }
        Ok(())
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_millis(self.prompt_timeout_ms)
    }

    pub fn objection_timeout(&self) -> Duration {
        Duration::from_millis(self.objection_timeout_ms)
    }
}
