//! Error types for the match engine.
//!
//! Most variants are contract violations: a handler asked for something the
//! state does not hold (a card id not in hand, more coins than the balance, a
//! player that already left). Those abort the current action only. The fatal
//! ones end the match.

use crate::action::ActionKind;
use crate::card::CardId;
use crate::player::PlayerId;

#[derive(Debug, thiserror::Error)]
pub enum CoupError {
    /// Draw from an empty deck. Unreachable while cards are conserved.
    #[error("no cards left in the deck")]
    EmptyDeck,

    #[error("card {card} not found in hand of player {player}")]
    CardNotFound { player: PlayerId, card: CardId },

    #[error("player {player} cannot pay {needed} coins; only has {available}")]
    InsufficientFunds { player: PlayerId, needed: u32, available: u32 },

    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("no valid target for {0:?}")]
    NoValidTarget(ActionKind),

    /// Nothing registered can be taken by the player whose turn it is.
    #[error("player {0} has no legal action")]
    NoLegalAction(PlayerId),

    #[error("a match needs between {min} and {max} players, got {count}")]
    PlayerCount { count: usize, min: usize, max: usize },

    #[error("player {0} is no longer connected")]
    Disconnected(PlayerId),

    /// The same turn kept faulting and the driver gave up on it.
    #[error("turn of player {player} faulted {faults} times in a row")]
    TooManyFaults { player: PlayerId, faults: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid match rules: {0}")]
    Rules(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoupError {
    /// Returns true if the error ends the match rather than the current action.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoupError::EmptyDeck | CoupError::NoLegalAction(_) | CoupError::TooManyFaults { .. })
    }
}
