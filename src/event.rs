//! Everything that crosses the match boundary.
//!
//! Outbound traffic is a stream of [`Event`]s per participant; inbound
//! traffic is a stream of [`Reply`]s, each naming the prompt it answers.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::card::Card;
use crate::player::{PlayerId, PublicProfile};
use crate::state::MatchId;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(pub u64);

impl Display for PromptId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a client should render a prompt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptVariant {
    ChooseAction,
    ChooseTarget,
    /// Challenge someone's claim, or pass.
    Challenge,
    /// Block someone's action, or pass.
    Block,
    /// A target's answer to an action aimed at them.
    Defense,
    RevealCard,
    DiscardCard,
    KeepCard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOption {
    pub label: String,
    pub value: String,
}

impl PromptOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: PromptId,
    pub message: String,
    pub variant: PromptVariant,
    pub options: Vec<PromptOption>,
    pub expires_in_ms: u64,
}

impl Prompt {
    pub fn option_by_label(&self, label: &str) -> Option<&PromptOption> {
        self.options.iter().find(|option| option.label == label)
    }

    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub prompt: PromptId,
    pub value: String,
}

/// Sent to everyone on every state-affecting operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    pub match_id: MatchId,
    pub players: Vec<PublicProfile>,
    pub eliminated_players: Vec<PublicProfile>,
    pub current_turn_player: Option<PlayerId>,
    pub deck_size: usize,
    pub discards: Vec<Card>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Event {
    MatchStarted { match_id: MatchId },
    State(StatePayload),
    TurnStarted { player: PlayerId },
    Prompt(Prompt),
    /// Private: the recipient's own cards.
    Hand { cards: Vec<Card> },
    CardDiscarded { player: PlayerId, card: Card },
    PlayerEliminated { player: PlayerId },
    /// Private notice, e.g. an illegal selection.
    Message { message: String },
    /// Public match log line.
    Log { message: String },
    MatchEnded,
}
