//! Server-side core of a real-time Coup table: seating, dealing, the turn
//! rotation, and the bluff / challenge / block negotiations every action is
//! played through.
//!
//! A match is owned by one task running a [`TurnDriver`]. Participants only
//! ever hold a [`Seat`]: a stream of [`Event`]s and a way to answer prompts.

pub mod action;
pub mod ai;
pub mod card;
pub mod config;
pub mod deck;
pub mod driver;
pub mod error;
pub mod event;
pub mod hub;
pub mod lobby;
pub mod negotiation;
pub mod player;
pub mod state;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{ActionKind, Handler, Registry};
pub use ai::{Actor, Participant, RandomBot};
pub use card::{Card, CardId, Character, CHARACTER_VARIANTS};
pub use config::MatchConfig;
pub use driver::{MatchOutcome, Phase, TurnDriver};
pub use error::CoupError;
pub use event::{Event, Prompt, PromptId, PromptOption, PromptVariant, Reply, StatePayload};
pub use hub::{Hub, Seat};
pub use lobby::Lobby;
pub use player::{Player, PlayerId, PublicProfile};
pub use state::{MatchId, MatchState};
pub use table::Table;
