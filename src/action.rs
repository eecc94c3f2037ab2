mod assassinate;
mod coup;
mod exchange;
mod foreign_aid;
mod income;
mod steal;
mod tax;

pub use assassinate::Assassinate;
pub use coup::Coup;
pub use exchange::Exchange;
pub use foreign_aid::ForeignAid;
pub use income::Income;
pub use steal::Steal;
pub use tax::Tax;

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::card::Character;
use crate::error::CoupError;
use crate::event::{PromptOption, PromptVariant};
use crate::negotiation::{Ask, Objection, ACCEPT, CHALLENGE};
use crate::player::PlayerId;
use crate::table::Table;

pub const INCOME: u32 = 1;
pub const FOREIGN_AID: u32 = 2;
pub const TAX: u32 = 3;
pub const STEAL: u32 = 2;
pub const ASSASSINATION_COST: u32 = 3;
pub const COUP_COST: u32 = 7;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Income,
    ForeignAid,
    Tax,
    Steal,
    Exchange,
    Assassinate,
    Coup,
}

pub static ACTION_KINDS: [ActionKind; 7] = [
    ActionKind::Income,
    ActionKind::ForeignAid,
    ActionKind::Tax,
    ActionKind::Steal,
    ActionKind::Exchange,
    ActionKind::Assassinate,
    ActionKind::Coup,
];

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Income => "INCOME",
            ActionKind::ForeignAid => "FOREIGN_AID",
            ActionKind::Tax => "TAX",
            ActionKind::Steal => "STEAL",
            ActionKind::Exchange => "EXCHANGE",
            ActionKind::Assassinate => "ASSASSINATE",
            ActionKind::Coup => "COUP",
        }
    }

    /// What a client shows on the action button.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Income => "Income",
            ActionKind::ForeignAid => "Foreign Aid",
            ActionKind::Tax => "Tax (Duke)",
            ActionKind::Steal => "Steal (Captain)",
            ActionKind::Exchange => "Exchange (Ambassador)",
            ActionKind::Assassinate => "Assassinate (Assassin)",
            ActionKind::Coup => "Coup",
        }
    }

    /// The character an actor claims by taking this action.
    pub fn claim(&self) -> Option<Character> {
        match self {
            ActionKind::Tax => Some(Character::Duke),
            ActionKind::Steal => Some(Character::Captain),
            ActionKind::Exchange => Some(Character::Ambassador),
            ActionKind::Assassinate => Some(Character::Assassin),
            ActionKind::Income | ActionKind::ForeignAid | ActionKind::Coup => None,
        }
    }

    pub fn option(&self) -> PromptOption {
        PromptOption::new(self.label(), self.as_str())
    }
}

impl Debug for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_KINDS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown action {s}"))
    }
}

/// One action's protocol: when it may be taken, and how it plays out.
#[async_trait]
pub trait Handler: Send + Sync {
    fn kind(&self) -> ActionKind;

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool;

    /// Plays the action through its negotiations and applies the effects.
    /// The turn is advanced by the caller.
    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError>;
}

/// Every action except Coup is off the table once a player can afford to be
/// forced into one.
pub(crate) fn below_forced_coup(table: &Table, actor: PlayerId) -> bool {
    table
        .state()
        .player(actor)
        .map(|player| player.coins() < table.config().forced_coup_threshold)
        .unwrap_or(false)
}

pub(crate) fn can_afford(table: &Table, actor: PlayerId, cost: u32) -> bool {
    table
        .state()
        .player(actor)
        .map(|player| player.coins() >= cost)
        .unwrap_or(false)
}

pub struct Registry {
    handlers: Vec<Box<dyn Handler>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            handlers: vec![
                Box::new(Income),
                Box::new(ForeignAid),
                Box::new(Tax),
                Box::new(Steal),
                Box::new(Exchange),
                Box::new(Assassinate),
                Box::new(Coup),
            ],
        }
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.iter().map(|h| h.kind())).finish()
    }
}

impl Registry {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    pub fn get(&self, kind: ActionKind) -> Option<&dyn Handler> {
        self.handlers
            .iter()
            .find(|handler| handler.kind() == kind)
            .map(|handler| handler.as_ref())
    }

    /// Registered actions the actor may take right now, in registration order.
    pub fn legal(&self, table: &Table, actor: PlayerId) -> Vec<ActionKind> {
        self.handlers
            .iter()
            .filter(|handler| handler.can_execute(table, actor))
            .map(|handler| handler.kind())
            .collect()
    }
}

/// A target's answer to an action aimed at them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Defense {
    Accept,
    Challenge,
    Block(Character),
}

impl Defense {
    pub(crate) fn block_value(character: Character) -> String {
        format!("BLOCK:{}", character.as_str())
    }

    /// Anything unrecognized, or a block with a character that isn't on
    /// offer, counts as acceptance.
    fn parse(value: &str, blockers: &[Character]) -> Self {
        if value == CHALLENGE {
            return Defense::Challenge;
        }
        value
            .strip_prefix("BLOCK:")
            .and_then(|name| name.parse::<Character>().ok())
            .filter(|character| blockers.contains(character))
            .map(Defense::Block)
            .unwrap_or(Defense::Accept)
    }
}

/// Asks the target whether to accept, challenge the actor's claim, or block
/// with one of `blockers`. Silence is acceptance.
pub(crate) async fn ask_defense(
    table: &mut Table,
    actor: PlayerId,
    target: PlayerId,
    kind: ActionKind,
    blockers: &[Character],
) -> Defense {
    let mut options = vec![
        PromptOption::new("Accept", ACCEPT),
        PromptOption::new("Challenge", CHALLENGE),
    ];
    options.extend(blockers.iter().map(|&character| {
        PromptOption::new(format!("Block as {character}"), Defense::block_value(character))
    }));

    let message = format!("{} targets you with {}.", table.name_of(actor), kind);
    let answer = table.ask(target, Ask::new(PromptVariant::Defense, message, options), ACCEPT).await;
    Defense::parse(answer.value(), blockers)
}

/// Opens a challenge window over the actor's claim. Returns `false` when a
/// challenger exposed the claim as a bluff.
pub(crate) async fn claim_holds(
    table: &mut Table,
    actor: PlayerId,
    kind: ActionKind,
    character: Character,
) -> Result<bool, CoupError> {
    let message = format!("{} claims the {} to take {}. Challenge?", table.name_of(actor), character, kind);
    let eligible = table.objectors(actor);

    match table.objection_window(eligible, Ask::challenge(message)).await {
        Objection::Raised { objector, .. } => table.resolve_challenge(actor, objector, character).await,
        Objection::Unopposed => Ok(true),
    }
}

/// A block is itself a claim, open to challenge from everyone but the
/// blocker. Returns whether the block stands.
pub(crate) async fn block_holds(
    table: &mut Table,
    blocker: PlayerId,
    kind: ActionKind,
    character: Character,
) -> Result<bool, CoupError> {
    table.log(format!("{} blocks {} with the {}.", table.name_of(blocker), kind, character));

    let message = format!("{} claims the {} to block {}. Challenge?", table.name_of(blocker), character, kind);
    let eligible = table.objectors(blocker);

    match table.objection_window(eligible, Ask::challenge(message)).await {
        Objection::Raised { objector, .. } => table.resolve_challenge(blocker, objector, character).await,
        Objection::Unopposed => Ok(true),
    }
}
