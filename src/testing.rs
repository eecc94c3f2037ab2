//! Scripted participants and a table harness for the async tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use crate::action::ActionKind;
use crate::card::Character;
use crate::config::MatchConfig;
use crate::driver::TurnDriver;
use crate::event::{Event, Prompt, PromptVariant};
use crate::hub::{Hub, Seat};
use crate::negotiation::{ACCEPT, BLOCK, CHALLENGE, PASS};
use crate::player::PlayerId;
use crate::state::MatchState;
use crate::table::Table;

#[derive(Clone, Debug)]
pub enum Move {
    Value(String),
    /// Answers with the value of the option carrying this label, if offered.
    Label(String),
}

/// Canned answers per prompt variant: queued moves are used once, in
/// order, then the variant's standing move applies. Unscripted prompts
/// are left to time out.
#[derive(Clone, Debug, Default)]
pub struct Script {
    queued: HashMap<PromptVariant, VecDeque<Move>>,
    standing: HashMap<PromptVariant, Move>,
    leaves: bool,
}

impl Script {
    pub fn silent() -> Self {
        Self::default()
    }

    /// Drops the seat as soon as the participant starts.
    pub fn leaving() -> Self {
        Self { leaves: true, ..Self::default() }
    }

    pub fn always(mut self, variant: PromptVariant, mv: Move) -> Self {
        self.standing.insert(variant, mv);
        self
    }

    pub fn then(mut self, variant: PromptVariant, mv: Move) -> Self {
        self.queued.entry(variant).or_default().push_back(mv);
        self
    }

    pub fn acting(action: ActionKind) -> Self {
        Self::silent().act(action)
    }

    pub fn act(self, action: ActionKind) -> Self {
        self.then(PromptVariant::ChooseAction, Move::Value(action.as_str().into()))
    }

    pub fn challenging() -> Self {
        Self::silent().always(PromptVariant::Challenge, Move::Value(CHALLENGE.into()))
    }

    /// Passes every challenge and block window.
    pub fn passing() -> Self {
        Self::silent()
            .always(PromptVariant::Challenge, Move::Value(PASS.into()))
            .always(PromptVariant::Block, Move::Value(PASS.into()))
    }

    pub fn discarding(character: Character) -> Self {
        Self::silent().discard(character)
    }

    pub fn targeting_label(label: &str) -> Self {
        Self::silent().target(label)
    }

    pub fn target(self, label: &str) -> Self {
        self.always(PromptVariant::ChooseTarget, Move::Label(label.into()))
    }

    pub fn discard(self, character: Character) -> Self {
        self.then(PromptVariant::DiscardCard, Move::Label(character.to_string()))
    }

    pub fn reveal(self, character: Character) -> Self {
        self.then(PromptVariant::RevealCard, Move::Label(character.to_string()))
    }

    pub fn keep(self, character: Character) -> Self {
        self.then(PromptVariant::KeepCard, Move::Label(character.to_string()))
    }

    pub fn block(self) -> Self {
        self.then(PromptVariant::Block, Move::Value(BLOCK.into()))
    }

    pub fn accept(self) -> Self {
        self.then(PromptVariant::Defense, Move::Value(ACCEPT.into()))
    }

    pub fn defend(self, value: &str) -> Self {
        self.then(PromptVariant::Defense, Move::Value(value.into()))
    }

    fn answer(&mut self, prompt: &Prompt) -> Option<String> {
        let mv = self.queued
            .get_mut(&prompt.variant)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.standing.get(&prompt.variant).cloned())?;

        match mv {
            Move::Value(value) => Some(value),
            Move::Label(label) => prompt.option_by_label(&label).map(|option| option.value.clone()),
        }
    }
}

async fn play(mut seat: Seat, mut script: Script, record: Arc<Mutex<Vec<Event>>>) {
    if script.leaves {
        return;
    }
    while let Some(event) = seat.next_event().await {
        if let Event::Prompt(prompt) = &event {
            if let Some(value) = script.answer(prompt) {
                let _ = seat.respond(prompt.id, value);
            }
        }
        record.lock().unwrap().push(event);
    }
}

/// A seated table whose participants run scripts, seats named `p0`, `p1`, ...
pub struct Harness {
    pub table: Table,
    ids: Vec<PlayerId>,
    records: HashMap<PlayerId, Arc<Mutex<Vec<Event>>>>,
}

impl Harness {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self::with_config(MatchConfig::default(), scripts)
    }

    pub fn with_config(config: MatchConfig, scripts: Vec<Script>) -> Self {
        let mut hub = Hub::default();
        let seats: Vec<Seat> = (0..scripts.len()).map(|i| hub.seat(format!("p{i}"))).collect();
        let names: Vec<(PlayerId, String)> = seats.iter().map(|s| (s.id(), s.name().to_string())).collect();
        let state = MatchState::new(&config, &names, 7).unwrap();

        let mut records = HashMap::new();
        for (seat, script) in seats.into_iter().zip(scripts) {
            let record = Arc::new(Mutex::new(Vec::new()));
            records.insert(seat.id(), record.clone());
            tokio::spawn(play(seat, script, record));
        }

        Self {
            table: Table::new(state, hub, config),
            ids: names.into_iter().map(|(id, _)| id).collect(),
            records,
        }
    }

    pub fn ids2(&self) -> [PlayerId; 2] {
        [self.ids[0], self.ids[1]]
    }

    pub fn ids3(&self) -> [PlayerId; 3] {
        [self.ids[0], self.ids[1], self.ids[2]]
    }

    pub fn stack(&mut self, id: PlayerId, characters: &[Character]) {
        self.table.state_mut().stack_hand(id, characters);
    }

    pub fn coins(&mut self, id: PlayerId, coins: u32) {
        self.table.state_mut().set_coins(id, coins);
    }

    pub fn hand(&self, id: PlayerId) -> Vec<Character> {
        self.table
            .state()
            .lookup(id)
            .map(|p| p.hand().iter().map(|card| card.character).collect())
            .unwrap_or_default()
    }

    pub fn coins_of(&self, id: PlayerId) -> u32 {
        self.table.state().lookup(id).map(|p| p.coins()).unwrap_or_default()
    }

    /// Lets every participant task drain what it has been sent.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    pub fn events(&self, id: PlayerId) -> Vec<Event> {
        self.records[&id].lock().unwrap().clone()
    }

    pub fn prompts(&self, id: PlayerId) -> Vec<Prompt> {
        self.events(id)
            .into_iter()
            .filter_map(|event| match event {
                Event::Prompt(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }

    pub fn into_driver(self) -> (TurnDriver, HashMap<PlayerId, Arc<Mutex<Vec<Event>>>>) {
        (TurnDriver::new(self.table), self.records)
    }
}
