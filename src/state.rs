use std::fmt::{Debug, Formatter};
use uuid::Uuid;
use crate::card::{Card, CardId};
use crate::config::MatchConfig;
use crate::deck::Deck;
use crate::error::CoupError;
use crate::event::StatePayload;
use crate::player::{Player, PlayerId};

pub type MatchId = Uuid;

/// Outcome of moving a card from a hand into the public discard log.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Discard {
    pub card: Card,
    pub eliminated: bool,
}

/// Everything a match knows, owned by exactly one task.
///
/// Card custody: every card created for the match is in exactly one of the
/// deck, an active player's hand or the discard log. Eliminated and departed
/// players hold nothing.
#[derive(Clone)]
pub struct MatchState {
    id: MatchId,
    seed: u64,
    // rotation order
    players: Vec<Player>,
    eliminated: Vec<Player>,
    turn: usize,
    // set while the turn holder is out of rotation; `turn` already names the successor
    vacated: Option<PlayerId>,
    turn_count: usize,
    deck: Deck,
    discards: Vec<Card>,
    total_cards: usize,
}

impl Debug for MatchState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "T {} | P {} | {:?} | discards {:?}", self.turn_count, self.turn, self.deck, self.discards)?;
        for (player_idx, player) in self.players.iter().enumerate() {
            writeln!(f, "\tP {player_idx}: {player:?}")?;
        }
        Ok(())
    }
}

impl MatchState {
    /// Builds the deck for the seated players, then deals `hand_size` cards each.
    pub fn new(config: &MatchConfig, seats: &[(PlayerId, String)], seed: u64) -> Result<Self, CoupError> {
        let count = seats.len();
        if count < config.min_players || count > config.max_players {
            return Err(CoupError::PlayerCount {
                count,
                min: config.min_players,
                max: config.max_players,
            });
        }

        let deck = Deck::initialize(count, seed);
        let total_cards = deck.size();

        let players = seats
            .iter()
            .map(|(id, name)| Player::new(*id, name.clone(), config.starting_coins))
            .collect();

        let mut state = Self {
            id: Uuid::new_v4(),
            seed,
            players,
            eliminated: Vec::new(),
            turn: 0,
            vacated: None,
            turn_count: 0,
            deck,
            discards: Vec::new(),
            total_cards,
        };

        for _ in 0..config.hand_size {
            for idx in 0..state.players.len() {
                let card = state.deck.draw()?;
                state.players[idx].add_card(card);
            }
        }

        Ok(state)
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn eliminated(&self) -> &[Player] {
        &self.eliminated
    }

    pub fn discards(&self) -> &[Card] {
        &self.discards
    }

    pub fn deck_size(&self) -> usize {
        self.deck.size()
    }

    pub fn total_cards(&self) -> usize {
        self.total_cards
    }

    /// Cards currently accounted for; equals `total_cards` in every reachable state.
    pub fn card_count(&self) -> usize {
        self.deck.size()
            + self.players.iter().map(|p| p.hand().len()).sum::<usize>()
            + self.eliminated.iter().map(|p| p.hand().len()).sum::<usize>()
            + self.discards.len()
    }

    pub fn turn_index(&self) -> usize {
        self.turn
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    /// The player whose turn it is. Stays on the turn holder after they are
    /// eliminated, until the turn ends.
    pub fn current_player(&self) -> Option<&Player> {
        match self.vacated {
            Some(id) => self.lookup(id),
            None => self.players.get(self.turn),
        }
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, CoupError> {
        self.players
            .iter()
            .find(|p| p.id() == id)
            .ok_or(CoupError::PlayerNotFound(id))
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, CoupError> {
        self.players
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(CoupError::PlayerNotFound(id))
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id() == id)
    }

    /// Finds a player whether still active or already eliminated.
    pub fn lookup(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().chain(self.eliminated.iter()).find(|p| p.id() == id)
    }

    /// Active players other than `id`, in rotation order starting after them.
    pub fn others(&self, id: PlayerId) -> Vec<PlayerId> {
        let len = self.players.len();
        match self.players.iter().position(|p| p.id() == id) {
            Some(idx) => (1..len)
                .map(|n| self.players[(idx + n) % len].id())
                .collect(),
            None => self.players.iter().map(|p| p.id()).collect(),
        }
    }

    pub fn winner(&self) -> Option<&Player> {
        match self.players.as_slice() {
            [last] => Some(last),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.players.len() <= 1
    }

    pub fn advance_turn(&mut self) {
        self.turn_count += 1;
        if self.vacated.take().is_none() && !self.players.is_empty() {
            self.turn = (self.turn + 1) % self.players.len();
        }
    }

    /// Hands a turn whose holder left between turns to their successor
    /// without counting it.
    pub fn begin_turn(&mut self) {
        self.vacated = None;
    }

    pub fn credit(&mut self, id: PlayerId, amount: u32) -> Result<(), CoupError> {
        self.player_mut(id)?.add_coins(amount);
        Ok(())
    }

    pub fn debit(&mut self, id: PlayerId, amount: u32) -> Result<(), CoupError> {
        self.player_mut(id)?.remove_coins(amount)
    }

    /// Moves coins between two active players; nothing changes if either side fails.
    pub fn transfer(&mut self, from: PlayerId, to: PlayerId, amount: u32) -> Result<(), CoupError> {
        self.player(to)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    pub fn draw_card(&mut self, id: PlayerId) -> Result<Card, CoupError> {
        self.player(id)?;
        let card = self.deck.draw()?;
        self.player_mut(id)?.add_card(card);
        Ok(card)
    }

    /// Puts a hand card back into the deck and reshuffles. The player may be
    /// left with an empty hand transiently, so this never eliminates.
    pub fn return_card(&mut self, id: PlayerId, card_id: CardId) -> Result<Card, CoupError> {
        let card = self.player_mut(id)?.remove_card(card_id)?;
        self.deck.insert_and_shuffle(card);
        Ok(card)
    }

    /// Discard-and-redraw: the revealed card goes back into the deck, the deck
    /// reshuffles, and the player draws a replacement.
    pub fn redraw(&mut self, id: PlayerId, card_id: CardId) -> Result<Card, CoupError> {
        self.return_card(id, card_id)?;
        self.draw_card(id)
    }

    /// Reveals a card into the public discard log, eliminating the player if
    /// it was their last.
    pub fn discard(&mut self, id: PlayerId, card_id: CardId) -> Result<Discard, CoupError> {
        let idx = self.players
            .iter()
            .position(|p| p.id() == id)
            .ok_or(CoupError::PlayerNotFound(id))?;

        let card = self.players[idx].remove_card(card_id)?;
        self.discards.push(card);

        let eliminated = !self.players[idx].is_alive();
        if eliminated {
            self.eliminate(idx);
        }

        Ok(Discard { card, eliminated })
    }

    /// Takes a player who left the match out of rotation. Their hand goes back
    /// into the deck unseen.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Vec<Card>, CoupError> {
        let idx = self.players
            .iter()
            .position(|p| p.id() == id)
            .ok_or(CoupError::PlayerNotFound(id))?;

        let hand = self.players[idx].hand().to_vec();
        for card in &hand {
            self.return_card(id, card.id)?;
        }
        self.eliminate(idx);

        Ok(hand)
    }

    fn eliminate(&mut self, idx: usize) {
        let player = self.players.remove(idx);

        if idx < self.turn {
            self.turn -= 1;
        } else if idx == self.turn {
            if self.vacated.is_none() {
                self.vacated = Some(player.id());
            }
            if self.turn >= self.players.len() {
                self.turn = 0;
            }
        }

        self.eliminated.push(player);
    }

    pub fn snapshot(&self) -> StatePayload {
        StatePayload {
            match_id: self.id,
            players: self.players.iter().map(Player::public_profile).collect(),
            eliminated_players: self.eliminated.iter().map(Player::public_profile).collect(),
            current_turn_player: self.current_player().map(Player::id),
            deck_size: self.deck.size(),
            discards: self.discards.clone(),
        }
    }

    /// Swaps a player's hand for the given characters, pulled from the deck.
    #[cfg(test)]
    pub(crate) fn stack_hand(&mut self, id: PlayerId, characters: &[crate::Character]) {
        let held: Vec<CardId> = self.player(id).unwrap().hand().iter().map(|card| card.id).collect();
        for card_id in held {
            self.return_card(id, card_id).unwrap();
        }
        for &character in characters {
            let card = self.deck.take_character(character).expect("character left in deck");
            self.player_mut(id).unwrap().add_card(card);
        }
    }

    #[cfg(test)]
    pub(crate) fn set_coins(&mut self, id: PlayerId, coins: u32) {
        let player = self.player_mut(id).unwrap();
        let current = player.coins();
        if coins >= current {
            player.add_coins(coins - current);
        } else {
            player.remove_coins(current - coins).unwrap();
        }
    }
}
