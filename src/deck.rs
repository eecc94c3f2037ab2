use std::fmt::{Debug, Formatter};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use crate::card::{Card, CHARACTER_VARIANTS};
use crate::error::CoupError;

/// The pool of influence cards not currently held by anyone.
///
/// The deck owns the match rng: every reinsertion reshuffles the whole pool,
/// so a returned card's position reveals nothing about what gets drawn next.
#[derive(Clone)]
pub struct Deck {
    cards: Vec<Card>,
    rng: Pcg64,
}

impl Debug for Deck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Deck({} cards)", self.cards.len())
    }
}

impl Deck {
    pub fn copies_per_variant(num_players: usize) -> usize {
        if num_players <= 5 { 3 } else { 4 }
    }

    /// Builds the full card set for a match of `num_players` and shuffles it.
    pub fn initialize(num_players: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let copies = Self::copies_per_variant(num_players);

        let cards: Vec<Card> = CHARACTER_VARIANTS.iter()
            .flat_map(|&character| std::iter::repeat(character).take(copies))
            .map(|character| Card::new(character, &mut rng))
            .collect();

        let mut deck = Self { cards, rng };
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    pub fn draw(&mut self) -> Result<Card, CoupError> {
        if self.cards.is_empty() {
            return Err(CoupError::EmptyDeck);
        }

        Ok(self.cards.remove(0))
    }

    pub fn insert_and_shuffle(&mut self, card: Card) {
        self.cards.push(card);
        self.shuffle();
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Pulls a specific card out of the pool. Only used to stack hands in tests.
    #[cfg(test)]
    pub(crate) fn take_character(&mut self, character: crate::Character) -> Option<Card> {
        let idx = self.cards.iter().position(|card| card.character == character)?;
        Some(self.cards.remove(idx))
    }
}
