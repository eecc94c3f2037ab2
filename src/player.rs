use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::card::{Card, CardId, Character};
use crate::error::CoupError;

/// Opaque participant identity, issued by the lobby when a seat is taken.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "player:{}", &self.0.simple().to_string()[..8])
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What everyone at the table may know about a player: no card variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub participant_id: PlayerId,
    pub name: String,
    pub coins: u32,
    pub hand_size: usize,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    coins: u32,
    hand: Vec<Card>,
}

impl Debug for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ${} {:?}", self.name, self.coins, self.hand)
    }
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, coins: u32) -> Self {
        Self {
            id,
            name: name.into(),
            coins,
            hand: Vec::with_capacity(4),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn is_alive(&self) -> bool {
        !self.hand.is_empty()
    }

    pub fn holds(&self, card_id: CardId) -> bool {
        self.hand.iter().any(|card| card.id == card_id)
    }

    pub fn find_character(&self, character: Character) -> Option<&Card> {
        self.hand.iter().find(|card| card.character == character)
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Removes a card from the hand. Asking for a card the player does not
    /// hold is a contract violation and leaves the hand untouched.
    pub fn remove_card(&mut self, card_id: CardId) -> Result<Card, CoupError> {
        let idx = self.hand
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(CoupError::CardNotFound { player: self.id, card: card_id })?;

        Ok(self.hand.remove(idx))
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.coins += amount;
    }

    pub fn remove_coins(&mut self, amount: u32) -> Result<(), CoupError> {
        if amount > self.coins {
            return Err(CoupError::InsufficientFunds {
                player: self.id,
                needed: amount,
                available: self.coins,
            });
        }

        self.coins -= amount;
        Ok(())
    }

    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            participant_id: self.id,
            name: self.name.clone(),
            coins: self.coins,
            hand_size: self.hand.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use crate::Character::{Captain, Duke};
    use super::*;

    fn player_with(characters: &[Character]) -> Player {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut player = Player::new(PlayerId::new(), "p0", 2);
        for &character in characters {
            player.add_card(Card::new(character, &mut rng));
        }
        player
    }

    #[test]
    fn remove_card_by_id() {
        let mut player = player_with(&[Duke, Captain]);
        let captain = player.hand()[1];

        assert_eq!(player.remove_card(captain.id).unwrap(), captain);
        assert_eq!(player.hand().len(), 1);
        assert!(player.is_alive());
    }

    #[test]
    fn remove_unknown_card_is_rejected() {
        let mut player = player_with(&[Duke]);
        let stranger = Card::new(Duke, &mut Pcg64::seed_from_u64(99));

        assert!(matches!(player.remove_card(stranger.id), Err(CoupError::CardNotFound { .. })));
        assert_eq!(player.hand().len(), 1);
    }

    #[test]
    fn coins_never_go_negative() {
        let mut player = player_with(&[Duke]);

        player.add_coins(1);
        assert_eq!(player.coins(), 3);

        assert!(matches!(player.remove_coins(4), Err(CoupError::InsufficientFunds { needed: 4, available: 3, .. })));
        assert_eq!(player.coins(), 3);

        player.remove_coins(3).unwrap();
        assert_eq!(player.coins(), 0);
    }

    #[test]
    fn public_profile_hides_variants() {
        let player = player_with(&[Duke, Captain]);
        let json = serde_json::to_value(player.public_profile()).unwrap();

        assert_eq!(json["handSize"], 2);
        assert_eq!(json["coins"], 2);
        assert_eq!(json["name"], "p0");
        assert!(json.get("hand").is_none());
    }

    #[test]
    fn empty_hand_is_eliminated() {
        let mut player = player_with(&[Duke]);
        let card = player.hand()[0];
        player.remove_card(card.id).unwrap();
        assert!(!player.is_alive());
    }
}
