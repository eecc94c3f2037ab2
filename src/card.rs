use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

impl Character {
    /// Wire name, matches the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Duke => "DUKE",
            Assassin => "ASSASSIN",
            Captain => "CAPTAIN",
            Ambassador => "AMBASSADOR",
            Contessa => "CONTESSA",
        }
    }
}

impl Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl FromStr for Character {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CHARACTER_VARIANTS
            .iter()
            .copied()
            .find(|character| character.as_str() == s)
            .ok_or_else(|| format!("unknown character {s}"))
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    // drawn from the match rng so a seeded match is fully reproducible
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(Uuid::from_u128(rng.gen()))
    }
}

impl Debug for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "card:{}", &self.0.simple().to_string()[..8])
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for CardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An influence card. Immutable once created; cards are only ever moved
/// between a hand, the deck and the public discard log.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    #[serde(rename = "variant")]
    pub character: Character,
}

impl Card {
    pub fn new<R: Rng + ?Sized>(character: Character, rng: &mut R) -> Self {
        Self { id: CardId::random(rng), character }
    }
}

impl Debug for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:?})", self.character, self.id)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use super::*;

    #[test]
    fn character_names_round_trip() {
        for character in CHARACTER_VARIANTS {
            assert_eq!(character.as_str().parse::<Character>(), Ok(character));
        }
        assert!("CONDESSA".parse::<Character>().is_err());
    }

    #[test]
    fn card_serializes_variant_field() {
        let mut rng = Pcg64::seed_from_u64(7);
        let card = Card::new(Contessa, &mut rng);
        let json = serde_json::to_value(card).unwrap();

        assert_eq!(json["variant"], "CONTESSA");
        assert_eq!(json["id"], card.id.to_string());
    }

    #[test]
    fn card_ids_are_reproducible_from_seed() {
        let a = CardId::random(&mut Pcg64::seed_from_u64(42));
        let b = CardId::random(&mut Pcg64::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.to_string().parse::<CardId>().unwrap(), a);
    }
}
