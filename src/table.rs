//! A match in progress: the state, the routing hub and the rules config,
//! plus the protocol fragments every action handler shares (picking a
//! target, revealing a card for a challenge, losing influence).
//!
//! Every mutation made through a `Table` is followed by a state broadcast.

use crate::card::{Card, CardId, Character};
use crate::config::MatchConfig;
use crate::error::CoupError;
use crate::event::{Event, PromptOption, PromptVariant};
use crate::hub::Hub;
use crate::negotiation::{Answer, Ask, Objection, PASS};
use crate::player::PlayerId;
use crate::state::{Discard, MatchState};

#[derive(Debug)]
pub struct Table {
    state: MatchState,
    hub: Hub,
    config: MatchConfig,
}

impl Table {
    pub fn new(state: MatchState, hub: Hub, config: MatchConfig) -> Self {
        Self { state, hub, config }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub(crate) fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    pub fn name_of(&self, id: PlayerId) -> String {
        self.state
            .lookup(id)
            .map(|player| player.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn broadcast_state(&self) {
        self.hub.broadcast(Event::State(self.state.snapshot()));
    }

    /// Public match log line.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!("[{}] {}", self.state.id(), message);
        self.hub.broadcast(Event::Log { message });
    }

    /// Private notice to one player.
    pub fn notify(&self, id: PlayerId, message: impl Into<String>) {
        self.hub.send_to(id, Event::Message { message: message.into() });
    }

    pub fn send_hand(&self, id: PlayerId) {
        if let Some(player) = self.state.lookup(id) {
            self.hub.send_to(id, Event::Hand { cards: player.hand().to_vec() });
        }
    }

    pub fn send_hands(&self) {
        for player in self.state.players() {
            self.send_hand(player.id());
        }
    }

    pub fn credit(&mut self, id: PlayerId, amount: u32) -> Result<(), CoupError> {
        self.state.credit(id, amount)?;
        self.broadcast_state();
        Ok(())
    }

    pub fn debit(&mut self, id: PlayerId, amount: u32) -> Result<(), CoupError> {
        self.state.debit(id, amount)?;
        self.broadcast_state();
        Ok(())
    }

    pub fn transfer(&mut self, from: PlayerId, to: PlayerId, amount: u32) -> Result<(), CoupError> {
        self.state.transfer(from, to, amount)?;
        self.broadcast_state();
        Ok(())
    }

    pub fn draw(&mut self, id: PlayerId) -> Result<Card, CoupError> {
        let card = self.state.draw_card(id)?;
        self.send_hand(id);
        self.broadcast_state();
        Ok(card)
    }

    pub fn return_card(&mut self, id: PlayerId, card_id: CardId) -> Result<Card, CoupError> {
        let card = self.state.return_card(id, card_id)?;
        self.send_hand(id);
        self.broadcast_state();
        Ok(card)
    }

    /// Discard-and-redraw of a card proven by a reveal.
    pub fn redraw(&mut self, id: PlayerId, card_id: CardId) -> Result<Card, CoupError> {
        let card = self.state.redraw(id, card_id)?;
        self.log(format!("{} shuffles the revealed card back and draws a new one.", self.name_of(id)));
        self.send_hand(id);
        self.broadcast_state();
        Ok(card)
    }

    pub fn discard(&mut self, id: PlayerId, card_id: CardId) -> Result<Discard, CoupError> {
        let discard = self.state.discard(id, card_id)?;
        let name = self.name_of(id);

        self.hub.broadcast(Event::CardDiscarded { player: id, card: discard.card });
        self.log(format!("{} loses a {}.", name, discard.card.character));
        self.send_hand(id);

        if discard.eliminated {
            self.hub.broadcast(Event::PlayerEliminated { player: id });
            self.log(format!("{} has been eliminated.", name));
        }

        self.broadcast_state();
        Ok(discard)
    }

    /// Takes every departed participant still in rotation out of the match.
    pub fn remove_departed(&mut self) -> Result<(), CoupError> {
        let departed: Vec<PlayerId> = self.hub
            .departed()
            .into_iter()
            .filter(|id| self.state.is_active(*id))
            .collect();

        for id in departed {
            self.state.remove_player(id)?;
            self.hub.broadcast(Event::PlayerEliminated { player: id });
            self.log(format!("{} left the match.", self.name_of(id)));
            self.broadcast_state();
        }
        Ok(())
    }

    /// Reveals every card a player still holds.
    pub fn discard_all(&mut self, id: PlayerId) -> Result<(), CoupError> {
        let held: Vec<CardId> = self.state.player(id)?.hand().iter().map(|card| card.id).collect();
        for card_id in held {
            self.discard(id, card_id)?;
        }
        Ok(())
    }

    pub async fn ask(&mut self, to: PlayerId, ask: Ask, default: impl Into<String>) -> Answer {
        let timeout = self.config.prompt_timeout();
        self.hub.ask(to, ask, default, timeout).await
    }

    pub async fn ask_action(&mut self, to: PlayerId, ask: Ask, default: impl Into<String>) -> Answer {
        let timeout = self.config.turn_timeout();
        self.hub.ask(to, ask, default, timeout).await
    }

    /// Challenge or block window over `eligible`, closed by a `PASS` from each.
    pub async fn objection_window(&mut self, eligible: Vec<PlayerId>, ask: Ask) -> Objection {
        let timeout = self.config.objection_timeout();
        self.hub.open_window(eligible, ask, PASS, timeout).await
    }

    /// Every active player except `excluded`, in rotation order.
    pub fn objectors(&self, excluded: PlayerId) -> Vec<PlayerId> {
        self.state.others(excluded)
    }

    /// Asks `actor` to pick one of `candidates`. Unknown answers fall back to
    /// the first candidate, as a timeout would.
    pub async fn choose_player(
        &mut self,
        actor: PlayerId,
        candidates: Vec<PlayerId>,
        message: impl Into<String>,
    ) -> Option<PlayerId> {
        let default = *candidates.first()?;
        let options = candidates
            .iter()
            .map(|&id| PromptOption::new(self.name_of(id), id.to_string()))
            .collect();

        let answer = self.ask(actor, Ask::new(PromptVariant::ChooseTarget, message, options), default.to_string()).await;

        let chosen = answer
            .value()
            .parse::<PlayerId>()
            .ok()
            .filter(|id| candidates.contains(id));

        Some(chosen.unwrap_or_else(|| {
            log::warn!("{:?} picked unknown target {:?}, using {:?}", actor, answer.value(), default);
            default
        }))
    }

    /// Asks `player` to pick one of their own cards. Timeouts and unknown
    /// answers resolve to `default`, or the first card in hand.
    pub async fn choose_card(
        &mut self,
        player: PlayerId,
        variant: PromptVariant,
        message: impl Into<String>,
        default: Option<CardId>,
    ) -> Result<CardId, CoupError> {
        let hand = self.state.player(player)?.hand().to_vec();
        self.choose_among(player, &hand, variant, message, default).await?
            .ok_or(CoupError::PlayerNotFound(player))
    }

    /// Single-choice pick over an explicit card list.
    pub async fn choose_among(
        &mut self,
        player: PlayerId,
        cards: &[Card],
        variant: PromptVariant,
        message: impl Into<String>,
        default: Option<CardId>,
    ) -> Result<Option<CardId>, CoupError> {
        let Some(first) = cards.first() else {
            return Ok(None);
        };
        let default = default.unwrap_or(first.id);
        let options = cards
            .iter()
            .map(|card| PromptOption::new(card.character.to_string(), card.id.to_string()))
            .collect();

        let answer = self.ask(player, Ask::new(variant, message, options), default.to_string()).await;

        let chosen = answer
            .value()
            .parse::<CardId>()
            .ok()
            .filter(|id| cards.iter().any(|card| card.id == *id));

        Ok(Some(chosen.unwrap_or_else(|| {
            log::warn!("{:?} picked unknown card {:?}, using {:?}", player, answer.value(), default);
            default
        })))
    }

    /// The player picks a card to reveal into the discard log. Players who
    /// are already out have nothing left to lose.
    pub async fn lose_influence(&mut self, player: PlayerId, reason: &str) -> Result<(), CoupError> {
        if !self.state.is_active(player) {
            return Ok(());
        }

        let message = format!("{reason} Choose a card to discard.");
        let card_id = self.choose_card(player, PromptVariant::DiscardCard, message, None).await?;
        self.discard(player, card_id)?;
        Ok(())
    }

    /// The claimant answers a challenge by revealing a card. A matching card
    /// is shuffled back and replaced; anything else is lost.
    pub async fn prove_claim(&mut self, claimant: PlayerId, character: Character) -> Result<bool, CoupError> {
        let default = self.state.player(claimant)?.find_character(character).map(|card| card.id);
        let message = format!("Your claim to be the {character} is challenged. Reveal a card.");
        let card_id = self.choose_card(claimant, PromptVariant::RevealCard, message, default).await?;

        let revealed = self.state
            .player(claimant)?
            .hand()
            .iter()
            .find(|card| card.id == card_id)
            .copied()
            .ok_or(CoupError::CardNotFound { player: claimant, card: card_id })?;

        if revealed.character == character {
            self.log(format!("{} reveals the {}.", self.name_of(claimant), character));
            self.redraw(claimant, card_id)?;
            Ok(true)
        } else {
            self.log(format!("{} was bluffing the {}.", self.name_of(claimant), character));
            self.discard(claimant, card_id)?;
            Ok(false)
        }
    }

    /// Full challenge: the claimant proves or loses a card, and a proven
    /// claim costs the challenger a card. Returns whether the claim held.
    pub async fn resolve_challenge(
        &mut self,
        claimant: PlayerId,
        challenger: PlayerId,
        character: Character,
    ) -> Result<bool, CoupError> {
        self.log(format!(
            "{} challenges {}'s claim to be the {}.",
            self.name_of(challenger),
            self.name_of(claimant),
            character,
        ));

        let proven = self.prove_claim(claimant, character).await?;
        if proven {
            let reason = format!("Your challenge against the {character} failed.");
            self.lose_influence(challenger, &reason).await?;
        }
        Ok(proven)
    }
}

#[cfg(test)]
mod tests {
    use crate::Character::{Ambassador, Contessa, Duke};
    use crate::event::Event;
    use crate::testing::{Harness, Script};
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn lose_influence_defaults_to_first_card() {
        let mut harness = Harness::new(vec![Script::silent(), Script::silent(), Script::silent()]);
        let [a, _, _] = harness.ids3();
        harness.stack(a, &[Duke, Contessa]);

        harness.table.lose_influence(a, "Couped.").await.unwrap();

        let state = harness.table.state();
        assert_eq!(state.player(a).unwrap().hand()[0].character, Contessa);
        assert_eq!(state.discards()[0].character, Duke);
        assert_eq!(state.card_count(), state.total_cards());
    }

    #[tokio::test(start_paused = true)]
    async fn lose_influence_honours_the_choice() {
        let mut harness = Harness::new(vec![Script::discarding(Contessa), Script::silent()]);
        let [a, _] = harness.ids2();
        harness.stack(a, &[Duke, Contessa]);

        harness.table.lose_influence(a, "Couped.").await.unwrap();

        assert_eq!(harness.table.state().player(a).unwrap().hand()[0].character, Duke);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_claimant_reveals_the_claimed_card() {
        let mut harness = Harness::new(vec![Script::silent(), Script::silent()]);
        let [a, _] = harness.ids2();
        harness.stack(a, &[Contessa, Ambassador]);

        assert!(harness.table.prove_claim(a, Ambassador).await.unwrap());
        assert_eq!(harness.table.state().player(a).unwrap().hand().len(), 2);
        assert!(harness.table.state().discards().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn discard_broadcasts_elimination() {
        let mut harness = Harness::new(vec![Script::silent(), Script::silent(), Script::silent()]);
        let [a, b, _] = harness.ids3();
        harness.stack(b, &[Duke]);
        let card = harness.table.state().player(b).unwrap().hand()[0];

        assert!(harness.table.discard(b, card.id).unwrap().eliminated);
        harness.settle().await;

        let events = harness.events(a);
        assert!(events.contains(&Event::PlayerEliminated { player: b }));
        assert!(events.contains(&Event::CardDiscarded { player: b, card }));
        assert!(matches!(events.last(), Some(Event::State(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn choose_player_rejects_unlisted_target() {
        let mut harness = Harness::new(vec![Script::targeting_label("p2"), Script::silent(), Script::silent()]);
        let [a, b, _] = harness.ids3();

        // p2 exists but is not a candidate, so the first candidate is used
        let chosen = harness.table.choose_player(a, vec![b], "Pick").await;
        assert_eq!(chosen, Some(b));
    }
}
