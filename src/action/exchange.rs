use async_trait::async_trait;
use crate::action::{below_forced_coup, claim_holds, ActionKind, Handler};
use crate::card::{Card, Character};
use crate::error::CoupError;
use crate::event::PromptVariant;
use crate::player::PlayerId;
use crate::table::Table;

const DRAW: usize = 2;

/// Claims the Ambassador: draw two, keep as many cards as were held before
/// drawing, shuffle the rest back.
pub struct Exchange;

#[async_trait]
impl Handler for Exchange {
    fn kind(&self) -> ActionKind {
        ActionKind::Exchange
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        below_forced_coup(table, actor)
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        table.log(format!("{} claims the Ambassador to exchange cards.", table.name_of(actor)));

        if !claim_holds(table, actor, ActionKind::Exchange, Character::Ambassador).await? {
            return Ok(());
        }

        let keep = table.state().player(actor)?.hand().len();
        for _ in 0..DRAW.min(table.state().deck_size()) {
            table.draw(actor)?;
        }

        // whatever is still in the pool after the picks goes back
        let mut pool: Vec<Card> = table.state().player(actor)?.hand().to_vec();

        for round in 1..=keep {
            let message = format!("Choose a card to keep ({round} of {keep}).");
            let Some(card_id) = table.choose_among(actor, &pool, PromptVariant::KeepCard, message, None).await? else {
                break;
            };
            pool.retain(|card| card.id != card_id);
        }

        for card in pool {
            table.return_card(actor, card.id)?;
        }

        table.log(format!("{} exchanges cards with the deck.", table.name_of(actor)));
        Ok(())
    }
}
