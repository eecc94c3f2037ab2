use async_trait::async_trait;
use crate::action::{ask_defense, below_forced_coup, block_holds, can_afford, ActionKind, Defense, Handler, ASSASSINATION_COST};
use crate::card::Character::{Assassin, Contessa};
use crate::error::CoupError;
use crate::player::PlayerId;
use crate::table::Table;

/// Pays three up front and claims the Assassin. The target may accept,
/// challenge the claim, or block as Contessa. Coins are gone whatever
/// happens next.
pub struct Assassinate;

#[async_trait]
impl Handler for Assassinate {
    fn kind(&self) -> ActionKind {
        ActionKind::Assassinate
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        below_forced_coup(table, actor)
            && can_afford(table, actor, ASSASSINATION_COST)
            && !table.objectors(actor).is_empty()
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        let candidates = table.objectors(actor);
        let target = table
            .choose_player(actor, candidates, "Choose a player to assassinate.")
            .await
            .ok_or(CoupError::NoValidTarget(ActionKind::Assassinate))?;

        table.debit(actor, ASSASSINATION_COST)?;
        table.log(format!("{} claims the Assassin against {}.", table.name_of(actor), table.name_of(target)));

        match ask_defense(table, actor, target, ActionKind::Assassinate, &[Contessa]).await {
            Defense::Accept => {
                table.lose_influence(target, "You have been assassinated.").await
            }
            Defense::Challenge => {
                if table.resolve_challenge(actor, target, Assassin).await? {
                    table.lose_influence(target, "You have been assassinated.").await?;
                }
                Ok(())
            }
            Defense::Block(character) => {
                if block_holds(table, target, ActionKind::Assassinate, character).await? {
                    table.log(format!("{} survives the assassination.", table.name_of(target)));
                } else if table.state().is_active(target) {
                    // a bluffed Contessa leaves nothing between the target and the blade
                    table.discard_all(target)?;
                }
                Ok(())
            }
        }
    }
}
