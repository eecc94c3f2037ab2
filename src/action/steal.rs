use async_trait::async_trait;
use crate::action::{ask_defense, below_forced_coup, block_holds, ActionKind, Defense, Handler, STEAL};
use crate::card::Character::{Ambassador, Captain};
use crate::error::CoupError;
use crate::player::PlayerId;
use crate::table::Table;

/// Claims the Captain to take two coins from a player holding at least two.
/// The target may accept, challenge the claim, or block as Captain or
/// Ambassador.
pub struct Steal;

impl Steal {
    fn targets(table: &Table, actor: PlayerId) -> Vec<PlayerId> {
        table
            .objectors(actor)
            .into_iter()
            .filter(|&id| table.state().player(id).map(|p| p.coins() >= STEAL).unwrap_or(false))
            .collect()
    }

    fn take(table: &mut Table, actor: PlayerId, target: PlayerId) -> Result<(), CoupError> {
        if !table.state().is_active(target) {
            table.log(format!("{} is out; there is nothing left to steal.", table.name_of(target)));
            return Ok(());
        }

        let amount = table.state().player(target)?.coins().min(STEAL);
        table.transfer(target, actor, amount)?;
        table.log(format!("{} steals {} coins from {}.", table.name_of(actor), amount, table.name_of(target)));
        Ok(())
    }
}

#[async_trait]
impl Handler for Steal {
    fn kind(&self) -> ActionKind {
        ActionKind::Steal
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        below_forced_coup(table, actor) && !Self::targets(table, actor).is_empty()
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        let candidates = Self::targets(table, actor);
        let target = table
            .choose_player(actor, candidates, "Choose a player to steal from.")
            .await
            .ok_or(CoupError::NoValidTarget(ActionKind::Steal))?;

        table.log(format!("{} claims the Captain to steal from {}.", table.name_of(actor), table.name_of(target)));

        match ask_defense(table, actor, target, ActionKind::Steal, &[Captain, Ambassador]).await {
            Defense::Accept => Self::take(table, actor, target),
            Defense::Challenge => {
                if table.resolve_challenge(actor, target, Captain).await? {
                    Self::take(table, actor, target)
                } else {
                    Ok(())
                }
            }
            Defense::Block(character) => {
                if block_holds(table, target, ActionKind::Steal, character).await? {
                    table.log(format!("{}'s steal is blocked.", table.name_of(actor)));
                    Ok(())
                } else {
                    Self::take(table, actor, target)
                }
            }
        }
    }
}
