use async_trait::async_trait;
use crate::action::{can_afford, ActionKind, Handler, COUP_COST};
use crate::error::CoupError;
use crate::player::PlayerId;
use crate::table::Table;

/// Pay seven, pick a target, they lose a card. Cannot be challenged or
/// blocked, and the only thing left on offer at the forced-coup threshold.
pub struct Coup;

#[async_trait]
impl Handler for Coup {
    fn kind(&self) -> ActionKind {
        ActionKind::Coup
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        can_afford(table, actor, COUP_COST) && !table.objectors(actor).is_empty()
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        let candidates = table.objectors(actor);
        let target = table
            .choose_player(actor, candidates, "Choose a player to Coup.")
            .await
            .ok_or(CoupError::NoValidTarget(ActionKind::Coup))?;

        table.debit(actor, COUP_COST)?;
        table.log(format!("{} launches a Coup against {}.", table.name_of(actor), table.name_of(target)));
        table.lose_influence(target, "You have been couped.").await
    }
}
