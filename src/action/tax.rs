use async_trait::async_trait;
use crate::action::{below_forced_coup, claim_holds, ActionKind, Handler, TAX};
use crate::card::Character;
use crate::error::CoupError;
use crate::player::PlayerId;
use crate::table::Table;

pub struct Tax;

#[async_trait]
impl Handler for Tax {
    fn kind(&self) -> ActionKind {
        ActionKind::Tax
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        below_forced_coup(table, actor)
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        table.log(format!("{} claims the Duke to collect Tax.", table.name_of(actor)));

        if !claim_holds(table, actor, ActionKind::Tax, Character::Duke).await? {
            return Ok(());
        }

        table.credit(actor, TAX)?;
        table.log(format!("{} collects Tax.", table.name_of(actor)));
        Ok(())
    }
}
