use async_trait::async_trait;
use crate::action::{below_forced_coup, ActionKind, Handler, INCOME};
use crate::error::CoupError;
use crate::player::PlayerId;
use crate::table::Table;

/// One coin, no questions asked.
pub struct Income;

#[async_trait]
impl Handler for Income {
    fn kind(&self) -> ActionKind {
        ActionKind::Income
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        below_forced_coup(table, actor)
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        table.credit(actor, INCOME)?;
        table.log(format!("{} takes Income.", table.name_of(actor)));
        Ok(())
    }
}
