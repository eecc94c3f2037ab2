use async_trait::async_trait;
use crate::action::{below_forced_coup, block_holds, ActionKind, Handler, FOREIGN_AID};
use crate::card::Character;
use crate::error::CoupError;
use crate::negotiation::{Ask, Objection};
use crate::player::PlayerId;
use crate::table::Table;

/// Two coins unless someone claims the Duke to stop it.
pub struct ForeignAid;

#[async_trait]
impl Handler for ForeignAid {
    fn kind(&self) -> ActionKind {
        ActionKind::ForeignAid
    }

    fn can_execute(&self, table: &Table, actor: PlayerId) -> bool {
        below_forced_coup(table, actor)
    }

    async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
        table.log(format!("{} asks for Foreign Aid.", table.name_of(actor)));

        let eligible = table.objectors(actor);
        let ask = Ask::block(format!("{} wants Foreign Aid. Block as the Duke?", table.name_of(actor)));

        if let Objection::Raised { objector, .. } = table.objection_window(eligible, ask).await {
            if block_holds(table, objector, ActionKind::ForeignAid, Character::Duke).await? {
                table.log(format!("{}'s Foreign Aid is blocked.", table.name_of(actor)));
                return Ok(());
            }
        }

        table.credit(actor, FOREIGN_AID)?;
        table.log(format!("{} collects Foreign Aid.", table.name_of(actor)));
        Ok(())
    }
}
