use crate::action::{ActionKind, Registry};
use crate::error::CoupError;
use crate::event::{Event, PromptVariant};
use crate::negotiation::Ask;
use crate::player::PlayerId;
use crate::table::Table;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingChoice,
    Dispatching(ActionKind),
    TurnComplete,
    MatchEnded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    pub winner: Option<PlayerId>,
    pub turns: usize,
}

/// Runs a match one turn at a time: offer the legal actions, dispatch the
/// chosen one to its handler, advance the rotation, stop at one survivor.
#[derive(Debug)]
pub struct TurnDriver {
    table: Table,
    registry: Registry,
    phase: Phase,
    faults: usize,
    outcome: Option<MatchOutcome>,
}

impl TurnDriver {
    pub fn new(table: Table) -> Self {
        Self::with_registry(table, Registry::default())
    }

    pub fn with_registry(table: Table, registry: Registry) -> Self {
        Self {
            table,
            registry,
            phase: Phase::AwaitingChoice,
            faults: 0,
            outcome: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn run(mut self) -> Result<MatchOutcome, CoupError> {
        loop {
            if let Some(outcome) = self.step().await? {
                return Ok(outcome);
            }
        }
    }

    /// Plays a single turn. Returns the outcome once the match is over; a
    /// finished match is never offered another turn.
    pub async fn step(&mut self) -> Result<Option<MatchOutcome>, CoupError> {
        if self.outcome.is_none() {
            self.table.remove_departed()?;
        }
        if let Some(outcome) = self.finish() {
            return Ok(Some(outcome));
        }
        self.table.state_mut().begin_turn();

        let Some(actor) = self.table.state().current_player().map(|player| player.id()) else {
            return Ok(self.finish());
        };

        self.phase = Phase::AwaitingChoice;
        self.table.hub().broadcast(Event::TurnStarted { player: actor });
        log::info!(
            "[{}] turn {}: {}",
            self.table.state().id(),
            self.table.state().turn_count(),
            self.table.name_of(actor),
        );

        let kind = self.choose_action(actor).await?;
        self.phase = Phase::Dispatching(kind);

        let handler = self.registry.get(kind).ok_or(CoupError::NoLegalAction(actor))?;
        match handler.run(&mut self.table, actor).await {
            Ok(()) => {
                self.faults = 0;
                self.complete_turn();
            }
            Err(e) if e.is_fatal() => {
                log::error!("[{}] match aborted: {}", self.table.state().id(), e);
                return Err(e);
            }
            Err(e) => {
                log::error!("[{}] {:?} by {:?} failed: {}", self.table.state().id(), kind, actor, e);
                self.table.notify(actor, format!("Your {kind} could not be completed."));
                self.faults += 1;

                if self.faults > self.table.config().max_reoffers {
                    return Err(CoupError::TooManyFaults { player: actor, faults: self.faults });
                }
                if !self.table.state().is_active(actor) {
                    self.faults = 0;
                    self.complete_turn();
                }
            }
        }

        Ok(self.finish())
    }

    /// Offers the legal set and re-validates the reply against the state as
    /// it stands afterwards. Illegal picks are reported and re-offered, up to
    /// `max_reoffers` times, then the first legal action is taken.
    async fn choose_action(&mut self, actor: PlayerId) -> Result<ActionKind, CoupError> {
        let mut rejected = 0;

        loop {
            let legal = self.registry.legal(&self.table, actor);
            let fallback = *legal.first().ok_or(CoupError::NoLegalAction(actor))?;
            let options = legal.iter().map(ActionKind::option).collect();

            let ask = Ask::new(PromptVariant::ChooseAction, "Choose your action.", options);
            let answer = self.table.ask_action(actor, ask, fallback.as_str()).await;

            let legal = self.registry.legal(&self.table, actor);
            let fallback = *legal.first().ok_or(CoupError::NoLegalAction(actor))?;

            match answer.value().parse::<ActionKind>() {
                Ok(kind) if legal.contains(&kind) => {
                    if answer.timed_out() {
                        log::info!("{:?} did not choose in time, taking {:?}", actor, kind);
                    }
                    return Ok(kind);
                }
                _ => {
                    rejected += 1;
                    log::warn!("{:?} chose illegal action {:?}", actor, answer.value());
                    self.table.notify(actor, format!("{} is not a legal action right now.", answer.value()));

                    if rejected > self.table.config().max_reoffers {
                        self.table.notify(actor, format!("Taking {fallback} instead."));
                        return Ok(fallback);
                    }
                }
            }
        }
    }

    fn complete_turn(&mut self) {
        self.phase = Phase::TurnComplete;
        self.table.state_mut().advance_turn();
        if !self.table.state().is_over() {
            self.table.broadcast_state();
        }
    }

    fn finish(&mut self) -> Option<MatchOutcome> {
        if self.outcome.is_none() && self.table.state().is_over() {
            let state = self.table.state();
            let outcome = MatchOutcome {
                winner: state.winner().map(|player| player.id()),
                turns: state.turn_count(),
            };

            match outcome.winner {
                Some(winner) => self.table.log(format!("{} wins the match.", self.table.name_of(winner))),
                None => self.table.log("The match ends with no survivor."),
            }

            self.phase = Phase::MatchEnded;
            self.table.state_mut().begin_turn();
            self.table.broadcast_state();
            self.table.hub().broadcast(Event::MatchEnded);
            self.outcome = Some(outcome);
        }

        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use async_trait::async_trait;
    use crate::action::Handler;
    use crate::Character::{Contessa, Duke};
    use crate::config::MatchConfig;
    use crate::event::Prompt;
    use crate::testing::{Harness, Move, Script};
    use super::*;

    type Records = HashMap<PlayerId, Arc<Mutex<Vec<Event>>>>;

    fn events(records: &Records, id: PlayerId) -> Vec<Event> {
        records[&id].lock().unwrap().clone()
    }

    fn action_prompts(records: &Records, id: PlayerId) -> Vec<Prompt> {
        events(records, id)
            .into_iter()
            .filter_map(|event| match event {
                Event::Prompt(prompt) if prompt.variant == PromptVariant::ChooseAction => Some(prompt),
                _ => None,
            })
            .collect()
    }

    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ten_coins_offer_only_coup() {
        let mut harness = Harness::new(vec![Script::silent(), Script::silent()]);
        let [a, b] = harness.ids2();
        harness.coins(a, 10);
        let (mut driver, records) = harness.into_driver();

        assert_eq!(driver.step().await.unwrap(), None);
        settle().await;

        let offered = action_prompts(&records, a);
        let values: Vec<&str> = offered[0].options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["COUP"]);
        assert_eq!(driver.table().state().player(a).unwrap().coins(), 3);
        assert_eq!(driver.table().state().player(b).unwrap().hand().len(), 1);
        assert_eq!(driver.table().state().current_player().unwrap().id(), b);
    }

    #[tokio::test(start_paused = true)]
    async fn last_elimination_ends_the_match() {
        let mut harness = Harness::new(vec![Script::acting(ActionKind::Coup), Script::silent()]);
        let [a, b] = harness.ids2();
        harness.coins(a, 7);
        harness.stack(b, &[Contessa]);
        let (mut driver, records) = harness.into_driver();

        let outcome = driver.step().await.unwrap().unwrap();
        assert_eq!(outcome, MatchOutcome { winner: Some(a), turns: 1 });
        assert_eq!(driver.phase(), Phase::MatchEnded);

        // later steps are answered from the recorded outcome
        assert_eq!(driver.step().await.unwrap(), Some(outcome));
        settle().await;

        for id in [a, b] {
            let events = events(&records, id);
            let end = events.iter().position(|e| *e == Event::MatchEnded).unwrap();
            assert_eq!(events.iter().filter(|e| **e == Event::MatchEnded).count(), 1);
            assert!(events[end..].iter().all(|e| !matches!(e, Event::Prompt(_))));
            assert!(matches!(events[end - 1], Event::State(_)));
        }
        assert_eq!(action_prompts(&records, a).len(), 1);
        assert!(action_prompts(&records, b).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_takes_the_first_legal_action() {
        let harness = Harness::new(vec![Script::silent(), Script::silent()]);
        let [a, b] = harness.ids2();
        let (mut driver, _) = harness.into_driver();

        let started = tokio::time::Instant::now();
        driver.step().await.unwrap();

        assert!(started.elapsed() >= driver.table().config().turn_timeout());
        assert_eq!(driver.table().state().player(a).unwrap().coins(), 3);
        assert_eq!(driver.table().state().current_player().unwrap().id(), b);
        assert_eq!(driver.table().state().turn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn illegal_choice_is_reported_and_reoffered() {
        let script = Script::silent()
            .then(PromptVariant::ChooseAction, Move::Value("ASSASSINATE".into()))
            .act(ActionKind::Income);
        let harness = Harness::new(vec![script, Script::silent()]);
        let [a, _] = harness.ids2();
        let (mut driver, records) = harness.into_driver();

        driver.step().await.unwrap();
        settle().await;

        assert_eq!(action_prompts(&records, a).len(), 2);
        assert!(events(&records, a).iter().any(|e| matches!(e, Event::Message { .. })));
        assert_eq!(driver.table().state().player(a).unwrap().coins(), 3);
        assert_eq!(driver.table().state().turn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_nonsense_falls_back_after_reoffers() {
        let config = MatchConfig { max_reoffers: 1, ..MatchConfig::default() };
        let script = Script::silent().always(PromptVariant::ChooseAction, Move::Value("NAP".into()));
        let harness = Harness::with_config(config, vec![script, Script::silent()]);
        let [a, _] = harness.ids2();
        let (mut driver, records) = harness.into_driver();

        driver.step().await.unwrap();
        settle().await;

        assert_eq!(action_prompts(&records, a).len(), 2);
        assert_eq!(driver.table().state().player(a).unwrap().coins(), 3);
    }

    struct Broken;

    #[async_trait]
    impl Handler for Broken {
        fn kind(&self) -> ActionKind {
            ActionKind::Income
        }

        fn can_execute(&self, _: &Table, _: PlayerId) -> bool {
            true
        }

        async fn run(&self, table: &mut Table, actor: PlayerId) -> Result<(), CoupError> {
            table.debit(actor, 100)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn handler_faults_do_not_advance_the_turn() {
        let harness = Harness::new(vec![Script::acting(ActionKind::Income), Script::silent()]);
        let [a, _] = harness.ids2();
        let (table, records) = {
            let (driver, records) = harness.into_driver();
            (driver.table, records)
        };
        let registry = Registry::new(vec![Box::new(Broken)]);
        let mut driver = TurnDriver::with_registry(table, registry);

        assert_eq!(driver.step().await.unwrap(), None);
        settle().await;

        let state = driver.table().state();
        assert_eq!(state.current_player().unwrap().id(), a);
        assert_eq!(state.turn_count(), 0);
        assert_eq!(state.player(a).unwrap().coins(), 2);
        assert!(events(&records, a).iter().any(|e| matches!(e, Event::Message { .. })));

        let err = driver.run().await.unwrap_err();
        assert!(matches!(err, CoupError::TooManyFaults { player, .. } if player == a));
    }

    #[tokio::test(start_paused = true)]
    async fn departed_player_is_skipped() {
        let income = || Script::silent().always(PromptVariant::ChooseAction, Move::Value("INCOME".into()));
        let harness = Harness::new(vec![income(), Script::leaving(), income()]);
        let [a, b, c] = harness.ids3();
        harness.settle().await;
        let (mut driver, records) = harness.into_driver();

        let started = tokio::time::Instant::now();
        driver.step().await.unwrap();
        driver.step().await.unwrap();
        driver.step().await.unwrap();
        settle().await;

        let state = driver.table().state();
        assert!(started.elapsed() < driver.table().config().turn_timeout());
        assert!(!state.is_active(b));
        assert!(state.lookup(b).unwrap().hand().is_empty());
        assert_eq!(state.card_count(), state.total_cards());
        assert_eq!(state.player(a).unwrap().coins(), 4);
        assert_eq!(state.player(c).unwrap().coins(), 3);
        assert_eq!(state.current_player().unwrap().id(), c);
        assert!(events(&records, a).iter().any(|e| *e == Event::PlayerEliminated { player: b }));
    }

    #[tokio::test(start_paused = true)]
    async fn match_ends_when_everyone_else_leaves() {
        let harness = Harness::new(vec![Script::leaving(), Script::silent()]);
        let [a, b] = harness.ids2();
        harness.settle().await;
        let (mut driver, records) = harness.into_driver();

        let outcome = driver.step().await.unwrap().unwrap();
        settle().await;

        assert_eq!(outcome, MatchOutcome { winner: Some(b), turns: 0 });
        assert!(!driver.table().state().is_active(a));
        assert!(action_prompts(&records, b).is_empty());
        assert!(events(&records, b).contains(&Event::MatchEnded));
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_skips_a_player_eliminated_out_of_turn() {
        let harness = Harness::new(vec![
            Script::acting(ActionKind::Coup).target("p1"),
            Script::silent(),
            Script::silent(),
        ]);
        let [a, b, c] = harness.ids3();
        let (mut driver, _) = harness.into_driver();
        driver.table.state_mut().set_coins(a, 7);
        driver.table.state_mut().stack_hand(b, &[Duke]);

        driver.step().await.unwrap();

        let state = driver.table().state();
        assert!(!state.is_active(b));
        assert_eq!(state.current_player().unwrap().id(), c);
        assert_eq!(state.turn_count(), 1);
    }
}
