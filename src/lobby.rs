use rand::{thread_rng, Rng};
use crate::config::MatchConfig;
use crate::driver::TurnDriver;
use crate::error::CoupError;
use crate::event::Event;
use crate::hub::{Hub, Seat};
use crate::player::PlayerId;
use crate::state::MatchState;
use crate::table::Table;

/// Seats players before a match starts.
#[derive(Debug, Default)]
pub struct Lobby {
    config: MatchConfig,
    hub: Hub,
    seats: Vec<(PlayerId, String)>,
}

impl Lobby {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            hub: Hub::default(),
            seats: Vec::new(),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn seated(&self) -> usize {
        self.seats.len()
    }

    /// Takes a seat under a freshly issued identity.
    pub fn join(&mut self, name: impl Into<String>) -> Result<Seat, CoupError> {
        if self.seats.len() >= self.config.max_players {
            return Err(CoupError::PlayerCount {
                count: self.seats.len() + 1,
                min: self.config.min_players,
                max: self.config.max_players,
            });
        }

        let seat = self.hub.seat(name);
        log::info!("{} joined as {:?}", seat.name(), seat.id());
        self.seats.push((seat.id(), seat.name().to_string()));
        Ok(seat)
    }

    /// Deals the match and hands back the driver that will run it. Everyone
    /// is told the match started, sees the opening state and their own hand.
    pub fn start(self) -> Result<TurnDriver, CoupError> {
        self.config.validate()?;
        let seed = self.config.seed.unwrap_or_else(|| thread_rng().gen());
        let state = MatchState::new(&self.config, &self.seats, seed)?;

        log::info!("match {} starting: {} players, seed {}", state.id(), self.seats.len(), seed);

        let table = Table::new(state, self.hub, self.config);
        table.hub().broadcast(Event::MatchStarted { match_id: table.state().id() });
        table.broadcast_state();
        table.send_hands();

        Ok(TurnDriver::new(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_players_cannot_start() {
        let mut lobby = Lobby::new(MatchConfig::default());
        let _seat = lobby.join("solo").unwrap();

        assert!(matches!(lobby.start(), Err(CoupError::PlayerCount { count: 1, min: 2, .. })));
    }

    #[test]
    fn invalid_rules_cannot_start() {
        let config = MatchConfig { forced_coup_threshold: 5, ..MatchConfig::default() };
        let mut lobby = Lobby::new(config);
        lobby.join("a").unwrap();
        lobby.join("b").unwrap();

        assert!(matches!(lobby.start(), Err(CoupError::Rules(_))));
    }

    #[test]
    fn seats_are_capped() {
        let config = MatchConfig { max_players: 2, ..MatchConfig::default() };
        let mut lobby = Lobby::new(config);
        lobby.join("a").unwrap();
        lobby.join("b").unwrap();

        assert!(matches!(lobby.join("c"), Err(CoupError::PlayerCount { count: 3, max: 2, .. })));
        assert_eq!(lobby.seated(), 2);
    }

    #[test]
    fn start_announces_state_and_private_hands() {
        let config = MatchConfig { seed: Some(5), ..MatchConfig::default() };
        let mut lobby = Lobby::new(config);
        let mut seats: Vec<Seat> = (0..4).map(|i| lobby.join(format!("p{i}")).unwrap()).collect();

        let driver = lobby.start().unwrap();
        let state = driver.table().state();
        assert_eq!(state.seed(), 5);
        assert_eq!(state.deck_size(), 7);

        for seat in seats.iter_mut() {
            assert_eq!(seat.try_next_event(), Some(Event::MatchStarted { match_id: state.id() }));
            assert!(matches!(seat.try_next_event(), Some(Event::State(_))));
            match seat.try_next_event() {
                Some(Event::Hand { cards }) => assert_eq!(cards, state.player(seat.id()).unwrap().hand()),
                other => panic!("expected own hand, got {other:?}"),
            }
            assert_eq!(seat.try_next_event(), None);
        }
    }

    #[test]
    fn same_seed_deals_the_same_hands() {
        let deal = || {
            let mut lobby = Lobby::new(MatchConfig { seed: Some(99), ..MatchConfig::default() });
            let _seats: Vec<Seat> = (0..3).map(|i| lobby.join(format!("p{i}")).unwrap()).collect();
            let driver = lobby.start().unwrap();
            driver
                .table()
                .state()
                .players()
                .iter()
                .flat_map(|p| p.hand().iter().map(|card| card.character))
                .collect::<Vec<_>>()
        };

        assert_eq!(deal(), deal());
    }
}
