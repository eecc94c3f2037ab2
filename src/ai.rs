use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tokio::task::JoinHandle;
use crate::event::{Event, Prompt};
use crate::hub::Seat;

/// Anything that can sit at the table: a bot, a websocket session, a test
/// script. The match never knows which.
#[async_trait]
pub trait Participant: Send {
    /// The value of the option to answer with, or `None` to let the prompt
    /// run out and take its default.
    async fn respond(&mut self, prompt: &Prompt) -> Option<String>;

    /// Every non-prompt event addressed to this participant.
    async fn notify(&mut self, event: &Event);
}

/// Runs a participant in its own task, answering prompts through its seat.
pub struct Actor {
    seat: Seat,
    participant: Box<dyn Participant>,
}

impl Actor {
    pub fn spawn(seat: Seat, participant: Box<dyn Participant>) -> JoinHandle<()> {
        tokio::spawn(Self { seat, participant }.run())
    }

    async fn run(mut self) {
        while let Some(event) = self.seat.next_event().await {
            match event {
                Event::Prompt(ref prompt) => self.act(prompt).await,
                ref event => self.participant.notify(event).await,
            }
        }
        log::debug!("{} left the table", self.seat.name());
    }

    async fn act(&mut self, prompt: &Prompt) {
        if let Some(value) = self.participant.respond(prompt).await {
            if let Err(e) = self.seat.respond(prompt.id, value) {
                log::warn!("{}: {}", self.seat.name(), e);
            }
        }
    }
}

/// Picks uniformly among whatever it is offered.
pub struct RandomBot {
    rng: Pcg64,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self { rng: Pcg64::seed_from_u64(seed) }
    }
}

#[async_trait]
impl Participant for RandomBot {
    async fn respond(&mut self, prompt: &Prompt) -> Option<String> {
        prompt
            .options
            .choose(&mut self.rng)
            .map(|option| option.value.clone())
    }

    async fn notify(&mut self, _: &Event) {}
}
