use tokio::sync::mpsc::*;
use tokio::time::Instant;
use crate::error::CoupError;
use crate::event::{Event, PromptId, Reply};
use crate::player::PlayerId;

/// Who an outbound event is addressed to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Audience {
    All,
    AllExcept(PlayerId),
    One(PlayerId),
}

impl Audience {
    pub fn includes(&self, id: PlayerId) -> bool {
        match *self {
            Audience::All => true,
            Audience::AllExcept(excluded) => excluded != id,
            Audience::One(target) => target == id,
        }
    }
}

/// A participant's end of the match: its identity, the events addressed to
/// it, and a way to answer prompts. Whatever transport sits in front of a
/// player (websocket, bot task, test script) holds one of these. Dropping it
/// leaves the match.
#[derive(Debug)]
pub struct Seat {
    id: PlayerId,
    name: String,
    events: UnboundedReceiver<Event>,
    replies: UnboundedSender<(PlayerId, Reply)>,
}

impl Seat {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    pub fn respond(&self, prompt: PromptId, value: impl Into<String>) -> Result<(), CoupError> {
        self.replies
            .send((self.id, Reply { prompt, value: value.into() }))
            .map_err(|_| CoupError::Disconnected(self.id))
    }
}

/// Per-match message routing. The driver owns the only `Hub`; every
/// participant talks to it through a [`Seat`].
#[derive(Debug)]
pub struct Hub {
    outboxes: Vec<(PlayerId, UnboundedSender<Event>)>,
    inbox: UnboundedReceiver<(PlayerId, Reply)>,
    sender: UnboundedSender<(PlayerId, Reply)>,
    next_prompt: u64,
}

impl Default for Hub {
    fn default() -> Self {
        let (sender, inbox) = unbounded_channel();
        Self {
            outboxes: Vec::new(),
            inbox,
            sender,
            next_prompt: 0,
        }
    }
}

impl Hub {
    /// Issues a fresh identity and the channel pair that goes with it.
    pub fn seat(&mut self, name: impl Into<String>) -> Seat {
        let id = PlayerId::new();
        let (tx, rx) = unbounded_channel();
        self.outboxes.push((id, tx));
        Seat {
            id,
            name: name.into(),
            events: rx,
            replies: self.sender.clone(),
        }
    }

    pub fn broadcast(&self, event: Event) {
        self.deliver(Audience::All, event);
    }

    pub fn send_to(&self, id: PlayerId, event: Event) {
        self.deliver(Audience::One(id), event);
    }

    pub fn send_to_all_except(&self, excluded: PlayerId, event: Event) {
        self.deliver(Audience::AllExcept(excluded), event);
    }

    pub fn deliver(&self, audience: Audience, event: Event) {
        self.outboxes
            .iter()
            .filter(|(id, _)| audience.includes(*id))
            .filter_map(|(id, outbox)| outbox.send(event.clone()).err().map(|e| (id, e)))
            .for_each(|(id, e)| log::warn!("failed delivery to {:?}: {:?}", id, e.0));
    }

    pub fn is_connected(&self, id: PlayerId) -> bool {
        self.outboxes
            .iter()
            .any(|(seat, outbox)| *seat == id && !outbox.is_closed())
    }

    /// Players whose seat has been dropped.
    pub fn departed(&self) -> Vec<PlayerId> {
        self.outboxes
            .iter()
            .filter(|(_, outbox)| outbox.is_closed())
            .map(|(id, _)| *id)
            .collect()
    }

    pub(crate) fn next_prompt_id(&mut self) -> PromptId {
        self.next_prompt += 1;
        PromptId(self.next_prompt)
    }

    /// Next reply from anyone, or `None` once `deadline` passes.
    pub(crate) async fn recv_until(&mut self, deadline: Instant) -> Option<(PlayerId, Reply)> {
        tokio::time::timeout_at(deadline, self.inbox.recv())
            .await
            .ok()
            .flatten()
    }
}
