//! The two bounded negotiation primitives every action is built from.
//!
//! - [`Hub::ask`]: one participant, one answer, a default on timeout.
//! - [`Hub::open_window`]: many participants may object; the first objection
//!   wins, unanimous passes close the window early, timeout means nobody
//!   objected.
//!
//! Resolution is split into pure resolvers ([`Choice`], [`Window`]) and the
//! async loop that feeds them. A resolver settles exactly once: whichever of
//! {decisive reply, expiry} arrives first wins, and every later input is a
//! no-op. Replies carry the id of the prompt they answer, so an answer that
//! shows up after its prompt closed can never leak into the next one.

use std::time::Duration;
use tokio::time::Instant;
use crate::event::{Event, Prompt, PromptId, PromptOption, PromptVariant, Reply};
use crate::hub::Hub;
use crate::player::PlayerId;

pub const CHALLENGE: &str = "CHALLENGE";
pub const PASS: &str = "PASS";
pub const BLOCK: &str = "BLOCK";
pub const ACCEPT: &str = "ACCEPT";

/// A prompt before it has been given an id and a deadline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ask {
    pub message: String,
    pub variant: PromptVariant,
    pub options: Vec<PromptOption>,
}

impl Ask {
    pub fn new(variant: PromptVariant, message: impl Into<String>, options: Vec<PromptOption>) -> Self {
        Self { message: message.into(), variant, options }
    }

    /// Challenge-or-pass, the most common question at the table.
    pub fn challenge(message: impl Into<String>) -> Self {
        Self::new(PromptVariant::Challenge, message, vec![
            PromptOption::new("Challenge", CHALLENGE),
            PromptOption::new("Pass", PASS),
        ])
    }

    pub fn block(message: impl Into<String>) -> Self {
        Self::new(PromptVariant::Block, message, vec![
            PromptOption::new("Block", BLOCK),
            PromptOption::new("Pass", PASS),
        ])
    }

    fn into_prompt(self, id: PromptId, timeout: Duration) -> Prompt {
        Prompt {
            id,
            message: self.message,
            variant: self.variant,
            options: self.options,
            expires_in_ms: timeout.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Replied(String),
    TimedOut(String),
}

impl Answer {
    pub fn value(&self) -> &str {
        match self {
            Answer::Replied(value) | Answer::TimedOut(value) => value,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Answer::Replied(value) | Answer::TimedOut(value) => value,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Answer::TimedOut(_))
    }
}

/// Resolver for a single-choice prompt.
#[derive(Debug)]
pub struct Choice {
    prompt: PromptId,
    respondent: PlayerId,
    default: String,
    outcome: Option<Answer>,
}

impl Choice {
    pub fn new(prompt: PromptId, respondent: PlayerId, default: impl Into<String>) -> Self {
        Self { prompt, respondent, default: default.into(), outcome: None }
    }

    /// Returns the answer if this reply is the one that settles the prompt.
    pub fn offer(&mut self, from: PlayerId, reply: &Reply) -> Option<Answer> {
        if self.outcome.is_some() || reply.prompt != self.prompt || from != self.respondent {
            return None;
        }
        self.settle(Answer::Replied(reply.value.clone()))
    }

    /// Returns the default if the deadline is what settles the prompt.
    pub fn expire(&mut self) -> Option<Answer> {
        if self.outcome.is_some() {
            return None;
        }
        self.settle(Answer::TimedOut(self.default.clone()))
    }

    pub fn outcome(&self) -> Option<&Answer> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Answer {
        self.outcome.unwrap_or(Answer::TimedOut(self.default))
    }

    fn settle(&mut self, answer: Answer) -> Option<Answer> {
        self.outcome = Some(answer.clone());
        Some(answer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Objection {
    Raised { objector: PlayerId, value: String },
    Unopposed,
}

impl Objection {
    pub fn objector(&self) -> Option<PlayerId> {
        match self {
            Objection::Raised { objector, .. } => Some(*objector),
            Objection::Unopposed => None,
        }
    }
}

/// Resolver for a broadcast objection window.
#[derive(Debug)]
pub struct Window {
    prompt: PromptId,
    eligible: Vec<PlayerId>,
    values: Vec<String>,
    pass: String,
    passed: Vec<PlayerId>,
    outcome: Option<Objection>,
}

impl Window {
    /// A window with nobody eligible is settled from the start.
    pub fn new(prompt: PromptId, eligible: Vec<PlayerId>, options: &[PromptOption], pass: impl Into<String>) -> Self {
        let outcome = eligible.is_empty().then_some(Objection::Unopposed);
        Self {
            prompt,
            eligible,
            values: options.iter().map(|option| option.value.clone()).collect(),
            pass: pass.into(),
            passed: Vec::new(),
            outcome,
        }
    }

    /// Replies are taken in arrival order. The first objection wins; each
    /// participant's first pass counts once; anything else is ignored.
    pub fn offer(&mut self, from: PlayerId, reply: &Reply) -> Option<Objection> {
        if self.outcome.is_some()
            || reply.prompt != self.prompt
            || !self.eligible.contains(&from)
            || self.passed.contains(&from)
            || !self.values.contains(&reply.value)
        {
            return None;
        }

        if reply.value == self.pass {
            self.passed.push(from);
            if self.passed.len() == self.eligible.len() {
                return self.settle(Objection::Unopposed);
            }
            return None;
        }

        self.settle(Objection::Raised { objector: from, value: reply.value.clone() })
    }

    pub fn expire(&mut self) -> Option<Objection> {
        if self.outcome.is_some() {
            return None;
        }
        self.settle(Objection::Unopposed)
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&Objection> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Objection {
        self.outcome.unwrap_or(Objection::Unopposed)
    }

    fn settle(&mut self, objection: Objection) -> Option<Objection> {
        self.outcome = Some(objection.clone());
        Some(objection)
    }
}

impl Hub {
    /// Sends `ask` to one participant and waits for their answer, resolving to
    /// `default` once `timeout` elapses. A participant who left gets the
    /// default straight away.
    pub async fn ask(&mut self, to: PlayerId, ask: Ask, default: impl Into<String>, timeout: Duration) -> Answer {
        let id = self.next_prompt_id();
        let deadline = Instant::now() + timeout;
        let mut choice = Choice::new(id, to, default);

        if !self.is_connected(to) {
            choice.expire();
            log::debug!("prompt {} skipped, {:?} has left", id, to);
            return choice.into_outcome();
        }

        log::debug!("prompt {} -> {:?}: {}", id, to, ask.message);
        self.send_to(to, Event::Prompt(ask.into_prompt(id, timeout)));

        loop {
            match self.recv_until(deadline).await {
                Some((from, reply)) => {
                    if choice.offer(from, &reply).is_some() {
                        break;
                    }
                    log::debug!("dropped reply {:?} from {:?} while awaiting {}", reply, from, id);
                }
                None => {
                    choice.expire();
                    log::debug!("prompt {} timed out", id);
                    break;
                }
            }
        }

        choice.into_outcome()
    }

    /// Broadcasts `ask` to `eligible` and waits for the first objection, for
    /// everyone to answer `pass`, or for `timeout`, whichever comes first.
    /// Participants who left are not asked.
    pub async fn open_window(&mut self, eligible: Vec<PlayerId>, ask: Ask, pass: &str, timeout: Duration) -> Objection {
        let eligible: Vec<PlayerId> = eligible.into_iter().filter(|id| self.is_connected(*id)).collect();
        let id = self.next_prompt_id();
        let deadline = Instant::now() + timeout;
        let mut window = Window::new(id, eligible.clone(), &ask.options, pass);

        if window.is_settled() {
            return window.into_outcome();
        }

        log::debug!("window {} -> {:?}: {}", id, eligible, ask.message);
        let prompt = ask.into_prompt(id, timeout);
        for to in eligible {
            self.send_to(to, Event::Prompt(prompt.clone()));
        }

        while !window.is_settled() {
            match self.recv_until(deadline).await {
                Some((from, reply)) => {
                    log::debug!("window {} got {:?} from {:?}", id, reply, from);
                    window.offer(from, &reply);
                }
                None => {
                    window.expire();
                    log::debug!("window {} closed on timeout", id);
                }
            }
        }

        window.into_outcome()
    }
}
