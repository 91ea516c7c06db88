//! Slide Controller: the letter's state machine.
//!
//! `Intro --reveal--> Slide(0) --advance--> … Slide(5) --advance--> Decision
//! --choose_final--> Resolved`. The decision slide only exists for
//! [`Variant::Proposal`].
//!
//! Operations that need text return a [`Fetch`] for the caller to drive;
//! its result comes back through [`Session::complete`]. The controller itself
//! never waits.

mod state;

use std::sync::Arc;

use tracing::{debug, info};

use crate::provider::script::{SLIDE_COUNT, TITLES};
use crate::provider::{Fetch, Generate, MessageProvider, Resolution};

pub use state::{Choice, FetchPolicy, NarrativeState, Stage, Variant};

pub struct Session {
    state: NarrativeState,
    provider: MessageProvider,
    variant: Variant,
}

impl Session {
    pub fn new(generator: Arc<dyn Generate>, variant: Variant) -> Self {
        Self {
            state: NarrativeState::default(),
            provider: MessageProvider::new(generator),
            variant,
        }
    }

    pub fn state(&self) -> &NarrativeState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn provider(&self) -> &MessageProvider {
        &self.provider
    }

    pub fn title(&self, index: usize) -> Option<&'static str> {
        TITLES.get(index).copied()
    }

    pub fn message(&self, index: usize) -> Option<&str> {
        self.provider.message(index)
    }

    /// Text of the slide being viewed, once resolved.
    pub fn current_message(&self) -> Option<&str> {
        match self.stage() {
            Stage::Slide(i) => self.provider.message(i),
            _ => None,
        }
    }

    /// Open the letter. Only the first call has any effect.
    pub fn reveal(&mut self) -> Option<Fetch> {
        if self.state.revealed {
            debug!("reveal ignored: already revealed");
            return None;
        }
        self.state.revealed = true;
        info!(variant = ?self.variant, "letter revealed");

        let fetch = match self.variant.policy() {
            FetchPolicy::Lazy => self.provider.request(0),
            FetchPolicy::Batch => self.provider.request_all(),
        };
        self.refresh_loading();
        fetch
    }

    /// Move to the next slide, or to the decision slide after the last one.
    pub fn advance(&mut self) -> Option<Fetch> {
        if !self.can_navigate() {
            return None;
        }
        let last = SLIDE_COUNT - 1;
        if self.state.current < last {
            self.state.current += 1;
            debug!(slide = self.state.current, "advanced");
            let fetch = match self.variant.policy() {
                FetchPolicy::Lazy => self.provider.request(self.state.current),
                FetchPolicy::Batch => None,
            };
            self.refresh_loading();
            fetch
        } else if self.state.current == last && self.variant.has_decision() {
            self.state.current = SLIDE_COUNT;
            info!("reached the decision slide");
            self.refresh_loading();
            None
        } else {
            None
        }
    }

    /// Move back one slide. Returns whether the position changed.
    pub fn retreat(&mut self) -> bool {
        if !self.can_navigate() || self.state.current == 0 || self.state.current >= SLIDE_COUNT {
            return false;
        }
        self.state.current -= 1;
        debug!(slide = self.state.current, "retreated");
        self.refresh_loading();
        true
    }

    /// Answer the final question. Returns whether the answer was accepted.
    pub fn choose_final(&mut self, choice: Choice) -> bool {
        if self.stage() != Stage::Decision {
            debug!(?choice, stage = ?self.stage(), "choice rejected");
            return false;
        }
        self.state.final_choice = Some(choice);
        info!(?choice, "final choice made");
        true
    }

    /// Hand back the result of a [`Fetch`].
    pub fn complete(&mut self, resolution: Resolution) {
        self.provider.fulfil(resolution);
        self.refresh_loading();
    }

    fn can_navigate(&self) -> bool {
        self.state.revealed && !self.state.loading && self.state.final_choice.is_none()
    }

    fn refresh_loading(&mut self) {
        self.state.loading = match self.stage() {
            Stage::Slide(i) => !self.provider.is_resolved(i),
            _ => false,
        };
    }
}
