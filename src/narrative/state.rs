use crate::provider::script::SLIDE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

/// Where the reader is in the letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intro,
    Slide(usize),
    Decision,
    Resolved(Choice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// One generation per slide, issued when the slide is first shown.
    Lazy,
    /// One generation for the whole letter, issued on reveal.
    Batch,
}

/// The two shapes of the letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Six chapters fetched lazily; the last chapter ends the letter.
    #[default]
    Letter,
    /// Six chapters fetched in one batch, followed by a yes/no question.
    Proposal,
}

impl Variant {
    pub fn policy(self) -> FetchPolicy {
        match self {
            Variant::Letter => FetchPolicy::Lazy,
            Variant::Proposal => FetchPolicy::Batch,
        }
    }

    pub fn has_decision(self) -> bool {
        matches!(self, Variant::Proposal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NarrativeState {
    pub revealed: bool,
    /// In `0..=SLIDE_COUNT`; `SLIDE_COUNT` is the decision slide.
    pub current: usize,
    pub loading: bool,
    pub final_choice: Option<Choice>,
}

impl NarrativeState {
    pub fn stage(&self) -> Stage {
        if !self.revealed {
            Stage::Intro
        } else if let Some(choice) = self.final_choice {
            Stage::Resolved(choice)
        } else if self.current >= SLIDE_COUNT {
            Stage::Decision
        } else {
            Stage::Slide(self.current)
        }
    }
}
