//! Plain-text rendition of the whole letter, for `sakura-letter print`.
//!
//! Walks the session through the same operations the player uses, driving
//! each fetch to completion before moving on.

use std::fmt::Write;

use crate::narrative::{Session, Stage};
use crate::provider::script::DECISION_QUESTION;
use crate::provider::Fetch;

async fn drive(session: &mut Session, fetch: Option<Fetch>) {
    if let Some(fetch) = fetch {
        let resolution = fetch.await;
        session.complete(resolution);
    }
}

/// Reveal the letter, read every chapter, and return it as text.
pub async fn read_through(session: &mut Session) -> String {
    let fetch = session.reveal();
    drive(session, fetch).await;

    let mut out = String::new();
    loop {
        match session.stage() {
            Stage::Slide(index) => {
                let title = session.title(index).unwrap_or_default();
                let text = session.message(index).unwrap_or_default();
                let _ = writeln!(out, "Capítulo {} · {title}", index + 1);
                let _ = writeln!(out, "  “{text}”");
                let _ = writeln!(out);
            }
            Stage::Decision => {
                let _ = writeln!(out, "{DECISION_QUESTION}");
                break;
            }
            Stage::Intro | Stage::Resolved(_) => break,
        }

        let before = session.state().current;
        let fetch = session.advance();
        drive(session, fetch).await;
        if session.state().current == before {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::narrative::Variant;
    use crate::provider::script::{BATCH_FALLBACKS, FALLBACKS, SLIDE_COUNT, TITLES};
    use crate::provider::OfflineGenerator;

    #[tokio::test]
    async fn letter_transcript_lists_every_chapter() {
        let mut session = Session::new(Arc::new(OfflineGenerator), Variant::Letter);
        let text = read_through(&mut session).await;

        for i in 0..SLIDE_COUNT {
            assert!(text.contains(TITLES[i]));
            assert!(text.contains(FALLBACKS[i]));
        }
        assert!(!text.contains(DECISION_QUESTION));
        assert_eq!(session.state().current, SLIDE_COUNT - 1);
    }

    #[tokio::test]
    async fn proposal_transcript_ends_with_question() {
        let mut session = Session::new(Arc::new(OfflineGenerator), Variant::Proposal);
        let text = read_through(&mut session).await;

        assert!(text.contains(BATCH_FALLBACKS[5]));
        assert!(text.trim_end().ends_with(DECISION_QUESTION));
    }
}
