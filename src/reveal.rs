//! Word-by-word reveal of a completed answer.
//!
//! A [`Reveal`] is one timeline per turn: word `i` is emitted `step * i`
//! after the first, and the whole sequence stops as soon as its
//! cancellation token fires.  Starting a new reveal cancels the previous
//! one, so words from two answers never interleave.

use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::chat::TurnId;

/// Delay between consecutive words.
pub const DEFAULT_REVEAL_STEP: Duration = Duration::from_millis(75);

/// One word of a reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    /// Turn the word belongs to.
    pub turn_id: TurnId,
    /// Position of the word in the answer.
    pub index: usize,
    /// The word, without its trailing separator.
    pub word: String,
}

/// A cancellable scheduled sequence of words for one turn.
#[derive(Debug)]
pub struct Reveal {
    turn_id: TurnId,
    words: Vec<String>,
    step: Duration,
    token: CancellationToken,
}

impl Reveal {
    /// Splits `text` on single spaces and schedules the pieces `step` apart.
    pub fn new(turn_id: TurnId, text: &str, step: Duration) -> Self {
        let words = if text.is_empty() {
            Vec::new()
        } else {
            text.split(' ').map(str::to_string).collect()
        };
        Self {
            turn_id,
            words,
            step,
            token: CancellationToken::new(),
        }
    }

    /// Turn this reveal belongs to.
    pub fn turn_id(&self) -> TurnId {
        self.turn_id
    }

    /// The scheduled words.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of scheduled words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if there is nothing to reveal.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Delay between consecutive words.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Offset of word `index` from the start of the reveal.
    pub fn offset(&self, index: usize) -> Duration {
        self.step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// A handle that cancels this reveal.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stops the reveal; no further words are emitted.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the reveal has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drives the reveal as a stream of words on the tokio timer.
    ///
    /// The stream ends after the last word or as soon as the reveal is
    /// cancelled, whichever comes first.
    pub fn into_stream(self) -> BoxStream<'static, RevealStep> {
        stream::unfold((self, 0usize), |(reveal, index)| async move {
            if index >= reveal.words.len() || reveal.token.is_cancelled() {
                return None;
            }
            if index > 0 {
                tokio::select! {
                    _ = reveal.token.cancelled() => return None,
                    _ = tokio::time::sleep(reveal.step) => {}
                }
            }
            let step = RevealStep {
                turn_id: reveal.turn_id,
                index,
                word: reveal.words[index].clone(),
            };
            Some((step, (reveal, index + 1)))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn splits_on_single_spaces() {
        let reveal = Reveal::new(TurnId(1), "a  b c", DEFAULT_REVEAL_STEP);
        assert_eq!(reveal.words(), &["a", "", "b", "c"]);
        assert_eq!(reveal.len(), 4);
        assert!(Reveal::new(TurnId(1), "", DEFAULT_REVEAL_STEP).is_empty());
    }

    #[test]
    fn offsets_are_staggered() {
        let reveal = Reveal::new(TurnId(1), "one two three", DEFAULT_REVEAL_STEP);
        assert_eq!(reveal.offset(0), Duration::ZERO);
        assert_eq!(reveal.offset(1), Duration::from_millis(75));
        assert_eq!(reveal.offset(2), Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn words_arrive_on_schedule() {
        let reveal = Reveal::new(TurnId(4), "one two three", DEFAULT_REVEAL_STEP);
        let start = Instant::now();
        let mut stream = reveal.into_stream();
        let mut seen = Vec::new();
        while let Some(step) = stream.next().await {
            seen.push((step.index, step.word, start.elapsed()));
        }
        assert_eq!(
            seen,
            vec![
                (0, "one".to_string(), Duration::ZERO),
                (1, "two".to_string(), Duration::from_millis(75)),
                (2, "three".to_string(), Duration::from_millis(150)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_stream() {
        let reveal = Reveal::new(TurnId(9), "a b c d", DEFAULT_REVEAL_STEP);
        let token = reveal.cancellation_token();
        let mut stream = reveal.into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.turn_id, TurnId(9));
        assert_eq!(first.word, "a");

        token.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_emits_nothing() {
        let reveal = Reveal::new(TurnId(2), "x y", DEFAULT_REVEAL_STEP);
        reveal.cancel();
        assert!(reveal.is_cancelled());
        let mut stream = reveal.into_stream();
        assert!(stream.next().await.is_none());
    }
}
