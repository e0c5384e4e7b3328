use log::debug;
use serde::Serialize;

use crate::clock::SessionClock;
use crate::error::{EngineError, EngineResult};
use crate::pair_set::PairSet;
use crate::session::SessionStatus;

/// One recorded pairing attempt, by pair index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub term_index: usize,
    pub definition_index: usize,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub correct: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub correct_count: usize,
    pub wrong_count: usize,
    pub total: usize,
    pub elapsed_ms: u64,
    pub status: SessionStatus,
}

/// Term/definition matching used by the association and memory modes.
///
/// Indices always refer to positions in the `PairSet`, never to a shuffled
/// display order, so a caller can present terms and definitions in any
/// order it likes.
#[derive(Debug, Clone)]
pub struct MatchSession {
    pairs: PairSet,
    attempts: Vec<Attempt>,
    correct_count: usize,
    wrong_count: usize,
    matched_terms: Vec<bool>,
    matched_definitions: Vec<bool>,
    status: SessionStatus,
    clock: SessionClock,
}

impl MatchSession {
    pub fn new(pairs: PairSet) -> Self {
        Self::with_clock(pairs, SessionClock::new())
    }

    pub fn with_clock(pairs: PairSet, clock: SessionClock) -> Self {
        let n = pairs.size();
        Self {
            pairs,
            attempts: Vec::new(),
            correct_count: 0,
            wrong_count: 0,
            matched_terms: vec![false; n],
            matched_definitions: vec![false; n],
            status: SessionStatus::NotStarted,
            clock,
        }
    }

    /// Begin (or restart) a play-through with fresh counters and clock
    pub fn start(&mut self) {
        let n = self.pairs.size();
        self.attempts.clear();
        self.correct_count = 0;
        self.wrong_count = 0;
        self.matched_terms = vec![false; n];
        self.matched_definitions = vec![false; n];
        self.clock.reset();
        self.clock.start();
        self.status = SessionStatus::InProgress;
    }

    /// Try to pair the term of pair `term_index` with the definition of pair
    /// `definition_index`. The first attempt on a fresh session starts it.
    ///
    /// Terms and definitions that are already matched cannot be used again.
    pub fn submit_attempt(
        &mut self,
        term_index: usize,
        definition_index: usize,
    ) -> EngineResult<AttemptOutcome> {
        let len = self.pairs.size();
        for index in [term_index, definition_index] {
            if index >= len {
                return Err(EngineError::Index { index, len });
            }
        }

        match self.status {
            SessionStatus::Complete => {
                return Err(EngineError::invalid_state("match session is already complete"))
            }
            SessionStatus::NotStarted | SessionStatus::InProgress => {}
        }
        if self.matched_terms[term_index] {
            return Err(EngineError::invalid_state(format!(
                "term {term_index} is already matched"
            )));
        }
        if self.matched_definitions[definition_index] {
            return Err(EngineError::invalid_state(format!(
                "definition {definition_index} is already matched"
            )));
        }

        if self.status == SessionStatus::NotStarted {
            self.start();
        }

        let correct = term_index == definition_index;
        if correct {
            self.correct_count += 1;
            self.matched_terms[term_index] = true;
            self.matched_definitions[definition_index] = true;
        } else {
            self.wrong_count += 1;
        }
        self.attempts.push(Attempt {
            term_index,
            definition_index,
            correct,
        });

        let completed = self.correct_count == len;
        if completed {
            let elapsed = self.clock.stop();
            self.status = SessionStatus::Complete;
            debug!(
                "match session complete: {} correct, {} wrong in {}ms",
                self.correct_count, self.wrong_count, elapsed
            );
        }

        Ok(AttemptOutcome { correct, completed })
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            total: self.pairs.size(),
            elapsed_ms: self.clock.elapsed_ms(),
            status: self.status,
        }
    }

    pub fn pairs(&self) -> &PairSet {
        &self.pairs
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_term_matched(&self, index: usize) -> bool {
        self.matched_terms.get(index).copied().unwrap_or(false)
    }

    pub fn is_definition_matched(&self, index: usize) -> bool {
        self.matched_definitions.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimeSource;
    use crate::pair_set::RawPair;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn two_pairs() -> PairSet {
        PairSet::create(&[RawPair::new("Sol", "Estrela"), RawPair::new("Lua", "Satélite")])
            .unwrap()
    }

    fn session_with_time() -> (ManualTimeSource, MatchSession) {
        let time = ManualTimeSource::new(0);
        let clock = SessionClock::with_source(Arc::new(time.clone()));
        (time, MatchSession::with_clock(two_pairs(), clock))
    }

    #[test]
    fn new_session_is_not_started() {
        let session = MatchSession::new(two_pairs());
        let summary = session.summary();
        assert_eq!(summary.status, SessionStatus::NotStarted);
        assert_eq!(summary.correct_count, 0);
        assert_eq!(summary.wrong_count, 0);
        assert_eq!(summary.elapsed_ms, 0);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn first_attempt_starts_the_session() {
        let mut session = MatchSession::new(two_pairs());
        let outcome = session.submit_attempt(0, 1).unwrap();
        assert!(!outcome.correct);
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn mismatch_then_full_solve_freezes_clock() {
        let (time, mut session) = session_with_time();
        session.start();

        time.advance(100);
        assert!(!session.submit_attempt(0, 1).unwrap().correct);
        assert_eq!(session.summary().wrong_count, 1);
        assert_eq!(session.status(), SessionStatus::InProgress);

        time.advance(100);
        assert!(session.submit_attempt(1, 1).unwrap().correct);
        time.advance(100);
        let last = session.submit_attempt(0, 0).unwrap();
        assert!(last.correct && last.completed);

        let summary = session.summary();
        assert_eq!(summary.status, SessionStatus::Complete);
        assert_eq!(summary.correct_count, 2);
        assert_eq!(summary.elapsed_ms, 300);

        time.advance(10_000);
        assert_eq!(session.summary(), summary);
    }

    #[test]
    fn complete_session_rejects_attempts() {
        let mut session = MatchSession::new(two_pairs());
        session.submit_attempt(0, 0).unwrap();
        session.submit_attempt(1, 1).unwrap();

        let before = session.summary();
        assert_matches!(session.submit_attempt(0, 1), Err(EngineError::InvalidState(_)));
        assert_eq!(session.summary(), before);
    }

    #[test]
    fn out_of_range_indices_leave_state_untouched() {
        let mut session = MatchSession::new(two_pairs());
        assert_matches!(
            session.submit_attempt(2, 0),
            Err(EngineError::Index { index: 2, len: 2 })
        );
        assert_matches!(
            session.submit_attempt(0, 7),
            Err(EngineError::Index { index: 7, len: 2 })
        );
        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert!(session.attempts().is_empty());
    }

    #[test]
    fn matched_items_cannot_be_reused() {
        let mut session = MatchSession::new(two_pairs());
        session.submit_attempt(0, 0).unwrap();

        assert_matches!(session.submit_attempt(0, 0), Err(EngineError::InvalidState(_)));
        assert_matches!(session.submit_attempt(1, 0), Err(EngineError::InvalidState(_)));
        assert_eq!(session.summary().correct_count, 1);
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn counts_add_up_to_recorded_attempts() {
        let mut session = MatchSession::new(
            PairSet::create(&[
                RawPair::new("a", "1"),
                RawPair::new("b", "2"),
                RawPair::new("c", "3"),
            ])
            .unwrap(),
        );
        let calls = [(0, 1), (0, 2), (1, 1), (2, 0), (0, 0), (2, 2)];
        for (t, d) in calls {
            session.submit_attempt(t, d).unwrap();
        }
        let summary = session.summary();
        assert_eq!(summary.correct_count + summary.wrong_count, calls.len());
        assert_eq!(session.attempts().len(), calls.len());
        assert!(summary.status.is_complete());
    }

    #[test]
    fn restart_clears_progress() {
        let mut session = MatchSession::new(two_pairs());
        session.submit_attempt(0, 0).unwrap();
        session.submit_attempt(0, 1).unwrap_err();
        session.start();

        let summary = session.summary();
        assert_eq!(summary.correct_count, 0);
        assert_eq!(summary.wrong_count, 0);
        assert!(!session.is_term_matched(0));
        assert_eq!(summary.status, SessionStatus::InProgress);
    }
}
