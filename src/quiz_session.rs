use log::debug;
use serde::Serialize;

use crate::clock::SessionClock;
use crate::error::{EngineError, EngineResult};
use crate::pair_set::PairSet;
use crate::session::SessionStatus;
use crate::shuffler::Shuffler;

pub const DEFAULT_OPTION_COUNT: usize = 4;
/// Options are picked with the digit keys 1-9
pub const MAX_OPTION_COUNT: usize = 9;

/// Keep an option count within `1..=MAX_OPTION_COUNT`
pub fn clamp_option_count(count: usize) -> usize {
    count.clamp(1, MAX_OPTION_COUNT)
}

/// A rendered quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    /// 1-based position in the quiz
    pub number: usize,
    pub term: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_definition: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub score: usize,
    pub answered: usize,
    pub total: usize,
    pub elapsed_ms: u64,
    pub status: SessionStatus,
}

#[derive(Debug, Clone)]
struct PendingQuestion {
    question: Question,
    correct_definition: String,
}

/// Multiple-choice quiz over a pair set: one question per pair, in a
/// shuffled order fixed at `start`.
#[derive(Debug, Clone)]
pub struct QuizSession {
    pairs: PairSet,
    order: Vec<usize>,
    current_index: usize,
    score: usize,
    status: SessionStatus,
    option_count: usize,
    pending: Option<PendingQuestion>,
    shuffler: Shuffler,
    clock: SessionClock,
}

impl QuizSession {
    pub fn new(pairs: PairSet) -> Self {
        Self::with_parts(pairs, Shuffler::from_entropy(), SessionClock::new())
    }

    pub fn with_parts(pairs: PairSet, shuffler: Shuffler, clock: SessionClock) -> Self {
        Self {
            pairs,
            order: Vec::new(),
            current_index: 0,
            score: 0,
            status: SessionStatus::NotStarted,
            option_count: DEFAULT_OPTION_COUNT,
            pending: None,
            shuffler,
            clock,
        }
    }

    /// Total options per question including the correct one, clamped to
    /// `1..=MAX_OPTION_COUNT`
    pub fn with_option_count(mut self, count: usize) -> Self {
        self.option_count = clamp_option_count(count);
        self
    }

    /// Shuffle the question order and begin. A seed makes the whole quiz
    /// (order and options) reproducible; without one the session keeps its
    /// current random source.
    pub fn start(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.shuffler = Shuffler::seeded(seed);
        }
        self.order = self.shuffler.permutation(self.pairs.size());
        self.current_index = 0;
        self.score = 0;
        self.pending = None;
        self.clock.reset();
        self.clock.start();
        self.status = SessionStatus::InProgress;
    }

    /// The question to show now. Repeated calls return the same question
    /// until it is answered.
    pub fn current_question(&mut self) -> EngineResult<Question> {
        self.ensure_in_progress()?;

        if self.pending.is_none() {
            self.pending = Some(self.build_question()?);
        }
        match &self.pending {
            Some(p) => Ok(p.question.clone()),
            None => Err(EngineError::invalid_state("no question available")),
        }
    }

    /// Answer the current question by definition text and advance
    pub fn answer(&mut self, selected_definition: &str) -> EngineResult<AnswerOutcome> {
        self.ensure_in_progress()?;
        let pending = self
            .pending
            .take()
            .ok_or_else(|| EngineError::invalid_state("no question has been shown yet"))?;

        let correct = selected_definition == pending.correct_definition;
        if correct {
            self.score += 1;
        }
        self.current_index += 1;

        let completed = self.current_index == self.order.len();
        if completed {
            let elapsed = self.clock.stop();
            self.status = SessionStatus::Complete;
            debug!(
                "quiz complete: {}/{} in {}ms",
                self.score,
                self.order.len(),
                elapsed
            );
        }

        Ok(AnswerOutcome {
            correct,
            correct_definition: pending.correct_definition,
            completed,
        })
    }

    /// Answer by position in the current question's options
    pub fn answer_option(&mut self, option_index: usize) -> EngineResult<AnswerOutcome> {
        self.ensure_in_progress()?;
        let selected = match &self.pending {
            Some(p) => p
                .question
                .options
                .get(option_index)
                .cloned()
                .ok_or(EngineError::Index {
                    index: option_index,
                    len: p.question.options.len(),
                })?,
            None => return Err(EngineError::invalid_state("no question has been shown yet")),
        };
        self.answer(&selected)
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            score: self.score,
            answered: self.current_index,
            total: self.pairs.size(),
            elapsed_ms: self.clock.elapsed_ms(),
            status: self.status,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn pairs(&self) -> &PairSet {
        &self.pairs
    }

    fn ensure_in_progress(&self) -> EngineResult<()> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            SessionStatus::NotStarted => Err(EngineError::invalid_state("quiz has not started")),
            SessionStatus::Complete => Err(EngineError::invalid_state("quiz is already complete")),
        }
    }

    fn build_question(&mut self) -> EngineResult<PendingQuestion> {
        let pair_index = *self
            .order
            .get(self.current_index)
            .ok_or(EngineError::Index {
                index: self.current_index,
                len: self.order.len(),
            })?;
        let pair = self.pairs.at(pair_index)?;
        let term = pair.term().to_string();
        let correct_definition = pair.definition().to_string();

        let pool: Vec<String> = self
            .pairs
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != pair_index)
            .map(|(_, p)| p.definition().to_string())
            .collect();

        let mut options = self.shuffler.pick_distractors(
            &pool,
            &correct_definition,
            self.option_count - 1,
        );
        options.push(correct_definition.clone());
        let options = self.shuffler.shuffle(&options);

        Ok(PendingQuestion {
            question: Question {
                number: self.current_index + 1,
                term,
                options,
            },
            correct_definition,
        })
    }
}
