use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use crate::clock::{SessionClock, SystemTimeSource, TimeSource};
use crate::error::{EngineError, EngineResult};
use crate::game_record::{GameKind, GameRecord};
use crate::match_session::{AttemptOutcome, MatchSession, MatchSummary};
use crate::memory_board::{FlipOutcome, MemoryBoard};
use crate::pair_set::PairSet;
use crate::quiz_session::{AnswerOutcome, Question, QuizSession, QuizSummary};
use crate::session::{SessionConfig, SessionStatus};
use crate::shuffler::Shuffler;
use crate::util::percent;

/// Display order for the association mode. Both lists hold pair indices and
/// are shuffled independently of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationLayout {
    pub terms: Vec<usize>,
    pub definitions: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionSummary {
    Match(MatchSummary),
    Quiz(QuizSummary),
}

impl SessionSummary {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionSummary::Match(s) => s.status,
            SessionSummary::Quiz(s) => s.status,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            SessionSummary::Match(s) => s.elapsed_ms,
            SessionSummary::Quiz(s) => s.elapsed_ms,
        }
    }

    /// Correct answers or matches
    pub fn score(&self) -> usize {
        match self {
            SessionSummary::Match(s) => s.correct_count,
            SessionSummary::Quiz(s) => s.score,
        }
    }

    /// Wrong answers or failed pairings
    pub fn misses(&self) -> usize {
        match self {
            SessionSummary::Match(s) => s.wrong_count,
            SessionSummary::Quiz(s) => s.answered - s.score,
        }
    }

    /// Share of correct attempts among all attempts, in percent
    pub fn accuracy(&self) -> Option<f64> {
        percent(self.score(), self.score() + self.misses())
    }

    pub fn total(&self) -> usize {
        match self {
            SessionSummary::Match(s) => s.total,
            SessionSummary::Quiz(s) => s.total,
        }
    }
}

/// Notifications for the rendering layer (feedback text, sounds)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Loaded { title: String, kind: GameKind },
    Started,
    ScoreChanged { correct: bool, summary: SessionSummary },
    Completed { summary: SessionSummary },
}

#[derive(Debug, Clone)]
enum GameSession {
    Association {
        session: MatchSession,
        layout: AssociationLayout,
    },
    Memory {
        session: MatchSession,
        board: MemoryBoard,
    },
    Quiz(QuizSession),
}

#[derive(Debug, Clone)]
struct LoadedGame {
    record: GameRecord,
    kind: GameKind,
    pairs: PairSet,
    session: GameSession,
}

/// Single entry point a UI drives: load a game, start it, feed it player
/// input and read snapshots back. Owns at most one session at a time.
pub struct GameEngine {
    config: SessionConfig,
    time: Arc<dyn TimeSource>,
    loaded: Option<LoadedGame>,
    events: Vec<EngineEvent>,
    runs: u64,
}

impl GameEngine {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(config: SessionConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            time,
            loaded: None,
            events: Vec::new(),
            runs: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Validate and load `record` in its own mode
    pub fn load(&mut self, record: GameRecord) -> EngineResult<()> {
        let kind = record.kind;
        self.load_as(record, kind)
    }

    /// Load `record` but play it in `kind`. Any previous session is dropped;
    /// on a validation failure the previous game stays loaded.
    pub fn load_as(&mut self, record: GameRecord, kind: GameKind) -> EngineResult<()> {
        let pairs = record.pair_set()?;
        self.runs = 0;
        let session = self.build_session(kind, &pairs);

        info!(
            "loaded '{}' as {} with {} pairs",
            record.title,
            kind,
            pairs.size()
        );
        self.events.clear();
        self.events.push(EngineEvent::Loaded {
            title: record.title.clone(),
            kind,
        });
        self.loaded = Some(LoadedGame {
            record,
            kind,
            pairs,
            session,
        });
        Ok(())
    }

    /// Start a fresh play-through of the loaded game
    pub fn start(&mut self) -> EngineResult<()> {
        let (kind, pairs) = match &self.loaded {
            Some(game) => (game.kind, game.pairs.clone()),
            None => return Err(EngineError::invalid_state("no game loaded")),
        };
        let mut session = self.build_session(kind, &pairs);
        match &mut session {
            GameSession::Association { session, .. } | GameSession::Memory { session, .. } => {
                session.start()
            }
            GameSession::Quiz(quiz) => quiz.start(None),
        }
        self.runs += 1;

        if let Some(game) = self.loaded.as_mut() {
            game.session = session;
        }
        debug!("session started ({kind})");
        self.events.push(EngineEvent::Started);
        Ok(())
    }

    /// Discard the current play-through. The game stays loaded and a new
    /// not-started session takes its place.
    pub fn reset(&mut self) {
        let fresh = self
            .loaded
            .as_ref()
            .map(|game| self.build_session(game.kind, &game.pairs));
        if let (Some(game), Some(session)) = (self.loaded.as_mut(), fresh) {
            game.session = session;
            debug!("session reset");
        }
        self.events.clear();
    }

    /// Forget the loaded game entirely
    pub fn unload(&mut self) {
        self.loaded = None;
        self.events.clear();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn record(&self) -> Option<&GameRecord> {
        self.loaded.as_ref().map(|g| &g.record)
    }

    pub fn kind(&self) -> Option<GameKind> {
        self.loaded.as_ref().map(|g| g.kind)
    }

    pub fn pairs(&self) -> Option<&PairSet> {
        self.loaded.as_ref().map(|g| &g.pairs)
    }

    /// Pair a term with a definition (association and memory modes)
    pub fn submit_attempt(
        &mut self,
        term_index: usize,
        definition_index: usize,
    ) -> EngineResult<AttemptOutcome> {
        let session = self.match_session_mut()?;
        let outcome = session.submit_attempt(term_index, definition_index)?;
        let summary = SessionSummary::Match(session.summary());
        self.emit_progress(outcome.correct, outcome.completed, summary);
        Ok(outcome)
    }

    /// Flip a memory card
    pub fn flip_card(&mut self, card: usize) -> EngineResult<FlipOutcome> {
        let (session, board) = match self.loaded.as_mut().map(|g| &mut g.session) {
            Some(GameSession::Memory { session, board }) => (session, board),
            Some(_) => return Err(EngineError::invalid_state("not a memory game")),
            None => return Err(EngineError::invalid_state("no game loaded")),
        };
        let outcome = board.flip(card, session)?;
        let summary = SessionSummary::Match(session.summary());
        if let FlipOutcome::Resolved {
            correct, completed, ..
        } = outcome
        {
            self.emit_progress(correct, completed, summary);
        }
        Ok(outcome)
    }

    pub fn current_question(&mut self) -> EngineResult<Question> {
        self.quiz_mut()?.current_question()
    }

    pub fn answer(&mut self, selected_definition: &str) -> EngineResult<AnswerOutcome> {
        let quiz = self.quiz_mut()?;
        let outcome = quiz.answer(selected_definition)?;
        let summary = SessionSummary::Quiz(quiz.summary());
        self.emit_progress(outcome.correct, outcome.completed, summary);
        Ok(outcome)
    }

    pub fn answer_option(&mut self, option_index: usize) -> EngineResult<AnswerOutcome> {
        let quiz = self.quiz_mut()?;
        let outcome = quiz.answer_option(option_index)?;
        let summary = SessionSummary::Quiz(quiz.summary());
        self.emit_progress(outcome.correct, outcome.completed, summary);
        Ok(outcome)
    }

    pub fn summary(&self) -> EngineResult<SessionSummary> {
        match self.loaded.as_ref().map(|g| &g.session) {
            Some(GameSession::Association { session, .. })
            | Some(GameSession::Memory { session, .. }) => {
                Ok(SessionSummary::Match(session.summary()))
            }
            Some(GameSession::Quiz(quiz)) => Ok(SessionSummary::Quiz(quiz.summary())),
            None => Err(EngineError::invalid_state("no game loaded")),
        }
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.summary().ok().map(|s| s.status())
    }

    pub fn association_layout(&self) -> Option<&AssociationLayout> {
        match self.loaded.as_ref().map(|g| &g.session) {
            Some(GameSession::Association { layout, .. }) => Some(layout),
            _ => None,
        }
    }

    pub fn memory_board(&self) -> Option<&MemoryBoard> {
        match self.loaded.as_ref().map(|g| &g.session) {
            Some(GameSession::Memory { board, .. }) => Some(board),
            _ => None,
        }
    }

    /// Match state for rendering (association and memory modes)
    pub fn match_session(&self) -> Option<&MatchSession> {
        match self.loaded.as_ref().map(|g| &g.session) {
            Some(GameSession::Association { session, .. })
            | Some(GameSession::Memory { session, .. }) => Some(session),
            _ => None,
        }
    }

    /// Hand over queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn build_session(&self, kind: GameKind, pairs: &PairSet) -> GameSession {
        // each run of a seeded game gets its own reproducible stream
        let mut shuffler = Shuffler::new(self.config.seed.map(|s| s.wrapping_add(self.runs)));
        let clock = SessionClock::with_source(Arc::clone(&self.time));

        match kind {
            GameKind::Association => {
                let layout = AssociationLayout {
                    terms: shuffler.permutation(pairs.size()),
                    definitions: shuffler.permutation(pairs.size()),
                };
                GameSession::Association {
                    session: MatchSession::with_clock(pairs.clone(), clock),
                    layout,
                }
            }
            GameKind::Memory => GameSession::Memory {
                board: MemoryBoard::deal(pairs.size(), &mut shuffler),
                session: MatchSession::with_clock(pairs.clone(), clock),
            },
            GameKind::Quiz => GameSession::Quiz(
                QuizSession::with_parts(pairs.clone(), shuffler, clock)
                    .with_option_count(self.config.quiz_options),
            ),
        }
    }

    fn match_session_mut(&mut self) -> EngineResult<&mut MatchSession> {
        match self.loaded.as_mut().map(|g| &mut g.session) {
            Some(GameSession::Association { session, .. })
            | Some(GameSession::Memory { session, .. }) => Ok(session),
            Some(GameSession::Quiz(_)) => Err(EngineError::invalid_state("not a matching game")),
            None => Err(EngineError::invalid_state("no game loaded")),
        }
    }

    fn quiz_mut(&mut self) -> EngineResult<&mut QuizSession> {
        match self.loaded.as_mut().map(|g| &mut g.session) {
            Some(GameSession::Quiz(quiz)) => Ok(quiz),
            Some(_) => Err(EngineError::invalid_state("not a quiz game")),
            None => Err(EngineError::invalid_state("no game loaded")),
        }
    }

    fn emit_progress(&mut self, correct: bool, completed: bool, summary: SessionSummary) {
        self.events.push(EngineEvent::ScoreChanged { correct, summary });
        if completed {
            info!(
                "game complete: {}/{} with {} misses in {}ms",
                summary.score(),
                summary.total(),
                summary.misses(),
                summary.elapsed_ms()
            );
            self.events.push(EngineEvent::Completed { summary });
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
