use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::engine::{EngineEvent, GameEngine, SessionSummary};
use crate::error::{EngineError, EngineResult};
use crate::game_record::GameKind;
use crate::memory_board::FlipOutcome;
use crate::quiz_session::Question;

/// Cards per row on the memory board
pub const MEMORY_COLUMNS: usize = 4;
/// Ticks a mismatched memory pair stays face up
pub const REVEAL_TICKS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Terms,
    Definitions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct(String),
    Wrong(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Restart,
    Quit,
}

/// Keyboard-driven play state layered over a `GameEngine`: cursor
/// positions, the half-made association pick, quiz feedback and the memory
/// reveal delay. Rendering reads it; nothing here draws.
pub struct Play {
    pub engine: GameEngine,
    pub screen: Screen,
    pub cursor: usize,
    pub focus: Column,
    /// Pair index of the term picked in association mode
    pub picked_term: Option<usize>,
    pub question: Option<Question>,
    /// Quiz answer given, waiting for the player to move on
    pub awaiting_next: bool,
    pub feedback: Option<Feedback>,
    /// Mismatched memory cards still face up, with ticks left
    pub reveal: Option<(usize, usize, u32)>,
    finished: Option<SessionSummary>,
}

impl Play {
    /// Start a play-through of the engine's loaded game
    pub fn new(engine: GameEngine) -> EngineResult<Self> {
        let mut play = Self {
            engine,
            screen: Screen::Playing,
            cursor: 0,
            focus: Column::Terms,
            picked_term: None,
            question: None,
            awaiting_next: false,
            feedback: None,
            reveal: None,
            finished: None,
        };
        play.restart()?;
        Ok(play)
    }

    pub fn restart(&mut self) -> EngineResult<()> {
        self.engine.start()?;
        self.engine.drain_events();
        self.screen = Screen::Playing;
        self.cursor = 0;
        self.focus = Column::Terms;
        self.picked_term = None;
        self.awaiting_next = false;
        self.feedback = None;
        self.reveal = None;
        self.finished = None;
        self.question = match self.engine.kind() {
            Some(GameKind::Quiz) => Some(self.engine.current_question()?),
            _ => None,
        };
        Ok(())
    }

    pub fn kind(&self) -> GameKind {
        self.engine.kind().unwrap_or(GameKind::Quiz)
    }

    /// Summary of a play-through that just completed; yielded once
    pub fn take_finished(&mut self) -> Option<SessionSummary> {
        self.finished.take()
    }

    pub fn on_tick(&mut self) {
        if let Some((a, b, left)) = self.reveal {
            self.reveal = if left <= 1 { None } else { Some((a, b, left - 1)) };
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return KeyAction::Quit;
        }

        if self.screen == Screen::Results {
            return match key.code {
                KeyCode::Char('r') | KeyCode::Left => KeyAction::Restart,
                KeyCode::Char('q') => KeyAction::Quit,
                _ => KeyAction::Continue,
            };
        }

        let result = match self.kind() {
            GameKind::Quiz => self.quiz_key(key.code),
            GameKind::Association => self.association_key(key.code),
            GameKind::Memory => self.memory_key(key.code),
        };
        if let Err(e) = result {
            self.feedback = Some(Feedback::Error(e.to_string()));
        }
        self.absorb_events();
        KeyAction::Continue
    }

    fn quiz_key(&mut self, code: KeyCode) -> EngineResult<()> {
        if self.awaiting_next {
            if matches!(code, KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ')) {
                self.next_question()?;
            }
            return Ok(());
        }

        let options = self.question.as_ref().map_or(0, |q| q.options.len());
        match code {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.cursor = (self.cursor + 1).min(options.saturating_sub(1)),
            KeyCode::Enter | KeyCode::Char(' ') => self.answer_quiz(self.cursor)?,
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let idx = c as usize - '1' as usize;
                if idx < options {
                    self.cursor = idx;
                    self.answer_quiz(idx)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn answer_quiz(&mut self, option: usize) -> EngineResult<()> {
        let outcome = self.engine.answer_option(option)?;
        self.feedback = Some(if outcome.correct {
            Feedback::Correct("Correct!".to_string())
        } else {
            Feedback::Wrong(format!("Wrong. Answer: {}", outcome.correct_definition))
        });
        self.awaiting_next = true;
        Ok(())
    }

    fn next_question(&mut self) -> EngineResult<()> {
        self.awaiting_next = false;
        self.feedback = None;
        self.cursor = 0;
        if self.engine.status().is_some_and(|s| s.is_complete()) {
            self.question = None;
            self.screen = Screen::Results;
        } else {
            self.question = Some(self.engine.current_question()?);
        }
        Ok(())
    }

    fn association_key(&mut self, code: KeyCode) -> EngineResult<()> {
        let len = self.engine.pairs().map_or(0, |p| p.size());
        match code {
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    Column::Terms => Column::Definitions,
                    Column::Definitions => Column::Terms,
                };
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.cursor = (self.cursor + 1).min(len.saturating_sub(1)),
            KeyCode::Enter | KeyCode::Char(' ') => self.association_select()?,
            _ => {}
        }
        Ok(())
    }

    fn association_select(&mut self) -> EngineResult<()> {
        let Some(layout) = self.engine.association_layout() else {
            return Err(EngineError::InvalidState("not an association game".into()));
        };
        match self.focus {
            Column::Terms => {
                let pair = *layout.terms.get(self.cursor).ok_or(EngineError::Index {
                    index: self.cursor,
                    len: layout.terms.len(),
                })?;
                let matched = self
                    .engine
                    .match_session()
                    .is_some_and(|s| s.is_term_matched(pair));
                if !matched {
                    self.picked_term = Some(pair);
                    self.focus = Column::Definitions;
                }
            }
            Column::Definitions => {
                let Some(term) = self.picked_term else {
                    self.feedback = Some(Feedback::Error("pick a term first".to_string()));
                    return Ok(());
                };
                let definition = *layout.definitions.get(self.cursor).ok_or(EngineError::Index {
                    index: self.cursor,
                    len: layout.definitions.len(),
                })?;
                let outcome = self.engine.submit_attempt(term, definition)?;
                if outcome.correct {
                    self.picked_term = None;
                    self.focus = Column::Terms;
                }
                if outcome.completed {
                    self.screen = Screen::Results;
                }
            }
        }
        Ok(())
    }

    fn memory_key(&mut self, code: KeyCode) -> EngineResult<()> {
        let len = self.engine.memory_board().map_or(0, |b| b.len());
        if len == 0 {
            return Ok(());
        }
        match code {
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len - 1),
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(MEMORY_COLUMNS),
            KeyCode::Down => {
                if self.cursor + MEMORY_COLUMNS < len {
                    self.cursor += MEMORY_COLUMNS;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.reveal = None;
                match self.engine.flip_card(self.cursor)? {
                    FlipOutcome::Resolved {
                        first,
                        second,
                        correct,
                        completed,
                    } => {
                        if !correct {
                            self.reveal = Some((first, second, REVEAL_TICKS));
                        }
                        if completed {
                            self.screen = Screen::Results;
                        }
                    }
                    FlipOutcome::Selected(_) | FlipOutcome::Ignored => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Turn engine events into feedback and remember completion
    fn absorb_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::ScoreChanged { correct, .. } if self.kind() != GameKind::Quiz => {
                    self.feedback = Some(if correct {
                        Feedback::Correct("Match!".to_string())
                    } else {
                        Feedback::Wrong("Not a match".to_string())
                    });
                }
                EngineEvent::Completed { summary } => self.finished = Some(summary),
                EngineEvent::ScoreChanged { .. } | EngineEvent::Loaded { .. } | EngineEvent::Started => {}
            }
        }
    }
}
