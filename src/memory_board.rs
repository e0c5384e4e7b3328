use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::match_session::MatchSession;
use crate::shuffler::Shuffler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardFace {
    Term,
    Definition,
}

/// A face-down card; `pair_index` points into the session's pair set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    pub pair_index: usize,
    pub face: CardFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Matched card, or the card that is already selected
    Ignored,
    /// First card of a turn
    Selected(usize),
    /// Second card of a turn, scored through the match session
    Resolved {
        first: usize,
        second: usize,
        correct: bool,
        completed: bool,
    },
}

/// Card grid for the memory mode: one term card and one definition card per
/// pair, two flips per turn.
#[derive(Debug, Clone)]
pub struct MemoryBoard {
    cards: Vec<Card>,
    selected: Option<usize>,
}

impl MemoryBoard {
    pub fn deal(pair_count: usize, shuffler: &mut Shuffler) -> Self {
        let cards: Vec<Card> = (0..pair_count)
            .flat_map(|pair_index| {
                [
                    Card {
                        pair_index,
                        face: CardFace::Term,
                    },
                    Card {
                        pair_index,
                        face: CardFace::Definition,
                    },
                ]
            })
            .collect();

        Self {
            cards: shuffler.shuffle(&cards),
            selected: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_matched(&self, card: usize, session: &MatchSession) -> bool {
        match self.cards.get(card) {
            Some(c) => match c.face {
                CardFace::Term => session.is_term_matched(c.pair_index),
                CardFace::Definition => session.is_definition_matched(c.pair_index),
            },
            None => false,
        }
    }

    /// Flip `card`. The second flip of a turn is submitted to `session`; two
    /// cards showing the same face always count as a miss.
    pub fn flip(&mut self, card: usize, session: &mut MatchSession) -> EngineResult<FlipOutcome> {
        let len = self.cards.len();
        if card >= len {
            return Err(EngineError::Index { index: card, len });
        }
        // the session can be scored without the board, leaving a matched card selected
        if self.selected.is_some_and(|s| self.is_matched(s, session)) {
            self.selected = None;
        }
        if self.is_matched(card, session) || self.selected == Some(card) {
            return Ok(FlipOutcome::Ignored);
        }

        let first = match self.selected {
            None => {
                if session.status().is_complete() {
                    return Err(EngineError::invalid_state("memory game is already complete"));
                }
                self.selected = Some(card);
                return Ok(FlipOutcome::Selected(card));
            }
            Some(first) => first,
        };

        let a = self.cards[first];
        let b = self.cards[card];
        let (term_index, definition_index) = match (a.face, b.face) {
            (CardFace::Term, CardFace::Definition) => (a.pair_index, b.pair_index),
            (CardFace::Definition, CardFace::Term) => (b.pair_index, a.pair_index),
            // same face: distinct pairs, so this is always scored as wrong
            _ => (a.pair_index, b.pair_index),
        };

        let outcome = session.submit_attempt(term_index, definition_index)?;
        self.selected = None;

        Ok(FlipOutcome::Resolved {
            first,
            second: card,
            correct: outcome.correct,
            completed: outcome.completed,
        })
    }

    /// Drop a half-finished turn
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair_set::{PairSet, RawPair};
    use crate::session::SessionStatus;
    use assert_matches::assert_matches;

    fn setup(n: usize) -> (MemoryBoard, MatchSession) {
        let raw: Vec<RawPair> = (0..n)
            .map(|i| RawPair::new(format!("t{i}"), format!("d{i}")))
            .collect();
        let session = MatchSession::new(PairSet::create(&raw).unwrap());
        let board = MemoryBoard::deal(n, &mut Shuffler::seeded(4));
        (board, session)
    }

    fn find(board: &MemoryBoard, pair_index: usize, face: CardFace) -> usize {
        board
            .cards()
            .iter()
            .position(|c| c.pair_index == pair_index && c.face == face)
            .unwrap()
    }

    #[test]
    fn deal_has_two_cards_per_pair() {
        let (board, _) = setup(5);
        assert_eq!(board.len(), 10);
        for p in 0..5 {
            find(&board, p, CardFace::Term);
            find(&board, p, CardFace::Definition);
        }
    }

    #[test]
    fn matching_pair_is_correct() {
        let (mut board, mut session) = setup(2);
        let t = find(&board, 0, CardFace::Term);
        let d = find(&board, 0, CardFace::Definition);

        assert_eq!(board.flip(d, &mut session).unwrap(), FlipOutcome::Selected(d));
        assert_matches!(
            board.flip(t, &mut session).unwrap(),
            FlipOutcome::Resolved { correct: true, completed: false, .. }
        );
        assert!(board.is_matched(t, &session));
        assert!(board.is_matched(d, &session));
        assert_eq!(board.flip(t, &mut session).unwrap(), FlipOutcome::Ignored);
    }

    #[test]
    fn same_face_cards_count_as_miss() {
        let (mut board, mut session) = setup(2);
        let t0 = find(&board, 0, CardFace::Term);
        let t1 = find(&board, 1, CardFace::Term);

        board.flip(t0, &mut session).unwrap();
        assert_matches!(
            board.flip(t1, &mut session).unwrap(),
            FlipOutcome::Resolved { correct: false, .. }
        );
        assert_eq!(session.summary().wrong_count, 1);
        assert_eq!(board.selected(), None);
    }

    #[test]
    fn reflipping_selected_card_is_ignored() {
        let (mut board, mut session) = setup(2);
        board.flip(0, &mut session).unwrap();
        assert_eq!(board.flip(0, &mut session).unwrap(), FlipOutcome::Ignored);
        assert_eq!(board.selected(), Some(0));
    }

    #[test]
    fn solving_every_pair_completes() {
        let (mut board, mut session) = setup(3);
        let mut last = FlipOutcome::Ignored;
        for p in 0..3 {
            board.flip(find(&board, p, CardFace::Term), &mut session).unwrap();
            last = board
                .flip(find(&board, p, CardFace::Definition), &mut session)
                .unwrap();
        }
        assert_matches!(last, FlipOutcome::Resolved { completed: true, .. });
        assert_eq!(session.status(), SessionStatus::Complete);
        assert_matches!(board.flip(0, &mut session), Ok(FlipOutcome::Ignored));
    }

    #[test]
    fn selection_matched_elsewhere_is_dropped() {
        let (mut board, mut session) = setup(3);
        let t0 = find(&board, 0, CardFace::Term);
        board.flip(t0, &mut session).unwrap();
        session.submit_attempt(0, 0).unwrap();

        let t1 = find(&board, 1, CardFace::Term);
        assert_eq!(board.flip(t1, &mut session).unwrap(), FlipOutcome::Selected(t1));
        assert_matches!(
            board.flip(find(&board, 1, CardFace::Definition), &mut session).unwrap(),
            FlipOutcome::Resolved { correct: true, .. }
        );
        board.flip(find(&board, 2, CardFace::Definition), &mut session).unwrap();
        assert_matches!(
            board.flip(find(&board, 2, CardFace::Term), &mut session).unwrap(),
            FlipOutcome::Resolved { correct: true, completed: true, .. }
        );
        assert_eq!(session.summary().wrong_count, 0);
    }

    #[test]
    fn out_of_range_card() {
        let (mut board, mut session) = setup(1);
        assert_matches!(
            board.flip(2, &mut session),
            Err(EngineError::Index { index: 2, len: 2 })
        );
    }
}
