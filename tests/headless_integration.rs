use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use pairplay::game_record;
use pairplay::play::{KeyAction, Play, Screen};
use pairplay::runtime::{PlayEvent, Runner};
use pairplay::session::SessionConfig;
use pairplay::GameEngine;

fn press(code: KeyCode) -> PlayEvent {
    PlayEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn demo_play(name: &str, seed: u64) -> Play {
    let record = game_record::demo(name).unwrap().unwrap();
    let mut engine = GameEngine::new(SessionConfig {
        seed: Some(seed),
        ..SessionConfig::default()
    });
    engine.load(record).unwrap();
    Play::new(engine).unwrap()
}

// Drive the play state the way the binary does, without a TTY
fn drive(play: &mut Play, runner: &Runner, steps: u32) -> bool {
    for _ in 0..steps {
        if runner.step(play) == KeyAction::Quit {
            return true;
        }
        if play.screen == Screen::Results {
            break;
        }
    }
    false
}

#[test]
fn headless_quiz_flow_completes() {
    let mut play = demo_play("astronomia", 11);
    let total = play.engine.pairs().unwrap().size();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(rx, Duration::from_millis(5));

    for _ in 0..total {
        // always pick option 1, then move on
        tx.send(press(KeyCode::Char('1'))).unwrap();
        tx.send(press(KeyCode::Enter)).unwrap();
        drive(&mut play, &runner, 2);
    }

    assert_eq!(play.screen, Screen::Results);
    let summary = play.take_finished().expect("completed play-through");
    assert_eq!(summary.total(), total);
    assert_eq!(summary.score() + summary.misses(), total);
}

#[test]
fn headless_quiz_all_correct() {
    let mut play = demo_play("astronomia", 5);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(rx, Duration::from_millis(5));

    while play.screen == Screen::Playing {
        let question = play.question.clone().unwrap();
        let correct = play
            .engine
            .pairs()
            .unwrap()
            .iter()
            .find(|p| p.term() == question.term)
            .unwrap()
            .definition()
            .to_string();
        let idx = question.options.iter().position(|o| *o == correct).unwrap();

        for _ in 0..idx {
            tx.send(press(KeyCode::Down)).unwrap();
        }
        tx.send(press(KeyCode::Enter)).unwrap();
        tx.send(press(KeyCode::Right)).unwrap();
        drive(&mut play, &runner, idx as u32 + 2);
    }

    let summary = play.take_finished().unwrap();
    assert_eq!(summary.score(), summary.total());
    assert_eq!(summary.misses(), 0);
}

#[test]
fn headless_memory_flow_with_ticks() {
    let mut play = demo_play("rust_keywords", 2);
    let cards = play.engine.memory_board().unwrap().cards().to_vec();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(rx, Duration::from_millis(1));

    // one deliberate miss first
    let other = cards
        .iter()
        .position(|c| c.pair_index != cards[0].pair_index)
        .unwrap();
    play.cursor = 0;
    tx.send(press(KeyCode::Char(' '))).unwrap();
    drive(&mut play, &runner, 1);
    play.cursor = other;
    tx.send(press(KeyCode::Char(' '))).unwrap();
    drive(&mut play, &runner, 1);
    assert!(play.reveal.is_some());

    // nothing queued: the runner only ticks, and the reveal runs out
    drive(&mut play, &runner, 20);
    assert!(play.reveal.is_none());

    let pair_count = cards.len() / 2;
    for pair in 0..pair_count {
        for (i, card) in cards.iter().enumerate() {
            if card.pair_index == pair {
                play.cursor = i;
                tx.send(press(KeyCode::Enter)).unwrap();
                drive(&mut play, &runner, 1);
            }
        }
    }

    assert_eq!(play.screen, Screen::Results);
    let summary = play.take_finished().unwrap();
    assert_eq!(summary.score(), pair_count);
    assert_eq!(summary.misses(), 1);
}

#[test]
fn headless_escape_quits_mid_game() {
    let mut play = demo_play("capitals", 1);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(rx, Duration::from_millis(5));

    tx.send(press(KeyCode::Down)).unwrap();
    tx.send(press(KeyCode::Esc)).unwrap();
    assert!(drive(&mut play, &runner, 5));
    assert!(play.take_finished().is_none());
}
