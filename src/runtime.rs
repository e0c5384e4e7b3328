//! Terminal input and the tick loop that feeds it to a [`Play`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::play::{KeyAction, Play};

#[derive(Clone, Debug)]
pub enum PlayEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Forward key presses and resizes from the terminal on a background thread.
/// The channel closes when reading the terminal fails.
pub fn terminal_events() -> Receiver<PlayEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let evt = match event::read() {
            // windows reports releases too
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => PlayEvent::Key(key),
            Ok(Event::Resize(_, _)) => PlayEvent::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.send(evt).is_err() {
            break;
        }
    });

    rx
}

/// Drives a `Play` from an event channel, one event or tick per step
pub struct Runner {
    events: Receiver<PlayEvent>,
    tick: Duration,
}

impl Runner {
    pub fn new(events: Receiver<PlayEvent>, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// Next event, or `Tick` once a whole interval passes without one
    pub fn next_event(&self) -> PlayEvent {
        match self.events.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => PlayEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                // keep the reveal timers running at the same pace
                std::thread::sleep(self.tick);
                PlayEvent::Tick
            }
        }
    }

    /// Wait for the next event and apply it to `play`
    pub fn step(&self, play: &mut Play) -> KeyAction {
        match self.next_event() {
            PlayEvent::Key(key) => play.on_key(key),
            PlayEvent::Tick => {
                play.on_tick();
                KeyAction::Continue
            }
            PlayEvent::Resize => KeyAction::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameEngine;
    use crate::game_record::{GameKind, GameRecord};
    use crate::pair_set::RawPair;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn memory_play() -> Play {
        let mut engine = GameEngine::default();
        engine
            .load(GameRecord::new(
                "Astros",
                GameKind::Memory,
                vec![RawPair::new("Sol", "Estrela"), RawPair::new("Lua", "Satélite")],
            ))
            .unwrap();
        Play::new(engine).unwrap()
    }

    fn key(code: KeyCode) -> PlayEvent {
        PlayEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn quiet_channel_ticks() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(1));
        assert!(matches!(runner.next_event(), PlayEvent::Tick));
    }

    #[test]
    fn closed_channel_still_ticks() {
        let (tx, rx) = mpsc::channel::<PlayEvent>();
        drop(tx);
        let runner = Runner::new(rx, Duration::from_millis(1));
        assert!(matches!(runner.next_event(), PlayEvent::Tick));
    }

    #[test]
    fn keys_reach_the_play() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(10));
        let mut play = memory_play();

        tx.send(key(KeyCode::Right)).unwrap();
        tx.send(PlayEvent::Resize).unwrap();
        tx.send(key(KeyCode::Esc)).unwrap();

        assert_eq!(runner.step(&mut play), KeyAction::Continue);
        assert_eq!(play.cursor, 1);
        assert_eq!(runner.step(&mut play), KeyAction::Continue);
        assert_eq!(runner.step(&mut play), KeyAction::Quit);
    }

    #[test]
    fn ticks_count_down_the_reveal() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(1));
        let mut play = memory_play();
        play.reveal = Some((0, 1, 2));

        runner.step(&mut play);
        assert_eq!(play.reveal, Some((0, 1, 1)));
        runner.step(&mut play);
        assert_eq!(play.reveal, None);
    }
}
