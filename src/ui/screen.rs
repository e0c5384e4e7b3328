use ratatui::Frame;

use pairplay::play;

use crate::{ui::render_results, App};

/// A UI Screen boundary: responsible for rendering one play state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Playing screen - renders the mode board through the App widget
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_results(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: play::Screen) -> Box<dyn Screen> {
    match state {
        play::Screen::Playing => Box::new(PlayingScreen),
        play::Screen::Results => Box::new(ResultsScreen),
    }
}
