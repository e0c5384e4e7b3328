pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use pairplay::{
    game_record::GameKind,
    memory_board::CardFace,
    play::{Column, Feedback, Play, MEMORY_COLUMNS},
    util::format_ms,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.play.screen).render(app, f);
}

/// Playing screen: header, mode body, feedback and key help
impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        header(self).render(chunks[0], buf);

        match self.play.kind() {
            GameKind::Quiz => render_quiz(&self.play, chunks[1], buf),
            GameKind::Association => render_association(&self.play, chunks[1], buf),
            GameKind::Memory => render_memory(&self.play, chunks[1], buf),
        }

        feedback_line(&self.play).render(chunks[2], buf);

        Paragraph::new(help_text(self.play.kind()))
            .style(Style::default().add_modifier(Modifier::DIM))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

fn header(app: &App) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let title = app
        .play
        .engine
        .record()
        .map(|r| r.title.clone())
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(title, bold),
        Span::styled(
            format!("  [{}]", app.play.kind()),
            Style::default().fg(Color::Magenta),
        ),
    ];
    if let Ok(summary) = app.play.engine.summary() {
        spans.push(Span::raw(format!(
            "   {}/{}  misses {}",
            summary.score(),
            summary.total(),
            summary.misses()
        )));
        if app.show_timer {
            spans.push(Span::styled(
                format!("   {}", format_ms(summary.elapsed_ms())),
                Style::default().fg(Color::Yellow),
            ));
        }
    }
    Paragraph::new(Line::from(spans))
}

fn render_quiz(play: &Play, area: Rect, buf: &mut Buffer) {
    let Some(question) = &play.question else {
        return;
    };
    let total = play.engine.pairs().map_or(0, |p| p.size());
    let width = area.width.saturating_sub(6) as usize;

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}/{}  ", question.number, total),
                Style::default().add_modifier(Modifier::DIM),
            ),
            Span::styled(
                question.term.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::default(),
    ];

    for (i, option) in question.options.iter().enumerate() {
        let mut style = Style::default();
        if !play.awaiting_next && play.cursor == i {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::styled(
            format!("{}. {}", i + 1, truncate(option, width)),
            style,
        ));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn cell_style(under_cursor: bool, matched: bool, picked: bool) -> Style {
    let mut style = Style::default();
    if matched {
        style = style.fg(Color::Green).add_modifier(Modifier::DIM);
    } else if picked {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if under_cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn render_association(play: &Play, area: Rect, buf: &mut Buffer) {
    let (Some(layout), Some(pairs), Some(session)) = (
        play.engine.association_layout(),
        play.engine.pairs(),
        play.engine.match_session(),
    ) else {
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let width = columns[0].width.saturating_sub(2) as usize;

    let terms: Vec<Line> = layout
        .terms
        .iter()
        .enumerate()
        .map(|(row, &pair)| {
            let text = pairs.at(pair).map(|p| p.term()).unwrap_or_default();
            let style = cell_style(
                play.focus == Column::Terms && play.cursor == row,
                session.is_term_matched(pair),
                play.picked_term == Some(pair),
            );
            Line::styled(truncate(text, width), style)
        })
        .collect();

    let definitions: Vec<Line> = layout
        .definitions
        .iter()
        .enumerate()
        .map(|(row, &pair)| {
            let text = pairs.at(pair).map(|p| p.definition()).unwrap_or_default();
            let style = cell_style(
                play.focus == Column::Definitions && play.cursor == row,
                session.is_definition_matched(pair),
                false,
            );
            Line::styled(truncate(text, width), style)
        })
        .collect();

    let focused = Style::default().fg(Color::Cyan);
    let border = |column: Column| {
        if play.focus == column {
            focused
        } else {
            Style::default()
        }
    };

    Paragraph::new(terms)
        .block(
            Block::bordered()
                .title("Terms")
                .border_style(border(Column::Terms)),
        )
        .render(columns[0], buf);
    Paragraph::new(definitions)
        .block(
            Block::bordered()
                .title("Definitions")
                .border_style(border(Column::Definitions)),
        )
        .render(columns[1], buf);
}

fn render_memory(play: &Play, area: Rect, buf: &mut Buffer) {
    let (Some(board), Some(pairs), Some(session)) = (
        play.engine.memory_board(),
        play.engine.pairs(),
        play.engine.match_session(),
    ) else {
        return;
    };

    let rows = board.len().div_ceil(MEMORY_COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); rows])
        .split(area);

    for (row, cards) in board.cards().chunks(MEMORY_COLUMNS).enumerate() {
        let Some(row_area) = row_areas.get(row) else {
            break;
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, MEMORY_COLUMNS as u32);
                MEMORY_COLUMNS
            ])
            .split(*row_area);

        for (col, card) in cards.iter().enumerate() {
            let index = row * MEMORY_COLUMNS + col;
            let matched = board.is_matched(index, session);
            let face_up = matched
                || board.selected() == Some(index)
                || play
                    .reveal
                    .is_some_and(|(a, b, _)| a == index || b == index);

            let text = match (face_up, pairs.at(card.pair_index)) {
                (true, Ok(pair)) => match card.face {
                    CardFace::Term => pair.term(),
                    CardFace::Definition => pair.definition(),
                },
                _ => "?",
            };

            let mut style = Style::default();
            if matched {
                style = style.fg(Color::Green).add_modifier(Modifier::DIM);
            } else if face_up {
                style = style.add_modifier(Modifier::BOLD);
            }
            let border = if play.cursor == index {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let width = cells[col].width.saturating_sub(2) as usize;
            Paragraph::new(truncate(text, width))
                .style(style)
                .alignment(Alignment::Center)
                .block(Block::bordered().border_style(border))
                .render(cells[col], buf);
        }
    }
}

fn feedback_line(play: &Play) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let line = match &play.feedback {
        Some(Feedback::Correct(msg)) => Line::styled(msg.clone(), bold.fg(Color::Green)),
        Some(Feedback::Wrong(msg)) => Line::styled(msg.clone(), bold.fg(Color::Red)),
        Some(Feedback::Error(msg)) => Line::styled(msg.clone(), Style::default().fg(Color::Yellow)),
        None => Line::default(),
    };
    Paragraph::new(line).alignment(Alignment::Center)
}

fn help_text(kind: GameKind) -> &'static str {
    match kind {
        GameKind::Quiz => "(1-9) answer  (↑/↓ enter) choose  (enter/→) next  (esc)ape",
        GameKind::Association => "(↑/↓) move  (tab/←/→) column  (enter) pick  (esc)ape",
        GameKind::Memory => "(arrows) move  (space/enter) flip  (esc)ape",
    }
}

/// Results screen: final score, misses, accuracy and time
pub fn render_results(app: &App, f: &mut Frame) {
    let area = f.area();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![Line::styled("Complete!", bold.fg(Color::Green)), Line::default()];

    if let Ok(summary) = app.play.engine.summary() {
        lines.push(Line::from(vec![
            Span::styled("score    ", dim),
            Span::styled(format!("{}/{}", summary.score(), summary.total()), bold),
        ]));
        lines.push(Line::from(vec![
            Span::styled("misses   ", dim),
            Span::raw(summary.misses().to_string()),
        ]));
        if let Some(acc) = summary.accuracy() {
            lines.push(Line::from(vec![
                Span::styled("accuracy ", dim),
                Span::raw(format!("{acc:.0}%")),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled("time     ", dim),
            Span::raw(format_ms(summary.elapsed_ms())),
        ]));
    }

    lines.push(Line::default());
    if let Some(saved) = &app.saved {
        lines.push(Line::styled(saved.clone(), dim.add_modifier(Modifier::ITALIC)));
    }
    lines.push(Line::styled("(r)estart / (esc)ape", dim.add_modifier(Modifier::ITALIC)));

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        chunks[1],
    );
}

/// Cut `text` to `width` display columns, marking the cut with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("Sol", 10), "Sol");
        assert_eq!(truncate("Estrela", 7), "Estrela");
    }

    #[test]
    fn truncate_cuts_by_display_width() {
        assert_eq!(truncate("Satélite natural", 8), "Satélit…");
        // wide characters take two columns
        assert_eq!(truncate("日本語テキスト", 7), "日本語…");
    }

    #[test]
    fn help_mentions_escape_for_every_mode() {
        for kind in [GameKind::Quiz, GameKind::Association, GameKind::Memory] {
            assert!(help_text(kind).contains("(esc)ape"));
        }
    }
}
