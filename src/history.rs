use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

use crate::engine::SessionSummary;
use crate::error::StoreError;
use crate::game_record::{GameKind, GameRecord};
use crate::util::{format_ms, percent};

/// A finished play-through, as kept in the results table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayResult {
    pub game_id: Option<i64>,
    pub title: String,
    pub kind: GameKind,
    pub player: String,
    pub score: usize,
    pub misses: usize,
    pub total: usize,
    pub elapsed_ms: u64,
    pub played_at: DateTime<Local>,
}

impl PlayResult {
    pub fn from_summary(
        record: &GameRecord,
        kind: GameKind,
        player: &str,
        summary: &SessionSummary,
    ) -> Self {
        Self {
            game_id: record.id,
            title: record.title.clone(),
            kind,
            player: player.to_string(),
            score: summary.score(),
            misses: summary.misses(),
            total: summary.total(),
            elapsed_ms: summary.elapsed_ms(),
            played_at: Local::now(),
        }
    }

    /// Share of correct attempts among all attempts, in percent
    pub fn accuracy(&self) -> Option<f64> {
        percent(self.score, self.score + self.misses)
    }

    /// One-line description used by `history`
    pub fn describe(&self) -> String {
        let accuracy = self
            .accuracy()
            .map_or_else(|| "-".to_string(), |a| format!("{a:.0}%"));
        format!(
            "{}  {:<28} {:<11} {}/{}  {} misses  {:>4}  {}",
            self.played_at.format("%Y-%m-%d %H:%M"),
            self.title,
            self.kind.to_string(),
            self.score,
            self.total,
            self.misses,
            accuracy,
            format_ms(self.elapsed_ms),
        )
    }

    /// How long before `now` this was played, coarsely: "just now", "5m ago"
    pub fn age(&self, now: DateTime<Local>) -> String {
        let secs = (now - self.played_at).num_seconds().max(0);
        match secs {
            0..=59 => "just now".to_string(),
            60..=3_599 => format!("{}m ago", secs / 60),
            3_600..=86_399 => format!("{}h ago", secs / 3_600),
            _ => format!("{}d ago", secs / 86_400),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    played_at: String,
    game_id: Option<i64>,
    title: &'a str,
    kind: String,
    player: &'a str,
    score: usize,
    misses: usize,
    total: usize,
    elapsed_ms: u64,
    time: String,
}

/// Write results to `path` as CSV with a header row
pub fn export_csv<P: AsRef<Path>>(results: &[PlayResult], path: P) -> Result<usize, StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    for r in results {
        writer.serialize(CsvRow {
            played_at: r.played_at.to_rfc3339(),
            game_id: r.game_id,
            title: &r.title,
            kind: r.kind.to_string(),
            player: &r.player,
            score: r.score,
            misses: r.misses,
            total: r.total,
            elapsed_ms: r.elapsed_ms,
            time: format_ms(r.elapsed_ms),
        })?;
    }
    writer.flush()?;
    Ok(results.len())
}
