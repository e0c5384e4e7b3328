use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EngineResult, StoreError};
use crate::pair_set::{PairSet, RawPair};

static DEMO_DIR: Dir = include_dir!("src/games");

/// Which game mode a record is meant for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameKind {
    /// drag a term onto its definition
    #[serde(alias = "associacao")]
    Association,
    /// flip cards two at a time
    Memory,
    /// multiple-choice questions
    Quiz,
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "association" | "associacao" => Ok(GameKind::Association),
            "memory" => Ok(GameKind::Memory),
            "quiz" => Ok(GameKind::Quiz),
            other => Err(format!("unknown game type '{other}'")),
        }
    }
}

/// A game as stored or exchanged as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GameKind,
    pub data: Vec<RawPair>,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl GameRecord {
    pub fn new(title: impl Into<String>, kind: GameKind, data: Vec<RawPair>) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind,
            data,
            public: false,
            owner: None,
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn pair_set(&self) -> EngineResult<PairSet> {
        PairSet::create(&self.data)
    }
}

/// Names of the games bundled into the binary, sorted
pub fn demo_names() -> Vec<String> {
    let mut names: Vec<String> = DEMO_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .filter_map(|s| s.to_str())
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// Load a bundled game by name (file stem). `Ok(None)` when unknown.
pub fn demo(name: &str) -> Result<Option<GameRecord>, StoreError> {
    let Some(file) = DEMO_DIR.get_file(format!("{name}.json")) else {
        return Ok(None);
    };
    let contents = file.contents_utf8().unwrap_or_default();
    GameRecord::from_json_str(contents).map(Some)
}
