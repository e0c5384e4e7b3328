use chrono::{DateTime, Local};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;

use crate::app_dirs::AppDirs;
use crate::error::{EngineError, StoreError};
use crate::game_record::{GameKind, GameRecord};
use crate::history::PlayResult;
use crate::pair_set::{PairSet, RawPair};

/// Listing entry without the pair data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameListing {
    pub id: i64,
    pub title: String,
    pub kind: GameKind,
    pub public: bool,
    pub pairs: usize,
}

/// Local game library plus play history, backed by SQLite
#[derive(Debug)]
pub struct GameStore {
    conn: Connection,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        kind TEXT NOT NULL,
        data TEXT NOT NULL,
        owner TEXT NOT NULL,
        public BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_games_owner ON games(owner);
    CREATE INDEX IF NOT EXISTS idx_games_public ON games(public);

    CREATE TABLE IF NOT EXISTS play_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id INTEGER,
        title TEXT NOT NULL,
        kind TEXT NOT NULL,
        player TEXT NOT NULL,
        score INTEGER NOT NULL,
        misses INTEGER NOT NULL,
        total INTEGER NOT NULL,
        elapsed_ms INTEGER NOT NULL,
        played_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_play_results_played_at ON play_results(played_at);
"#;

impl GameStore {
    /// Open the store at the default data location, creating it if needed
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(AppDirs::db_path())
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!("opened game store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Save a new private game. The pairs are validated first and stored
    /// trimmed.
    pub fn create_game(
        &self,
        owner: &str,
        title: &str,
        kind: GameKind,
        pairs: &[RawPair],
    ) -> Result<i64, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation("a game needs a title".into()).into());
        }
        let validated = PairSet::create(pairs)?;
        let data = serde_json::to_string(&validated.to_raw())?;

        self.conn.execute(
            r#"
            INSERT INTO games (title, kind, data, owner, public, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
            params![title, kind.to_string(), data, owner, Local::now().to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("created game {id} '{title}' ({kind}) for {owner}");
        Ok(id)
    }

    /// Import a record as a new game owned by `owner`
    pub fn import(&self, owner: &str, record: &GameRecord) -> Result<i64, StoreError> {
        self.create_game(owner, &record.title, record.kind, &record.data)
    }

    pub fn list_games(&self, owner: &str) -> Result<Vec<GameListing>, StoreError> {
        self.query_listings(
            "SELECT id, title, kind, public, data FROM games WHERE owner = ?1 ORDER BY id",
            params![owner],
        )
    }

    pub fn list_public(&self) -> Result<Vec<GameListing>, StoreError> {
        self.query_listings(
            "SELECT id, title, kind, public, data FROM games WHERE public = 1 ORDER BY id",
            params![],
        )
    }

    /// Full record regardless of visibility
    pub fn get_game(&self, id: i64) -> Result<GameRecord, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT id, title, kind, data, owner, public FROM games WHERE id = ?1",
                params![id],
                raw_record,
            )
            .optional()?;

        match record {
            Some(raw) => raw.into_record(),
            None => Err(StoreError::NotFound(id)),
        }
    }

    /// Full record only when the game has been made public
    pub fn get_public_game(&self, id: i64) -> Result<GameRecord, StoreError> {
        let record = self.get_game(id)?;
        if record.public {
            Ok(record)
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    /// Record for `player`: their own games in any state, others' when public
    pub fn get_playable(&self, id: i64, player: &str) -> Result<GameRecord, StoreError> {
        let record = self.get_game(id)?;
        if record.public || record.owner.as_deref() == Some(player) {
            Ok(record)
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    pub fn make_public(&self, id: i64, owner: &str) -> Result<(), StoreError> {
        self.check_owner(id, owner)?;
        self.conn
            .execute("UPDATE games SET public = 1 WHERE id = ?1", params![id])?;
        info!("game {id} is now public");
        Ok(())
    }

    pub fn delete_game(&self, id: i64, owner: &str) -> Result<(), StoreError> {
        self.check_owner(id, owner)?;
        self.conn
            .execute("DELETE FROM games WHERE id = ?1", params![id])?;
        info!("deleted game {id}");
        Ok(())
    }

    pub fn record_result(&self, result: &PlayResult) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO play_results
            (game_id, title, kind, player, score, misses, total, elapsed_ms, played_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                result.game_id,
                result.title,
                result.kind.to_string(),
                result.player,
                result.score as i64,
                result.misses as i64,
                result.total as i64,
                result.elapsed_ms as i64,
                result.played_at.to_rfc3339(),
            ],
        )?;
        debug!("recorded result for '{}'", result.title);
        Ok(())
    }

    /// Most recent results first
    pub fn recent_results(&self, limit: usize) -> Result<Vec<PlayResult>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT game_id, title, kind, player, score, misses, total, elapsed_ms, played_at
            FROM play_results
            ORDER BY played_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let played_at: String = row.get(8)?;
            let played_at = DateTime::parse_from_rfc3339(&played_at)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        8,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Local);

            Ok(PlayResult {
                game_id: row.get(0)?,
                title: row.get(1)?,
                kind: parse_kind(row, 2)?,
                player: row.get(3)?,
                score: row.get::<_, i64>(4)? as usize,
                misses: row.get::<_, i64>(5)? as usize,
                total: row.get::<_, i64>(6)? as usize,
                elapsed_ms: row.get::<_, i64>(7)? as u64,
                played_at,
            })
        })?;

        let mut results = Vec::new();
        for r in rows {
            results.push(r?);
        }
        Ok(results)
    }

    fn check_owner(&self, id: i64, owner: &str) -> Result<(), StoreError> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT owner FROM games WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            None => Err(StoreError::NotFound(id)),
            Some(o) if o == owner => Ok(()),
            Some(_) => Err(StoreError::NotOwner(id)),
        }
    }

    fn query_listings(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<GameListing>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            let data: String = row.get(4)?;
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                parse_kind(row, 2)?,
                row.get::<_, bool>(3)?,
                data,
            ))
        })?;

        let mut listings = Vec::new();
        for r in rows {
            let (id, title, kind, public, data) = r?;
            let pairs: Vec<RawPair> = serde_json::from_str(&data)?;
            listings.push(GameListing {
                id,
                title,
                kind,
                public,
                pairs: pairs.len(),
            });
        }
        Ok(listings)
    }
}

struct RawRecord {
    id: i64,
    title: String,
    kind: GameKind,
    data: String,
    owner: String,
    public: bool,
}

impl RawRecord {
    fn into_record(self) -> Result<GameRecord, StoreError> {
        Ok(GameRecord {
            id: Some(self.id),
            title: self.title,
            kind: self.kind,
            data: serde_json::from_str(&self.data)?,
            public: self.public,
            owner: Some(self.owner),
        })
    }
}

fn raw_record(row: &Row) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        kind: parse_kind(row, 2)?,
        data: row.get(3)?,
        owner: row.get(4)?,
        public: row.get(5)?,
    })
}

fn parse_kind(row: &Row, idx: usize) -> rusqlite::Result<GameKind> {
    let text: String = row.get(idx)?;
    GameKind::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })
}
