// Library surface for the binary, headless tests and reuse.
// Keep this free of ratatui types; rendering lives in the bin.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod game_record;
pub mod history;
pub mod match_session;
pub mod memory_board;
pub mod pair_set;
pub mod play;
pub mod quiz_session;
pub mod runtime;
pub mod session;
pub mod shuffler;
pub mod store;
pub mod util;

pub use engine::{EngineEvent, GameEngine, SessionSummary};
pub use error::{EngineError, EngineResult, StoreError};
pub use game_record::{GameKind, GameRecord};
pub use pair_set::{Pair, PairSet, RawPair};
