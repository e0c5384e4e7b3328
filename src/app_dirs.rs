use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("pairplay")
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "pairplay") {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }

    /// SQLite file holding the game library and play history
    pub fn db_path() -> PathBuf {
        Self::state_dir().join("games.db")
    }

    /// Where the binary sends log output while the TUI owns the terminal
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("pairplay.log")
    }

    pub fn config_path() -> PathBuf {
        match ProjectDirs::from("", "", "pairplay") {
            Some(pd) => pd.config_dir().join("config.json"),
            None => PathBuf::from("pairplay_config.json"),
        }
    }
}
