use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cadence").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log directory under $HOME/.local/state/cadence, falling back to the
    /// platform data dir when HOME is unset.
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("cadence"),
            )
        } else {
            ProjectDirs::from("", "", "cadence").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}
