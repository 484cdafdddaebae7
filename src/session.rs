//! Persisted view scope: the selected client, its cached display fields
//! and the bearer token, stored as one JSON file in the platform config
//! directory and read on startup to re-establish the scope.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub client_cnpj: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
}

impl Session {
    /// Standard configuration directory depending on the platform.
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("faltas")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".faltas")
        }
    }

    pub fn session_file() -> PathBuf {
        Self::config_dir().join("session.json")
    }

    /// Load the stored session, or defaults when there is none. A corrupt
    /// file is reported and treated as absent rather than aborting.
    pub fn load() -> Self {
        Self::load_from(&Self::session_file())
    }

    fn load_from(path: &PathBuf) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(session) => session,
                Err(e) => {
                    warn!("Ignoring corrupt session file {}: {e}", path.display());
                    Session::default()
                }
            },
            Err(_) => Session::default(),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::session_file())
    }

    fn save_to(&self, path: &PathBuf) -> Result<(), AppError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Session(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = env::temp_dir().join("faltas-session-test");
        let path = dir.join("session.json");
        let _ = fs::remove_file(&path);

        let session = Session {
            client_id: Some(42),
            client_name: Some("Acme Ltda".to_string()),
            client_cnpj: Some("12.345.678/0001-90".to_string()),
            api_url: Some("http://localhost:8000".to_string()),
            token: Some("tok".to_string()),
        };
        session.save_to(&path).unwrap();

        let loaded = Session::load_from(&path);
        assert_eq!(loaded.client_id, Some(42));
        assert_eq!(loaded.client_name.as_deref(), Some("Acme Ltda"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = env::temp_dir().join("faltas-session-missing.json");
        let _ = fs::remove_file(&path);
        let loaded = Session::load_from(&path);
        assert!(loaded.client_id.is_none());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let path = env::temp_dir().join("faltas-session-corrupt.json");
        fs::write(&path, "{not json").unwrap();
        let loaded = Session::load_from(&path);
        assert!(loaded.client_id.is_none());
        fs::remove_file(&path).unwrap();
    }
}
