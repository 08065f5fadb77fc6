use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::Settings;
use crate::services::grid::BatchGrid;

/// Everything one user works on: the staging grid and the orders recorded so far.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub grid: BatchGrid,
    pub ledger: Ledger,
}

pub struct AppState {
    settings: Mutex<Settings>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        AppState {
            settings: Mutex::new(settings),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings = self.settings.lock().map_err(|_| Error::StatePoisoned("Settings"))?;
        Ok(settings.clone())
    }

    pub fn update_settings(&self, settings: Settings) -> Result<()> {
        let mut locked = self.settings.lock().map_err(|_| Error::StatePoisoned("Settings"))?;
        tracing::info!(default_margin_mode = %settings.default_margin_mode, "settings updated");
        *locked = settings;
        Ok(())
    }

    /// Creates the session on first use; opening an existing session keeps its state.
    pub fn open_session(&self, session_id: &str) -> Result<()> {
        let default_mode = self.settings()?.default_margin_mode;
        let mut sessions = self.sessions.lock().map_err(|_| Error::StatePoisoned("Sessions"))?;
        sessions.entry(session_id.to_string()).or_insert_with(|| {
            tracing::info!(session_id, "session opened");
            Session {
                grid: BatchGrid::new(default_mode),
                ledger: Ledger::new(),
            }
        });
        Ok(())
    }

    pub fn close_session(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.lock().map_err(|_| Error::StatePoisoned("Sessions"))?;
        let existed = sessions.remove(session_id).is_some();
        if existed {
            tracing::info!(session_id, "session closed");
        }
        Ok(existed)
    }

    pub fn with_session<T>(&self, session_id: &str, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let mut sessions = self.sessions.lock().map_err(|_| Error::StatePoisoned("Sessions"))?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
        Ok(f(session))
    }
}
