use serde::Deserialize;

use crate::error::Result;
use crate::models::{MarginMode, Settings};
use crate::services::state::AppState;

/// Runtime-editable settings. The log level is fixed at start-up from
/// `PURCHASE_LOG_LEVEL` and is not accepted here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPayload {
    pub default_margin_mode: Option<String>,
}

pub fn get_settings(state: &AppState) -> Result<Settings> {
    state.settings()
}

/// Applies the fields present in `payload`; a bad mode label rejects the whole update.
pub fn save_settings(payload: SettingsPayload, state: &AppState) -> Result<Settings> {
    let mut settings = state.settings()?;

    if let Some(value) = payload.default_margin_mode {
        settings.default_margin_mode = value.parse::<MarginMode>()?;
    }

    state.update_settings(settings.clone())?;
    Ok(settings)
}
