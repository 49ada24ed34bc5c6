//! Optional `settings.json` overrides.
//!
//! Every key is optional; unknown keys reject the whole file so typos do not
//! silently fall back to defaults.

use std::fs;
use std::path::Path;

use clock_core::config::Settings;
use clock_core::error::Error;
use log::{debug, warn};
use serde::Deserialize;

const SETTINGS_KEY: &str = "settings.json";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    idle_threshold: Option<u32>,
    frame_interval_ms: Option<u32>,
    sleep_poll_ms: Option<u32>,
    notice_ms: Option<u32>,
    failure_notice_ms: Option<u32>,
    persist_interval_ms: Option<u32>,
    clock_edit_shortcut: Option<bool>,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        Self {
            idle_threshold: file.idle_threshold,
            frame_interval_ms: file.frame_interval_ms,
            sleep_poll_ms: file.sleep_poll_ms,
            notice_ms: file.notice_ms,
            failure_notice_ms: file.failure_notice_ms,
            persist_interval_ms: file.persist_interval_ms,
            clock_edit_shortcut: file.clock_edit_shortcut,
        }
    }
}

/// Reads overrides from `path`. Any failure reports the settings as missing.
pub fn load(path: &Path) -> Result<Settings, Error> {
    match fs::read_to_string(path) {
        Ok(text) => parse(&text),
        Err(err) => {
            debug!("no settings at {}: {err}", path.display());
            Err(Error::ConfigMissing(SETTINGS_KEY))
        }
    }
}

pub fn parse(text: &str) -> Result<Settings, Error> {
    serde_json::from_str::<SettingsFile>(text)
        .map(Settings::from)
        .map_err(|err| {
            warn!("ignoring {SETTINGS_KEY}: {err}");
            Error::ConfigMissing(SETTINGS_KEY)
        })
}
