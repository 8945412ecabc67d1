//! Persistence adapter for action logs.
//!
//! Logs are stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "created": "2025-01-02T10:11:12.345678+01:00",
//!   "records": [
//!     { "type": "mouse_move", "timestamp": 0.0, "x": 10, "y": 20 },
//!     { "type": "key_press", "timestamp": 0.52, "key": "f" }
//!   ]
//! }
//! ```
//!
//! Loading ignores unknown fields and does not check that timestamps are
//! non-decreasing. Files written by older versions (`recorded_actions`,
//! `Button.left`, timestamps without an offset) are accepted.

use crate::{ActionLog, ActionRecord, CoreResult, MacroError};

use std::{fs, io::Write, panic::Location, path::Path};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use error_location::ErrorLocation;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument};

const NAIVE_CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Serialize)]
struct LogDocumentOut<'a> {
    created: String,
    records: &'a [ActionRecord],
}

#[derive(Deserialize)]
struct LogDocumentIn {
    #[serde(deserialize_with = "deserialize_created")]
    created: DateTime<Local>,
    #[serde(alias = "recorded_actions")]
    records: Vec<ActionRecord>,
}

fn parse_created(text: &str) -> Option<DateTime<Local>> {
    if let Ok(stamped) = DateTime::parse_from_rfc3339(text) {
        return Some(stamped.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(text, NAIVE_CREATED_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

fn deserialize_created<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_created(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid created timestamp '{}'", text)))
}

/// Serialize a log to its JSON document.
#[track_caller]
pub fn to_json(log: &ActionLog) -> CoreResult<String> {
    let document = LogDocumentOut {
        created: log.created().to_rfc3339(),
        records: log.records(),
    };
    serde_json::to_string_pretty(&document).map_err(|e| MacroError::MalformedLog {
        reason: format!("Failed to serialize action log: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Parse a log from its JSON document.
///
/// # Errors
///
/// `MalformedLog` if `created` or `records` is missing, a record lacks a
/// required field, or a field has the wrong type.
#[track_caller]
pub fn from_json(text: &str) -> CoreResult<ActionLog> {
    let document: LogDocumentIn =
        serde_json::from_str(text).map_err(|e| MacroError::MalformedLog {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
    Ok(ActionLog::from_records(document.created, document.records))
}

/// Write `log` to `path` atomically, creating parent directories.
///
/// The document goes to a temporary sibling first and is renamed into
/// place after an fsync, so a crash never leaves a half-written file.
#[track_caller]
#[instrument(skip(log), fields(records = log.len()))]
pub fn save(log: &ActionLog, path: &Path) -> CoreResult<()> {
    let contents = to_json(log)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            debug!(dir = ?parent, "Created macro directory");
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(contents.as_bytes())?;
    temp_file.sync_all()?;
    fs::rename(&temp_path, path)?;

    info!(path = ?path, records = log.len(), "Action log saved");
    Ok(())
}

/// Read a log from `path`.
///
/// # Errors
///
/// `Io` when the file cannot be read, `MalformedLog` when its contents do
/// not describe an action log.
#[track_caller]
#[instrument]
pub fn load(path: &Path) -> CoreResult<ActionLog> {
    let contents = fs::read_to_string(path)?;
    let log = from_json(&contents)?;
    info!(path = ?path, records = log.len(), "Action log loaded");
    Ok(log)
}
