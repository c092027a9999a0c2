use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

/// One request line from the host: `{"id", "method", "params"}`. Methods
/// are dotted family names (`schedule.grid`, `faculty.search`); params may
/// be omitted for methods like `health` that take none.
#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Daemon state across requests: the selected workspace directory and the
/// routine database opened inside it by `workspace.select`.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}
