//! Log destinations from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file that receives one line per session event
    pub decision_log: Option<PathBuf>,
    /// File that receives diagnostic logs instead of stderr
    pub log_file: Option<PathBuf>,
}
