//! Configuration loading (~/.opsdesk/config.json)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Every field has a serde default so a minimal config file only needs
/// `spreadsheetId` and `adminPassword`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Key of the shared Google Sheet backing all tables.
    pub spreadsheet_id: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Freshness window for cached table reads, in seconds.
    pub cache_ttl_secs: u64,
    /// Reimbursement rate per mile.
    pub mileage_rate: f64,
    pub admin_username: String,
    pub admin_password: String,
    /// Path to the Google OAuth token file. The GOOGLE_CREDENTIALS env var
    /// takes priority over this when set.
    pub credentials_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            bind_addr: "127.0.0.1:5001".to_string(),
            cache_ttl_secs: 60,
            mileage_rate: 0.65,
            admin_username: "admin".to_string(),
            admin_password: String::new(),
            credentials_path: None,
        }
    }
}

/// Get the canonical config file path (~/.opsdesk/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".opsdesk").join("config.json"))
}

/// Load configuration from ~/.opsdesk/config.json
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    if !path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"spreadsheetId\": \"...\", \"adminPassword\": \"...\" }}",
            path.display()
        ));
    }
    load_config_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    if config.spreadsheet_id.is_empty() {
        return Err("Config is missing spreadsheetId".to_string());
    }

    Ok(config)
}
