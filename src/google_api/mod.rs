//! Native Google Sheets API access
//!
//! Direct HTTP via reqwest; no SDK. Credentials resolve in order:
//! 1. GOOGLE_CREDENTIALS env var holding the OAuth token JSON (hosted deploys)
//! 2. Token file on disk (local runs, path from config)
//!
//! Modules:
//! - sheets: Sheets API v4 value/worksheet operations

pub mod sheets;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Env var checked before the token file, mirroring hosted deployments
/// where secrets arrive through the environment.
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS";

/// Scope required for reading and writing the backing spreadsheet.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// OAuth2 token payload.
///
/// Field names match what Python's `google.oauth2.credentials.Credentials.to_json()`
/// produces; both `token` and `access_token` are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    #[serde(alias = "access_token")]
    pub token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Token expiry time (ISO 8601)
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default, alias = "email")]
    pub account: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Where the token came from. File-backed tokens are written back after a
/// refresh; env-backed tokens are refreshed in memory only.
#[derive(Debug, Clone)]
enum CredentialSource {
    Env,
    File(PathBuf),
}

/// Token provider for the Sheets client.
///
/// Holds the last loaded token behind a tokio Mutex so concurrent requests
/// share one refresh instead of racing the token endpoint.
pub struct SheetsAuth {
    source: CredentialSource,
    cached: Mutex<Option<GoogleToken>>,
}

impl SheetsAuth {
    /// Build from config. The env var wins when set; otherwise the configured
    /// token file path, falling back to ~/.opsdesk/google/token.json.
    pub fn from_config(credentials_path: Option<&str>) -> Self {
        let source = if std::env::var(CREDENTIALS_ENV).is_ok() {
            CredentialSource::Env
        } else {
            let path = credentials_path
                .map(PathBuf::from)
                .unwrap_or_else(default_token_path);
            CredentialSource::File(path)
        };
        Self {
            source,
            cached: Mutex::new(None),
        }
    }

    /// Get a valid access token, refreshing if expired.
    ///
    /// This is the entry point for every Sheets API call.
    pub async fn access_token(&self) -> Result<String, StoreError> {
        let mut guard = self.cached.lock().await;

        if let Some(token) = guard.as_ref() {
            if !is_token_expired(token) {
                return Ok(token.token.clone());
            }
        }

        let mut token = match guard.take() {
            Some(t) => t,
            None => self.load()?,
        };

        if is_token_expired(&token) {
            token = refresh_access_token(&token).await?;
            if let CredentialSource::File(ref path) = self.source {
                if let Err(e) = persist_token(path, &token) {
                    log::warn!("Failed to persist refreshed token: {}", e);
                }
            }
        }

        let access = token.token.clone();
        *guard = Some(token);
        Ok(access)
    }

    fn load(&self) -> Result<GoogleToken, StoreError> {
        let raw = match &self.source {
            CredentialSource::Env => std::env::var(CREDENTIALS_ENV).map_err(|_| {
                StoreError::Credentials(format!("{} is not set", CREDENTIALS_ENV))
            })?,
            CredentialSource::File(path) => {
                if !path.exists() {
                    return Err(StoreError::Credentials(format!(
                        "Token file not found at {}",
                        path.display()
                    )));
                }
                std::fs::read_to_string(path).map_err(|e| {
                    StoreError::Credentials(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Credentials(format!("Invalid token JSON: {}", e)))
    }
}

/// Default token file path (~/.opsdesk/google/token.json)
pub fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".opsdesk")
        .join("google")
        .join("token.json")
}

fn persist_token(path: &std::path::Path, token: &GoogleToken) -> Result<(), String> {
    let content = serde_json::to_string_pretty(token).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(path, content).map_err(|e| e.to_string())
}

/// Check if a token is expired based on its expiry field.
pub fn is_token_expired(token: &GoogleToken) -> bool {
    match &token.expiry {
        None => true, // No expiry = assume expired, try refresh
        Some(expiry_str) => {
            match chrono::DateTime::parse_from_rfc3339(&expiry_str.replace('Z', "+00:00"))
                .or_else(|_| chrono::DateTime::parse_from_rfc3339(expiry_str))
            {
                Ok(expiry) => {
                    // Consider expired if within 60 seconds of expiry
                    let now = chrono::Utc::now();
                    expiry <= now + chrono::Duration::seconds(60)
                }
                Err(_) => true, // Can't parse = assume expired
            }
        }
    }
}

/// Refresh an access token using the refresh token.
pub async fn refresh_access_token(token: &GoogleToken) -> Result<GoogleToken, StoreError> {
    let refresh_token = token.refresh_token.as_ref().ok_or_else(|| {
        StoreError::Credentials("token expired and no refresh token present".to_string())
    })?;

    let mut form = vec![
        ("client_id", token.client_id.as_str()),
        ("refresh_token", refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = token.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let client = reqwest::Client::new();
    let resp = client.post(&token.token_uri).form(&form).send().await?;
    let status = resp.status();
    let body_text = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(map_refresh_error(status.as_u16(), &body_text));
    }

    let body: serde_json::Value = serde_json::from_str(&body_text)?;
    let access_token = body["access_token"].as_str().ok_or_else(|| {
        StoreError::Credentials("No access_token in refresh response".to_string())
    })?;

    let expires_in = body["expires_in"].as_u64().unwrap_or(3600);
    let expiry = chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64);

    let mut new_token = token.clone();
    new_token.token = access_token.to_string();
    new_token.expiry = Some(expiry.to_rfc3339());
    Ok(new_token)
}

fn map_refresh_error(status: u16, body: &str) -> StoreError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("token has been expired"))
    {
        return StoreError::Credentials("refresh token expired or revoked".to_string());
    }
    StoreError::Credentials(format!("token refresh failed: HTTP {}: {}", status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expiry: Option<String>) -> GoogleToken {
        GoogleToken {
            token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: default_token_uri(),
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: None,
            scopes: vec![SPREADSHEETS_SCOPE.to_string()],
            expiry,
            account: None,
        }
    }

    #[test]
    fn test_token_python_compat() {
        // Format Python's google-auth writes
        let json = r#"{
            "token": "ya29.python-token",
            "refresh_token": "1//python-refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
            "expiry": "2026-02-08T12:00:00.000000Z",
            "account": "ops@company.com"
        }"#;

        let token: GoogleToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.token, "ya29.python-token");
        assert_eq!(token.account.as_deref(), Some("ops@company.com"));
    }

    #[test]
    fn test_token_access_token_alias() {
        let json = r#"{
            "access_token": "ya29.alias-token",
            "refresh_token": "1//refresh",
            "client_id": "client"
        }"#;

        let token: GoogleToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.token, "ya29.alias-token");
    }

    #[test]
    fn test_is_token_expired_no_expiry() {
        assert!(is_token_expired(&token(None)));
    }

    #[test]
    fn test_is_token_expired_future() {
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        assert!(!is_token_expired(&token(Some(future.to_rfc3339()))));
    }

    #[test]
    fn test_is_token_expired_past() {
        let past = chrono::Utc::now() - chrono::Duration::hours(1);
        assert!(is_token_expired(&token(Some(past.to_rfc3339()))));
    }

    #[tokio::test]
    async fn test_missing_token_file_is_credentials_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join("token.json");
        let auth = SheetsAuth {
            source: CredentialSource::File(missing),
            cached: Mutex::new(None),
        };
        let err = auth.access_token().await.unwrap_err();
        assert!(err.is_credentials());
    }

    #[tokio::test]
    async fn test_valid_file_token_used_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        std::fs::write(
            &path,
            serde_json::to_string(&token(Some(future.to_rfc3339()))).unwrap(),
        )
        .unwrap();

        let auth = SheetsAuth {
            source: CredentialSource::File(path),
            cached: Mutex::new(None),
        };
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
    }
}
