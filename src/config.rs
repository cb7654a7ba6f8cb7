// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::models::ChallengeWindow;
use crate::time_utils::parse_iso_date;
use std::env;

const DEFAULT_CHALLENGE_START: &str = "2025-12-08";
const DEFAULT_CHALLENGE_END: &str = "2025-12-23";
const DEFAULT_DAILY_TARGET_MILES: f64 = 20.0;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Route catalog JSON file
    pub catalog_path: String,
    /// Local snapshot slot
    pub local_store_path: String,

    // --- Remote sync ---
    /// Firebase Realtime Database URL; `None` runs local-only
    pub firebase_database_url: Option<String>,
    pub firebase_auth_token: Option<String>,
    /// Name of the shared record
    pub sync_record: String,

    // --- Challenge ---
    pub challenge: ChallengeWindow,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self::test_default()
    }
}

impl Config {
    /// Configuration for tests: local-only, default challenge window.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            catalog_path: "data/routes_data.json".to_string(),
            local_store_path: "data/calendar_state.json".to_string(),
            firebase_database_url: None,
            firebase_auth_token: None,
            sync_record: "zwiftUserData".to_string(),
            challenge: default_challenge(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let start = env_date("CHALLENGE_START", DEFAULT_CHALLENGE_START)?;
        let end = env_date("CHALLENGE_END", DEFAULT_CHALLENGE_END)?;
        if end < start {
            return Err(ConfigError::Invalid {
                name: "CHALLENGE_END",
                reason: "ends before CHALLENGE_START".to_string(),
            });
        }
        let daily_target_miles = match env::var("DAILY_TARGET_MILES") {
            Ok(v) => v.trim().parse::<f64>().map_err(|e| ConfigError::Invalid {
                name: "DAILY_TARGET_MILES",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_DAILY_TARGET_MILES,
        };

        Ok(Self {
            port: match env::var("PORT") {
                Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "PORT",
                    reason: format!("not a port number: {}", v),
                })?,
                Err(_) => 8080,
            },
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            catalog_path: env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "data/routes_data.json".to_string()),
            local_store_path: env::var("LOCAL_STORE_PATH")
                .unwrap_or_else(|_| "data/calendar_state.json".to_string()),
            firebase_database_url: optional_env("FIREBASE_DATABASE_URL"),
            firebase_auth_token: optional_env("FIREBASE_AUTH_TOKEN"),
            sync_record: env::var("SYNC_RECORD").unwrap_or_else(|_| "zwiftUserData".to_string()),
            challenge: ChallengeWindow {
                start,
                end,
                daily_target_miles,
            },
        })
    }
}

fn default_challenge() -> ChallengeWindow {
    ChallengeWindow {
        start: chrono::NaiveDate::from_ymd_opt(2025, 12, 8).unwrap_or(chrono::NaiveDate::MIN),
        end: chrono::NaiveDate::from_ymd_opt(2025, 12, 23).unwrap_or(chrono::NaiveDate::MIN),
        daily_target_miles: DEFAULT_DAILY_TARGET_MILES,
    }
}

/// Non-empty trimmed variable, `None` if unset or blank.
fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_date(name: &'static str, default: &str) -> Result<chrono::NaiveDate, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    parse_iso_date(raw.trim()).ok_or_else(|| ConfigError::Invalid {
        name,
        reason: format!("expected YYYY-MM-DD, got {:?}", raw),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
