// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::db::SqliteStore;
use crate::error::Result;

pub const ENV_DB: &str = "CAIXAFREELA_DB";
pub const ENV_USER: &str = "CAIXAFREELA_USER";
pub const ENV_AI_KEY: &str = "GROQ_API_KEY";
pub const ENV_AI_URL: &str = "CAIXAFREELA_AI_URL";
pub const ENV_AI_MODEL: &str = "CAIXAFREELA_AI_MODEL";

pub const DEFAULT_USER: &str = "local";
pub const DEFAULT_AI_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_CURRENCY: &str = "BRL";

const CURRENCY_KEY: &str = "currency";

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit database file; `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
    pub user: String,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds a config from an explicit variable map; blank values count as unset.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Config {
            db_path: get(ENV_DB).map(PathBuf::from),
            user: get(ENV_USER).unwrap_or_else(|| DEFAULT_USER.to_string()),
            ai: AiConfig {
                api_key: get(ENV_AI_KEY),
                endpoint: get(ENV_AI_URL).unwrap_or_else(|| DEFAULT_AI_URL.to_string()),
                model: get(ENV_AI_MODEL).unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            },
        }
    }
}

pub fn currency(store: &SqliteStore) -> Result<String> {
    Ok(store
        .get_setting(CURRENCY_KEY)?
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn set_currency(store: &SqliteStore, ccy: &str) -> Result<()> {
    store.set_setting(CURRENCY_KEY, &ccy.trim().to_uppercase())
}
