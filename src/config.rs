use std::{env, env::VarError, path::PathBuf};

use url::Url;

use crate::{errors::AppError, session::DEFAULT_LOGIN_PATH};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORAGE_PATH: &str = "rans_session.json";
pub const DEFAULT_DB_URL: &str = "http://localhost:8529";
pub const DEFAULT_DB_NAME: &str = "project2";
pub const DEFAULT_DB_USER: &str = "root";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub storage_path: PathBuf,
    pub login_path: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key))
    }

    pub fn from_vars(var: impl Fn(&str) -> Result<String, VarError>) -> Result<Self, AppError> {
        Ok(Self {
            api_url: Url::parse(&var_or(&var, "RANS_API_URL", DEFAULT_API_URL))?,
            storage_path: var_or(&var, "RANS_STORAGE_PATH", DEFAULT_STORAGE_PATH).into(),
            login_path: var_or(&var, "RANS_LOGIN_PATH", DEFAULT_LOGIN_PATH),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: Url,
    pub name: String,
    pub username: String,
    pub password: String,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key))
    }

    pub fn from_vars(var: impl Fn(&str) -> Result<String, VarError>) -> Result<Self, AppError> {
        let password = var("ARANGO_PASSWORD").map_err(|e| {
            log::error!("FATAL: ARANGO_PASSWORD environment variable not set");
            AppError::EnvVarError(e)
        })?;
        Ok(Self {
            url: Url::parse(&var_or(&var, "ARANGO_URL", DEFAULT_DB_URL))?,
            name: var_or(&var, "ARANGO_DB", DEFAULT_DB_NAME),
            username: var_or(&var, "ARANGO_USER", DEFAULT_DB_USER),
            password,
        })
    }
}

fn var_or(var: &impl Fn(&str) -> Result<String, VarError>, key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| {
        log::info!("{key} not set, using default: {default}");
        default.to_owned()
    })
}
