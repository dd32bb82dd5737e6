use std::{env, path::PathBuf};

use url::Url;

use crate::error::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

const DEFAULT_TOKEN_FILE: &str = "tokens.json";
const DEFAULT_CREDENTIALS_FILE: &str = "creds.json";
const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Settings for the OAuth2 grant exchange against the CRM.
#[derive(Debug, Clone)]
pub struct CrmAuthConfig {
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_code: Option<String>,
    pub refresh_token: Option<String>,
    pub token_file: PathBuf,
}

/// Settings for one fetch-and-write run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: Url,
    pub access_token: String,
    pub spreadsheet_id: String,
    pub credentials_file: PathBuf,
    pub sheets_base_url: Url,
}

impl CrmAuthConfig {
    pub fn from_env() -> Result<CrmAuthConfig> {
        dotenvy::dotenv().ok();
        CrmAuthConfig::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<CrmAuthConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(CrmAuthConfig {
            base_url: url_var(&lookup, "BASE_URL", None)?,
            client_id: required(&lookup, "CLIENT_ID")?,
            client_secret: required(&lookup, "SECRET_KEY")?,
            redirect_uri: required(&lookup, "REDIRECT_URL")?,
            authorization_code: lookup("AUTHORIZATION_CODE"),
            refresh_token: lookup("REFRESH_TOKEN"),
            token_file: lookup("TOKEN_FILE")
                .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
                .into(),
        })
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<PipelineConfig> {
        dotenvy::dotenv().ok();
        PipelineConfig::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<PipelineConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(PipelineConfig {
            base_url: url_var(&lookup, "BASE_URL", None)?,
            access_token: required(&lookup, "ACCESS_TOKEN")?,
            spreadsheet_id: required(&lookup, "SPREADSHEET_ID")?,
            credentials_file: lookup("GOOGLE_CREDENTIALS")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
                .into(),
            sheets_base_url: url_var(&lookup, "SHEETS_BASE_URL", Some(DEFAULT_SHEETS_BASE_URL))?,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn url_var<F>(lookup: &F, key: &'static str, default: Option<&str>) -> Result<Url>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match (lookup(key).filter(|v| !v.is_empty()), default) {
        (Some(v), _) => v,
        (None, Some(d)) => d.to_string(),
        (None, None) => return Err(ConfigError::Missing(key)),
    };
    Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { key, source })
}

/// Joins `path` onto `base`, keeping any path prefix the base already has.
pub(crate) fn endpoint(base: &Url, path: &str) -> std::result::Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
