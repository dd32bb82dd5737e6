use std::{fmt, fs, str::FromStr};

use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::{endpoint, CrmAuthConfig};

const ACCESS_TOKEN_PATH: &str = "/oauth2/access_token";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrantType {
    #[default]
    AuthorizationCode,
    RefreshToken,
    /// Sent as-is, without a grant-specific credential.
    Other(String),
}

impl GrantType {
    pub fn as_str(&self) -> &str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
            GrantType::Other(grant) => grant,
        }
    }
}

impl FromStr for GrantType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<GrantType, Self::Err> {
        Ok(match s {
            "authorization_code" => GrantType::AuthorizationCode,
            "refresh_token" => GrantType::RefreshToken,
            other => GrantType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a successful grant exchange.
#[allow(unused)]
#[derive(Deserialize, Debug)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize, Debug, PartialEq)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    redirect_uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

impl<'a> TokenRequest<'a> {
    fn new(config: &'a CrmAuthConfig, grant: &'a GrantType) -> TokenRequest<'a> {
        let (code, refresh_token) = match grant {
            GrantType::AuthorizationCode => (config.authorization_code.as_deref(), None),
            GrantType::RefreshToken => (None, config.refresh_token.as_deref()),
            GrantType::Other(_) => (None, None),
        };
        TokenRequest {
            client_id: &config.client_id,
            client_secret: &config.client_secret,
            grant_type: grant.as_str(),
            redirect_uri: &config.redirect_uri,
            code,
            refresh_token,
        }
    }
}

/// Exchanges the configured grant for tokens and overwrites the token file
/// with the response, whatever its status.
pub async fn exchange_grant(config: &CrmAuthConfig, grant: &GrantType) -> Result<()> {
    let url = endpoint(&config.base_url, ACCESS_TOKEN_PATH)?;
    let body = serde_urlencoded::to_string(TokenRequest::new(config, grant))
        .context("Error url-encoding token request")?;

    info!("Requesting {} grant from {}", grant, url);
    let response = reqwest::Client::new()
        .post(url)
        .header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        )
        .body(body)
        .send()
        .await
        .context("Error sending request for access token")?;
    let status = response.status();

    let token: serde_json::Value = serde_json::from_str(
        &response
            .text()
            .await
            .context("Unable to get text from access token response")?,
    )
    .with_context(|| format!("Access token response ({status}) is not json"))?;

    fs::write(&config.token_file, serde_json::to_string(&token)?).with_context(|| {
        format!("Unable to write token file {}", config.token_file.display())
    })?;
    info!(
        "Wrote {} token response to {}",
        status,
        config.token_file.display()
    );

    if let Err(e) = serde_json::from_value::<TokenRecord>(token) {
        warn!("Token response does not look like a token: {e}");
    }

    Ok(())
}
