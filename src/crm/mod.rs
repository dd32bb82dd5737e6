use url::Url;

use crate::config::PipelineConfig;

pub mod auth;
pub mod events;

/// Authenticated access to the CRM API.
#[derive(Debug)]
pub struct Crm {
    base_url: Url,
    access_token: String,
    client: reqwest::Client,
}

impl Crm {
    pub fn new(base_url: Url, access_token: &str) -> Crm {
        Crm {
            base_url,
            access_token: String::from(access_token),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Crm {
        Crm::new(config.base_url.clone(), &config.access_token)
    }
}
