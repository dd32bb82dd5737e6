use anyhow::{Context, Result};
use log::debug;
use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::config::endpoint;

use super::Crm;

const EVENTS_PATH: &str = "/api/v4/events";
const EVENT_TYPE_FILTER: (&str, &str) = ("filter[type]", "entity_linked");

impl Crm {
    /// Fetches the `entity_linked` event feed. The body is returned as-is,
    /// whatever the status code.
    pub async fn fetch_events(&self) -> Result<String> {
        let url = endpoint(&self.base_url, EVENTS_PATH)?;

        let response = self
            .client
            .get(url)
            .query(&[EVENT_TYPE_FILTER])
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.access_token))?,
            )
            .send()
            .await
            .context("Error sending request for events")?;
        debug!("GET {} -> {}", response.url(), response.status());

        Ok(response
            .text()
            .await
            .context("Unable to get text from events response")?)
    }
}
