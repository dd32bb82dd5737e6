//! Google Sheets v4 values API, authorized with a service account.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, TimeZone};
use log::{debug, info};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{endpoint, PipelineConfig};

pub mod locate;

pub use locate::{target_cell, CellRange};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const RECORD_COLUMN: &str = "A:A";

#[derive(Deserialize, Debug)]
struct ColumnValues {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<&'a str>>,
}

#[derive(Debug)]
pub struct Sheets {
    base_url: Url,
    spreadsheet_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl Sheets {
    pub fn new(base_url: Url, spreadsheet_id: &str, access_token: &str) -> Sheets {
        Sheets {
            base_url,
            spreadsheet_id: String::from(spreadsheet_id),
            access_token: String::from(access_token),
            client: reqwest::Client::new(),
        }
    }

    /// Exchanges the service-account key for an access token covering
    /// [`SCOPES`].
    pub async fn authorize(config: &PipelineConfig) -> Result<Sheets> {
        let key = yup_oauth2::read_service_account_key(&config.credentials_file)
            .await
            .with_context(|| {
                format!(
                    "Unable to read service account key {}",
                    config.credentials_file.display()
                )
            })?;
        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("Unable to create service account authenticator")?;
        let token = auth
            .token(SCOPES)
            .await
            .context("Unable to get service account token")?;
        let access_token = token
            .token()
            .context("Service account token response had no access token")?;

        Ok(Sheets::new(
            config.sheets_base_url.clone(),
            &config.spreadsheet_id,
            access_token,
        ))
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = endpoint(&self.base_url, "/v4/spreadsheets")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets base url {} cannot take a path", self.base_url))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }

    fn bearer(&self) -> Result<HeaderValue> {
        Ok(HeaderValue::from_str(&format!(
            "Bearer {}",
            self.access_token
        ))?)
    }

    /// Every row of column A, in order. Empty when nothing was written yet.
    pub async fn read_column(&self) -> Result<Vec<Vec<String>>> {
        let response = self
            .client
            .get(self.values_url(RECORD_COLUMN)?)
            .query(&[("majorDimension", "ROWS")])
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await
            .context("Error sending request for sheet values")?;
        let status = response.status();
        debug!("GET {} -> {}", response.url(), status);

        let text = response
            .text()
            .await
            .context("Unable to get text from sheet values response")?;
        if !status.is_success() {
            bail!("Sheets API error reading {RECORD_COLUMN}: HTTP {status} - {text}");
        }

        let column: ColumnValues =
            serde_json::from_str(&text).context("Unable to parse sheet values response")?;
        Ok(column.values)
    }

    pub async fn locate_cell<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<CellRange> {
        let column = self.read_column().await?;
        let cell = target_cell(&column, now)?;
        info!(
            "Column {RECORD_COLUMN} has {} rows, writing to {cell}",
            column.len()
        );
        Ok(cell)
    }

    /// Replaces the content of `cell` with `record`.
    pub async fn write_cell(&self, cell: CellRange, record: &str) -> Result<()> {
        let range = cell.to_string();
        let body = ValueRange {
            range: range.clone(),
            major_dimension: "COLUMNS",
            values: vec![vec![record]],
        };

        let response = self
            .client
            .put(self.values_url(&range)?)
            .query(&[("valueInputOption", "RAW")])
            .header(AUTHORIZATION, self.bearer()?)
            .json(&body)
            .send()
            .await
            .context("Error sending sheet update")?;
        let status = response.status();
        debug!("PUT {} -> {}", response.url(), status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Sheets API error updating {range}: HTTP {status} - {text}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::stub::StubServer;

    #[tokio::test]
    async fn read_column_requests_column_a_rows() {
        let server = StubServer::serve(vec![(
            200,
            json!({"range": "Sheet1!A1:A2", "majorDimension": "ROWS", "values": [["a"], ["b"]]})
                .to_string(),
        )]);

        let sheets = Sheets::new(server.base_url.clone(), "sheet-id", "sa-token");
        let column = sheets.read_column().await.unwrap();

        let requests = server.finish();
        assert_eq!(column, vec![vec!["a".to_string()], vec!["b".to_string()]]);
        assert_eq!(
            requests[0].url,
            "/v4/spreadsheets/sheet-id/values/A:A?majorDimension=ROWS"
        );
        assert_eq!(requests[0].header("Authorization"), Some("Bearer sa-token"));
    }

    #[tokio::test]
    async fn empty_sheet_has_no_values_field() {
        let server = StubServer::serve(vec![(
            200,
            json!({"range": "Sheet1!A1:A1000", "majorDimension": "ROWS"}).to_string(),
        )]);

        let sheets = Sheets::new(server.base_url.clone(), "sheet-id", "sa-token");
        let cell = sheets.locate_cell(&Utc::now()).await.unwrap();
        server.finish();

        assert_eq!(cell.to_string(), "A1:A1");
    }

    #[tokio::test]
    async fn write_cell_puts_single_raw_value() {
        let server = StubServer::serve(vec![(200, "{}".to_string())]);

        let sheets = Sheets::new(server.base_url.clone(), "sheet-id", "sa-token");
        sheets
            .write_cell(CellRange::new(4), r#"{"date":1.5,"events":{}}"#)
            .await
            .unwrap();

        let requests = server.finish();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(
            requests[0].url,
            "/v4/spreadsheets/sheet-id/values/A4:A4?valueInputOption=RAW"
        );
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(
            body,
            json!({
                "range": "A4:A4",
                "majorDimension": "COLUMNS",
                "values": [[r#"{"date":1.5,"events":{}}"#]],
            })
        );
    }

    #[tokio::test]
    async fn api_errors_are_reported() {
        let server = StubServer::serve(vec![(
            403,
            json!({"error": {"code": 403, "status": "PERMISSION_DENIED"}}).to_string(),
        )]);

        let sheets = Sheets::new(server.base_url.clone(), "sheet-id", "sa-token");
        let err = sheets.read_column().await.unwrap_err();
        server.finish();

        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }
}
