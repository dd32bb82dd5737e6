use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use log::{error, info};

pub mod config;
pub mod crm;
pub mod error;
pub mod record;
pub mod sheets;

#[cfg(test)]
mod stub;

use config::PipelineConfig;
use crm::Crm;
use error::RecordError;
use sheets::Sheets;

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Fetches the event feed once and stores it as today's record.
pub async fn run(config: &PipelineConfig) -> Result<()> {
    let sheets = Sheets::authorize(config).await?;
    let crm = Crm::from_config(config);
    write_events(&crm, &sheets, &Local::now()).await
}

/// Exit status for a failed run that ends deliberately rather than by
/// propagating the error: 1 for an unusable event feed, logged once here.
pub fn exit_code(err: &anyhow::Error) -> Option<i32> {
    let err = err.downcast_ref::<RecordError>()?;
    error!("{err}");
    Some(1)
}

pub async fn write_events<Tz: TimeZone>(
    crm: &Crm,
    sheets: &Sheets,
    now: &DateTime<Tz>,
) -> Result<()> {
    info!("Fetching entity_linked events");
    let events = crm.fetch_events().await?;
    let dated = record::build_record_at(&events, now)?;

    let cell = sheets.locate_cell(now).await?;
    sheets.write_cell(cell, &dated).await?;
    info!("Stored events in {cell}");

    Ok(())
}
