use std::process;

use anyhow::Result;
use ces::config::PipelineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    ces::init_logging();

    let config = PipelineConfig::from_env()?;

    if let Err(e) = ces::run(&config).await {
        if let Some(code) = ces::exit_code(&e) {
            process::exit(code);
        }
        return Err(e);
    }

    Ok(())
}
