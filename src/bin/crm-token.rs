//! Exchanges an OAuth2 grant with the CRM and stores the response in the
//! token file. The only argument is the grant type, `authorization_code` by
//! default.

use std::env;

use anyhow::Result;
use ces::{
    config::CrmAuthConfig,
    crm::auth::{exchange_grant, GrantType},
};

#[tokio::main]
async fn main() -> Result<()> {
    ces::init_logging();

    let grant = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => GrantType::default(),
    };
    let config = CrmAuthConfig::from_env()?;

    exchange_grant(&config, &grant).await
}
