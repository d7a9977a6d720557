use anyhow::{Context, Result};
use std::sync::Arc;

pub mod cli;
pub mod core;
pub mod error;
pub mod export;
pub mod render;
pub mod session;
pub mod types;
pub mod utils;

pub use crate::core::{ConfigManager, JobService, ServiceClient};
pub use error::{ClientError, ClientResult};
pub use session::{Command, Controller, Effect, Phase};

/// Build a controller talking to the configured job service.
pub fn connect(config: &ConfigManager) -> Result<Controller<ServiceClient>> {
    let client = ServiceClient::new(&config.service).context("Failed to create HTTP client")?;

    Ok(Controller::new(
        Arc::new(client),
        config.service.poll_interval,
        config.environment.export_dir.clone(),
    ))
}
