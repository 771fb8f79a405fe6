//! CLI command implementations.

pub mod check;
pub mod once;
pub mod run;

use anyhow::{Context, Result};
use echo_client::TwitterClient;

use crate::config::EchoConfig;

/// HTTP clients for one bot instance.
pub struct Clients {
    /// Reads the source timeline and downloads attachments.
    pub reader: TwitterClient,
    /// Publishes to the destination account.
    pub writer: TwitterClient,
}

impl Clients {
    /// Build the reader and writer clients from configuration.
    pub fn from_config(config: &EchoConfig) -> Result<Self> {
        let reader =
            TwitterClient::new(config.reader_client()).context("Failed to build reader client")?;
        let writer =
            TwitterClient::new(config.writer_client()).context("Failed to build writer client")?;
        Ok(Self { reader, writer })
    }
}
