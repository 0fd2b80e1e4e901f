//! Run command implementation

use crate::config::Config;
use crate::data::{KucoinClient, KucoinConfig};
use crate::delivery::{LogSink, MemoryOutcomeFeed};
use crate::scanner::Scanner;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let market = Arc::new(KucoinClient::with_config(KucoinConfig {
            timeout: Duration::from_secs(config.data.fetch_timeout_secs),
            ..KucoinConfig::default()
        }));
        let sink = Arc::new(LogSink);
        let feed = Arc::new(MemoryOutcomeFeed::new());

        let mut scanner = Scanner::new(config, market, sink, feed);
        scanner.run().await
    }
}
