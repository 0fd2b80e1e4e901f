//! Scan command implementation

use crate::config::Config;
use crate::data::{KucoinClient, KucoinConfig};
use crate::delivery::{LogSink, MemoryOutcomeFeed};
use crate::scanner::Scanner;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Override the number of symbols scanned
    #[arg(long)]
    pub limit: Option<usize>,
}

impl ScanArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(limit) = self.limit {
            config.scan.scan_limit = limit;
        }
        let market = Arc::new(KucoinClient::with_config(KucoinConfig {
            timeout: Duration::from_secs(config.data.fetch_timeout_secs),
            ..KucoinConfig::default()
        }));
        let sink = Arc::new(LogSink);
        let feed = Arc::new(MemoryOutcomeFeed::new());

        let mut scanner = Scanner::new(config, market, sink, feed);
        let report = scanner.sweep().await?;
        println!(
            "Swept {} symbols: {} candidates, {} strong, {} emitted",
            report.scanned, report.candidates, report.strong, report.emitted
        );
        Ok(())
    }
}
