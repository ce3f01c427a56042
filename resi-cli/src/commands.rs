//! Command execution over the API client.
//!
//! The executor is the "host layer": it owns the polling timer and the
//! post-command settle delay; the client underneath stays timer-free.

use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{info, warn};

use resi_api::ResiClient;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::output;

/// Seconds to wait after a start/stop before re-reading status; the remote
/// transition is asynchronous to the acknowledgment.
const SETTLE_SECS: u64 = 2;

pub struct CommandExecutor {
    config: AppConfig,
    output: OutputFormat,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, output: OutputFormat) -> Self {
        Self { config, output }
    }

    /// Build the client for this invocation; fails on missing credentials
    /// before any network traffic.
    fn client(&self) -> Result<ResiClient> {
        let (username, password) = self.config.credentials()?;
        match (&self.config.api_url, &self.config.api_url_v2) {
            (Some(api_url), Some(api_url_v2)) => Ok(ResiClient::with_base_urls(
                username, password, api_url, api_url_v2,
            )),
            (None, None) => Ok(ResiClient::new(username, password)),
            _ => Err(AppError::Config(
                "api_url and api_url_v2 must be overridden together".into(),
            )),
        }
    }

    pub async fn check(&self) -> Result<()> {
        let client = self.client()?;
        client.authenticate().await?;
        println!("OK: token acquired and account resolved.");
        Ok(())
    }

    pub async fn list_encoders(&self) -> Result<()> {
        let catalog = self.client()?.encoders().await?;
        output::print_catalog("Encoders", &catalog, self.output)
    }

    pub async fn list_encoder_profiles(&self) -> Result<()> {
        let catalog = self.client()?.encoder_profiles().await?;
        output::print_catalog("Encoder profiles", &catalog, self.output)
    }

    pub async fn list_event_profiles(&self) -> Result<()> {
        let catalog = self.client()?.event_profiles().await?;
        output::print_catalog("Event profiles", &catalog, self.output)
    }

    pub async fn status(&self, encoder_id: &str, force: bool) -> Result<()> {
        let client = self.client()?;
        let record = if force {
            client.status_snapshot(true).await?.remove(encoder_id)
        } else {
            client.status_for(encoder_id).await?
        };
        output::print_status(encoder_id, record.as_ref(), self.output)
    }

    pub async fn start(
        &self,
        encoder_id: &str,
        event_profile_id: &str,
        encoder_profile_id: &str,
        no_verify: bool,
    ) -> Result<()> {
        let client = self.client()?;
        let status = client
            .start_encoder(encoder_id, event_profile_id, encoder_profile_id)
            .await?;
        println!("Start request: HTTP {status}");
        if !status.is_success() {
            return Err(AppError::CommandRejected(status));
        }
        if !no_verify {
            self.settle_and_report(&client, encoder_id).await?;
        }
        Ok(())
    }

    pub async fn stop(&self, encoder_id: &str, no_verify: bool) -> Result<()> {
        let client = self.client()?;
        let status = client.stop_encoder(encoder_id).await?;
        println!("Stop request: HTTP {status}");
        if !status.is_success() {
            return Err(AppError::CommandRejected(status));
        }
        if !no_verify {
            self.settle_and_report(&client, encoder_id).await?;
        }
        Ok(())
    }

    /// Wait out the settle window, then force a refresh and report the
    /// re-evaluated feedback state.
    async fn settle_and_report(&self, client: &ResiClient, encoder_id: &str) -> Result<()> {
        sleep(Duration::from_secs(SETTLE_SECS)).await;
        let record = client.status_snapshot(true).await?.remove(encoder_id);
        output::print_status(encoder_id, record.as_ref(), self.output)
    }

    pub async fn watch(&self, encoder_id: &str, interval_secs: u64) -> Result<()> {
        let client = self.client()?;
        let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        println!("Watching {encoder_id} every {interval_secs}s (Ctrl-C to stop)");
        let mut last_line: Option<String> = None;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("watch interrupted");
                    break;
                }
                _ = ticker.tick() => {
                    // A failed poll is a degraded tick, not the end of the
                    // watch; the next tick retries.
                    match client.status_for(encoder_id).await {
                        Ok(record) => {
                            let line = output::feedback_line(encoder_id, record.as_ref());
                            if last_line.as_deref() != Some(line.as_str()) {
                                println!("{line}");
                                last_line = Some(line);
                            }
                        }
                        Err(e) => warn!(error = %e, "status poll failed"),
                    }
                }
            }
        }
        Ok(())
    }

    pub fn show_config(&self) -> Result<()> {
        println!("{}", self.config.show());
        Ok(())
    }
}
