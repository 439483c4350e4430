//! JSON payload sinks

use super::traits::PayloadSink;
use crate::onboarding::OnboardingPayload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

fn to_json(payload: &OnboardingPayload, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    Ok(json)
}

/// Writes the payload to a JSON file, creating parent directories
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl PayloadSink for JsonFileSink {
    async fn deliver(&mut self, payload: &OnboardingPayload) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = to_json(payload, self.pretty)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write payload to {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "payload written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Prints the payload to stdout
#[derive(Debug, Clone, Default)]
pub struct StdoutSink {
    pretty: bool,
}

impl StdoutSink {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

#[async_trait]
impl PayloadSink for StdoutSink {
    async fn deliver(&mut self, payload: &OnboardingPayload) -> Result<()> {
        let mut json = to_json(payload, self.pretty)?;
        json.push('\n');
        let mut stdout = tokio::io::stdout();
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}
