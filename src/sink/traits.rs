//! Trait abstraction for payload delivery to enable mocking in tests

use crate::onboarding::OnboardingPayload;
use anyhow::Result;
use async_trait::async_trait;

/// Receiver of a submitted onboarding payload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayloadSink: Send + Sync {
    /// Hand over the payload. Called once per submitted session.
    async fn deliver(&mut self, payload: &OnboardingPayload) -> Result<()>;

    /// Where the payload went, for log output
    fn describe(&self) -> String;
}
