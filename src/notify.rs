// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Notifications about deleted Services.

use crate::config::SlackConfig;
use crate::constants::{slack::REQUEST_TIMEOUT_SECS, OPERATOR_NAME};
use crate::error::{Result, SvcWatchError};
use crate::types::ServiceKey;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub trait Notifier: Send + Sync + 'static {
    /// Announce that the Service `key` was deleted
    fn notify(&self, key: &ServiceKey) -> impl Future<Output = Result<()>> + Send;
}

/// No configured notifier means notifications are silently skipped.
impl<N: Notifier> Notifier for Option<N> {
    async fn notify(&self, key: &ServiceKey) -> Result<()> {
        match self {
            Some(notifier) => notifier.notify(key).await,
            None => {
                debug!("No notifier configured, not announcing deletion of {}", key);
                Ok(())
            }
        }
    }
}

pub fn deletion_message(key: &ServiceKey) -> String {
    format!(
        "{} deleted public Service {}/{}",
        OPERATOR_NAME, key.namespace, key.name
    )
}

/// Posts to a Slack channel through `chat.postMessage`
pub struct SlackNotifier {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
    channel: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl SlackNotifier {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_url.clone(),
            token: config.token.clone(),
            channel: config.channel.clone(),
        })
    }
}

impl Notifier for SlackNotifier {
    #[instrument(skip(self, key), fields(service = %key, channel = %self.channel))]
    async fn notify(&self, key: &ServiceKey) -> Result<()> {
        let text = deletion_message(key);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel: &self.channel,
                text: &text,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(SvcWatchError::NotifyError(format!(
                "Slack rejected message to {}: {}",
                self.channel,
                body.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        info!(
            "Sent notification to slack {} ({}) at {}",
            self.channel,
            body.channel.unwrap_or_default(),
            body.ts.unwrap_or_default()
        );
        Ok(())
    }
}
