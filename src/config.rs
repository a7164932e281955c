// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::classifier::Provider;
use crate::constants::slack::API_URL;
use anyhow::Result;
use clap::{ArgAction, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;
use url::Url;

/// Command line flags, each with an environment variable fallback
#[derive(Parser, Debug)]
#[command(
    name = "svc-watch",
    version,
    about = "Reports Service exposure as metrics and optionally deletes public Services"
)]
pub struct Args {
    /// Cloud provider whose internal load balancer annotation is honoured (aws, gcp or azure)
    #[arg(long, env = "PROVIDER", default_value = "aws", value_parser = Provider::from_str)]
    pub provider: Provider,

    /// Delete public Services as soon as they are seen
    #[arg(long, env = "TERMINATE", action = ArgAction::SetTrue)]
    pub terminate: bool,

    /// Address to serve /metrics on, as `host:port` or `:port` for all interfaces
    #[arg(long, env = "LISTEN_ADDRESS", default_value = ":8080", value_parser = parse_listen_address)]
    pub listen_address: SocketAddr,

    /// Colon-separated kubeconfig files, merged in order; in-cluster
    /// configuration is used when absent
    #[arg(long, env = "KUBECONFIG", value_delimiter = ':')]
    pub kubeconfig: Vec<PathBuf>,

    /// Slack API token used to announce deletions
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// Slack channel to announce deletions in
    #[arg(long, env = "SLACK_CHANNEL")]
    pub slack_channel: Option<String>,

    #[arg(long, env = "SLACK_API_URL", default_value = API_URL)]
    pub slack_api_url: Url,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
    pub api_url: Url,
}

/// Immutable operator configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub terminate: bool,
    pub listen_address: SocketAddr,
    /// Empty means in-cluster configuration
    pub kubeconfig: Vec<PathBuf>,
    /// `None` disables deletion notifications
    pub slack: Option<SlackConfig>,
}

impl Config {
    /// Parse the process arguments and environment
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let token = args.slack_token.filter(|t| !t.is_empty());
        let channel = args.slack_channel.filter(|c| !c.is_empty());

        let slack = match (token, channel) {
            (Some(token), Some(channel)) => Some(SlackConfig {
                token,
                channel,
                api_url: args.slack_api_url,
            }),
            (Some(_), None) => {
                warn!("SLACK_TOKEN is set but SLACK_CHANNEL is not, notifications disabled");
                None
            }
            _ => None,
        };

        Ok(Config {
            provider: args.provider,
            terminate: args.terminate,
            listen_address: args.listen_address,
            kubeconfig: args
                .kubeconfig
                .into_iter()
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            slack,
        })
    }
}

/// Accept a bare `:port` as listening on all interfaces
fn parse_listen_address(value: &str) -> std::result::Result<SocketAddr, String> {
    let value = if value.starts_with(':') {
        format!("0.0.0.0{}", value)
    } else {
        value.to_string()
    };
    value
        .parse()
        .map_err(|e| format!("invalid listen address '{}': {}", value, e))
}
