// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation from in-cluster or kubeconfig configuration

use crate::config::Config;
use crate::error::{Result, SvcWatchError};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Create the control plane client, from the configured kubeconfig files or
/// the pod's service account when none are given.
#[instrument(skip(config))]
pub async fn create_client(config: &Config) -> Result<Client> {
    let client_config = if config.kubeconfig.is_empty() {
        info!("No kubeconfig given, using in-cluster configuration");
        KConfig::incluster().map_err(|e| {
            SvcWatchError::KubeconfigError(format!("Failed to load in-cluster config: {}", e))
        })?
    } else {
        config_from_kubeconfig(kubeconfig_from_files(&config.kubeconfig).await?).await?
    };

    Client::try_from(client_config)
        .map_err(|e| SvcWatchError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Read and merge kubeconfig files; earlier files take precedence
async fn kubeconfig_from_files(paths: &[PathBuf]) -> Result<Kubeconfig> {
    let mut merged: Option<Kubeconfig> = None;

    for path in paths {
        info!("Loading kubeconfig from {}", path.display());
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            SvcWatchError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let next = parse_kubeconfig(&contents)?;

        merged = Some(match merged {
            Some(current) => current.merge(next).map_err(|e| {
                SvcWatchError::KubeconfigError(format!("Failed to merge {}: {}", path.display(), e))
            })?,
            None => next,
        });
    }

    merged.ok_or_else(|| SvcWatchError::KubeconfigError("No kubeconfig files given".to_string()))
}

fn parse_kubeconfig(kubeconfig: &str) -> Result<Kubeconfig> {
    serde_yaml::from_str(kubeconfig)
        .map_err(|e| SvcWatchError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))
}

/// Build a client configuration from a parsed kubeconfig
async fn config_from_kubeconfig(kubeconfig: Kubeconfig) -> Result<KConfig> {
    KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| SvcWatchError::KubeconfigError(format!("Failed to create config: {}", e)))
}
