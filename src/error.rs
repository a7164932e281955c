// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvcWatchError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Unknown provider: {0} (expected one of aws, gcp, azure)")]
    UnknownProvider(String),

    #[error("Invalid service: {0}")]
    InvalidService(String),

    #[error("Watch resource version expired")]
    WatchExpired,

    #[error("Watch failed: {0}")]
    WatchError(String),

    #[error("Notification failed: {0}")]
    NotifyError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SvcWatchError>;
