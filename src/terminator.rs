// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Termination worker: deletes public Services taken from the change queue.
//!
//! Deletes carry a UID precondition so a Service that was deleted and
//! recreated under the same name is never hit by a stale decision. The
//! precondition cannot cover annotations though: a Service edited to become
//! internal between classification and the delete request may still be
//! deleted.

use crate::classifier::{classify, Exposure, ProviderPolicy};
use crate::constants::terminator::RETRY_DELAY_SECS;
use crate::kubernetes::{ControlPlane, DeleteOutcome};
use crate::notify::Notifier;
use crate::queue::ChangeQueue;
use crate::types::{Change, ChangeAction, ServiceKey};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// What the worker did with a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Deletion events need no action
    Ignored,
    Internal,
    Deleted,
    /// The Service is gone or was recreated with a different UID
    Stale,
    /// Transient delete failure, retried later
    Requeued,
}

pub struct Terminator<C: ControlPlane, N: Notifier> {
    control_plane: C,
    queue: ChangeQueue,
    policy: ProviderPolicy,
    notifier: N,
    retry_delay: Duration,
}

impl<C: ControlPlane, N: Notifier> Terminator<C, N> {
    pub fn new(control_plane: C, queue: ChangeQueue, policy: ProviderPolicy, notifier: N) -> Self {
        Self {
            control_plane,
            queue,
            policy,
            notifier,
            retry_delay: Duration::from_secs(RETRY_DELAY_SECS),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Single consumer loop over the change queue; runs until the process exits.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Termination mode engaged");

        loop {
            let change = self.queue.pop().await;
            let disposition = self.process(change).await;
            debug!("Processed change: {:?}", disposition);
        }
    }

    #[instrument(skip(self, change), fields(service = %change.key()))]
    pub async fn process(&self, change: Change) -> Disposition {
        if change.action == ChangeAction::Deleted {
            return Disposition::Ignored;
        }

        let service = change.service;
        if classify(&service, &self.policy) == Exposure::Internal {
            debug!("Service is internal, nothing to do");
            return Disposition::Internal;
        }

        match self.control_plane.delete(&service.key, &service.uid).await {
            DeleteOutcome::Deleted => {
                info!("Deleted external service {}", service.key);
                if let Err(e) = self.notifier.notify(&service.key).await {
                    error!("Failed to send notification for {}: {}", service.key, e);
                }
                Disposition::Deleted
            }
            DeleteOutcome::PreconditionFailed => {
                info!(
                    "Service {} was recreated since it was observed (uid {}), not deleting",
                    service.key, service.uid
                );
                Disposition::Stale
            }
            DeleteOutcome::NotFound => {
                debug!("Service {} is already gone", service.key);
                Disposition::Stale
            }
            DeleteOutcome::Transient(e) => {
                warn!(
                    "Error deleting {}: {}, retrying in {:?}",
                    service.key, e, self.retry_delay
                );
                self.schedule_retry(service.key);
                Disposition::Requeued
            }
        }
    }

    fn schedule_retry(&self, key: ServiceKey) {
        if self.retry_delay.is_zero() {
            self.queue.requeue(&key);
            return;
        }

        let queue = self.queue.clone();
        let delay = self.retry_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.requeue(&key);
        });
    }
}
