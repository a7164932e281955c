// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! List-then-watch loop keeping the [`MirrorStore`] in sync with the API server.

use crate::constants::watch::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MIN_HEALTHY_WATCH_SECS};
use crate::error::Result;
use crate::kubernetes::{ControlPlane, WatchEvent};
use crate::mirror::MirrorStore;
use crate::queue::ChangeQueue;
use crate::types::Change;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn};

/// Reflects the remote Service collection into a local store and forwards
/// every applied change to the change queue, if one is attached.
pub struct Reflector<C: ControlPlane> {
    control_plane: C,
    store: MirrorStore,
    queue: Option<ChangeQueue>,
    initial_backoff: Duration,
    max_backoff: Duration,
    min_healthy_watch: Duration,
}

impl<C: ControlPlane> Reflector<C> {
    pub fn new(control_plane: C, store: MirrorStore) -> Self {
        Self {
            control_plane,
            store,
            queue: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
            min_healthy_watch: Duration::from_secs(MIN_HEALTHY_WATCH_SECS),
        }
    }

    pub fn with_queue(mut self, queue: ChangeQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// How long a watch must stay open before the backoff is reset
    pub fn with_min_healthy_watch(mut self, min_healthy_watch: Duration) -> Self {
        self.min_healthy_watch = min_healthy_watch;
        self
    }

    /// Runs until the process exits. List and watch failures are logged and
    /// retried with exponential backoff. A watch that ends cleanly after being
    /// open for a while is re-listed right away; one that closes quickly is
    /// backed off like a failure.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Starting service reflector");
        let mut backoff = self.initial_backoff;

        loop {
            let mut opened = None;
            let result = self.list_and_watch(&mut opened).await;
            let open_for = opened.map(|at: Instant| at.elapsed()).unwrap_or_default();
            let healthy = open_for >= self.min_healthy_watch;
            if healthy {
                backoff = self.initial_backoff;
            }

            match result {
                Ok(()) if healthy => {
                    debug!("Watch stream ended, re-listing services");
                    continue;
                }
                Ok(()) => {
                    warn!(
                        "Watch stream closed after {:?}, re-listing in {:?}...",
                        open_for, backoff
                    );
                }
                Err(e) => {
                    warn!(
                        "Service watch failed: {}, re-listing in {:?}...",
                        e, backoff
                    );
                }
            }

            sleep(backoff).await;
            backoff = (backoff * 2).min(self.max_backoff);
        }
    }

    /// One list followed by a watch from the listed version, until the watch
    /// ends or fails. `opened` records when the watch was established.
    async fn list_and_watch(&self, opened: &mut Option<Instant>) -> Result<()> {
        let listing = self.control_plane.list().await?;

        let changes = self.store.replace(listing.items);
        info!(
            "Listed services: {} mirrored, {} changed, resourceVersion {}",
            self.store.len(),
            changes.len(),
            listing.resource_version
        );
        for change in changes {
            self.forward(change);
        }

        let mut events = self.control_plane.watch(&listing.resource_version).await?;
        *opened = Some(Instant::now());
        while let Some(event) = events.next().await {
            match event? {
                WatchEvent::Changed(action, service) => {
                    trace!("Watch event {:?} for {}", action, service.key);
                    if let Some(change) = self.store.apply(action, service) {
                        self.forward(change);
                    }
                }
                WatchEvent::Bookmark(version) => {
                    trace!("Watch bookmark at resourceVersion {}", version);
                }
            }
        }

        Ok(())
    }

    fn forward(&self, change: Change) {
        if let Some(queue) = &self.queue {
            queue.push(change);
        }
    }
}
