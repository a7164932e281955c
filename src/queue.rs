// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Coalescing change queue between the reflector and the termination worker.

use crate::mirror::MirrorStore;
use crate::types::{Change, ChangeAction, ServiceKey};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::trace;

/// FIFO of Service keys holding at most one pending change per key.
///
/// A push for a key that is already queued replaces its payload but keeps
/// its place in line, so the consumer always sees the latest known state.
/// Meant for a single consumer.
#[derive(Clone)]
pub struct ChangeQueue {
    inner: Arc<Inner>,
    store: MirrorStore,
}

struct Inner {
    pending: Mutex<Pending>,
    available: Notify,
}

#[derive(Default)]
struct Pending {
    order: VecDeque<ServiceKey>,
    entries: HashMap<ServiceKey, Change>,
}

impl ChangeQueue {
    /// `store` is consulted on requeue so retries act on the current state.
    pub fn new(store: MirrorStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: Mutex::new(Pending::default()),
                available: Notify::new(),
            }),
            store,
        }
    }

    pub fn push(&self, change: Change) {
        {
            let mut pending = self.lock();
            let key = change.key().clone();
            if pending.entries.insert(key.clone(), change).is_some() {
                trace!("Coalesced pending change for {}", key);
            } else {
                pending.order.push_back(key);
            }
        }
        self.inner.available.notify_one();
    }

    /// Wait for the next change and remove it from the queue.
    pub async fn pop(&self) -> Change {
        loop {
            if let Some(change) = self.try_pop() {
                return change;
            }
            self.inner.available.notified().await;
        }
    }

    pub fn try_pop(&self) -> Option<Change> {
        let mut pending = self.lock();
        while let Some(key) = pending.order.pop_front() {
            if let Some(change) = pending.entries.remove(&key) {
                return Some(change);
            }
        }
        None
    }

    /// Queue the mirror's current state of `key` again. No-op when the key is
    /// already pending or no longer mirrored.
    ///
    /// The mirror is read while the queue lock is held, so a newer change
    /// pushed by the reflector either lands after this one and replaces it or
    /// is already what the mirror returns.
    pub fn requeue(&self, key: &ServiceKey) -> bool {
        {
            let mut pending = self.lock();
            if pending.entries.contains_key(key) {
                return false;
            }
            match self.store.get(key) {
                Some(service) => {
                    pending.entries.insert(
                        key.clone(),
                        Change::new(ChangeAction::Updated, service),
                    );
                    pending.order.push_back(key.clone());
                }
                None => {
                    trace!("Not requeueing {}, no longer mirrored", key);
                    return false;
                }
            }
        }
        self.inner.available.notify_one();
        true
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
