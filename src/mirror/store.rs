// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory store of the latest known state of every Service.

use crate::types::{Change, ChangeAction, ExposedService, ServiceKey};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to the mirrored Services.
///
/// The reflector is the only writer. Readers get owned copies, never
/// references into the map.
#[derive(Clone, Default)]
pub struct MirrorStore {
    services: Arc<RwLock<HashMap<ServiceKey, ExposedService>>>,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of all stored Services
    pub fn list(&self) -> Vec<ExposedService> {
        self.read().values().cloned().collect()
    }

    pub fn get(&self, key: &ServiceKey) -> Option<ExposedService> {
        self.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Apply a single watch event. Returns the change when the store was
    /// modified; events not newer than the stored value are dropped.
    pub fn apply(&self, action: ChangeAction, service: ExposedService) -> Option<Change> {
        let mut services = self.write();

        match action {
            ChangeAction::Added | ChangeAction::Updated => {
                let action = match services.get(&service.key) {
                    Some(existing) if !service.is_newer_than(existing) => return None,
                    Some(_) => ChangeAction::Updated,
                    None => ChangeAction::Added,
                };
                services.insert(service.key.clone(), service.clone());
                Some(Change::new(action, service))
            }
            ChangeAction::Deleted => match services.get(&service.key) {
                Some(existing) if service.is_newer_than(existing) => {
                    services.remove(&service.key);
                    Some(Change::new(ChangeAction::Deleted, service))
                }
                _ => None,
            },
        }
    }

    /// Reconcile the store with a full listing. Services missing from the
    /// listing are removed and reported as deleted.
    pub fn replace(&self, listing: Vec<ExposedService>) -> Vec<Change> {
        let mut services = self.write();
        let mut changes = Vec::new();
        let mut seen = HashSet::with_capacity(listing.len());

        for service in listing {
            seen.insert(service.key.clone());
            let action = match services.get(&service.key) {
                Some(existing) if !service.is_newer_than(existing) => continue,
                Some(_) => ChangeAction::Updated,
                None => ChangeAction::Added,
            };
            services.insert(service.key.clone(), service.clone());
            changes.push(Change::new(action, service));
        }

        let vanished: Vec<ServiceKey> = services
            .keys()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
        for key in vanished {
            if let Some(service) = services.remove(&key) {
                changes.push(Change::new(ChangeAction::Deleted, service));
            }
        }

        changes
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ServiceKey, ExposedService>> {
        self.services.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ServiceKey, ExposedService>> {
        self.services.write().unwrap_or_else(PoisonError::into_inner)
    }
}
