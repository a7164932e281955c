// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::service::{ExposedService, ServiceKey};

/// What happened to a Service in the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Added,
    Updated,
    Deleted,
}

/// A change observed by the mirror, with the Service as it was at that moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub action: ChangeAction,
    pub service: ExposedService,
}

impl Change {
    pub fn new(action: ChangeAction, service: ExposedService) -> Self {
        Self { action, service }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.service.key
    }
}
