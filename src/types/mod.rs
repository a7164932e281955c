// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the mirror, queue, and worker.

pub mod change;
pub mod service;

pub use change::{Change, ChangeAction};
pub use service::{ExposedService, ServiceKey, ServiceType};
