// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and the control plane operations svc-watch uses.

pub mod client;
pub mod control_plane;

pub use client::create_client;
pub use control_plane::{ControlPlane, DeleteOutcome, KubeControlPlane, Listing, WatchEvent};
