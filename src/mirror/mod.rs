// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local mirror of the cluster's Services.

pub mod reflector;
pub mod store;

pub use reflector::Reflector;
pub use store::MirrorStore;
