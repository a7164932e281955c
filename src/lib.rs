// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod classifier;
pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod mirror;
pub mod notify;
pub mod queue;
pub mod server;
pub mod terminator;
pub mod types;

#[cfg(test)]
pub mod test_utils;
