// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use svc_watch::collector::ServiceCollector;
use svc_watch::config::Config;
use svc_watch::kubernetes::{create_client, KubeControlPlane};
use svc_watch::mirror::{MirrorStore, Reflector};
use svc_watch::notify::SlackNotifier;
use svc_watch::queue::ChangeQueue;
use svc_watch::server::MetricsServer;
use svc_watch::terminator::Terminator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting svc-watch");

    // Load configuration; an unknown provider aborts here
    let config = Config::load()?;
    info!(
        "Configuration loaded: provider={}, terminate={}, notifications={}",
        config.provider,
        config.terminate,
        config.slack.is_some()
    );

    // Create Kubernetes client
    let client = create_client(&config).await?;
    let control_plane = KubeControlPlane::new(client);
    info!("Connected to Kubernetes cluster");

    let policy = config.provider.policy();
    let store = MirrorStore::new();
    let mut reflector = Reflector::new(control_plane.clone(), store.clone());

    let terminator = if config.terminate {
        let queue = ChangeQueue::new(store.clone());
        reflector = reflector.with_queue(queue.clone());
        let notifier = config.slack.as_ref().map(SlackNotifier::new).transpose()?;
        Some(Terminator::new(control_plane, queue, policy, notifier))
    } else {
        None
    };

    let server = MetricsServer::new(config.listen_address, ServiceCollector::new(store, policy));

    // Run the reflector, metrics endpoint and, in termination mode, the worker
    tokio::try_join!(reflector.run(), server.run(), async {
        match terminator {
            Some(terminator) => terminator.run().await,
            None => std::future::pending().await,
        }
    })?;

    // This should never be reached as all loops run forever
    warn!("All tasks stopped unexpectedly");
    Ok(())
}
