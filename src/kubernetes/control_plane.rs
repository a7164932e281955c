// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! List, watch, and conditional delete of Services against the API server.

use crate::constants::watch::TIMEOUT_SECS;
use crate::error::{Result, SvcWatchError};
use crate::types::{ChangeAction, ExposedService, ServiceKey};
use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::api::{DeleteParams, ListParams, Preconditions, WatchEvent as KubeWatchEvent, WatchParams};
use kube::{Api, Client};
use std::future::Future;
use tracing::{debug, instrument, warn};

/// Full listing of the collection plus the version to resume watching from
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub items: Vec<ExposedService>,
    pub resource_version: String,
}

#[derive(Debug, Clone)]
pub enum WatchEvent {
    Changed(ChangeAction, ExposedService),
    /// Progress marker carrying a newer collection version, no object change
    Bookmark(String),
}

/// Result of a delete guarded by a UID precondition
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    /// The Service under this name has a different UID (it was recreated)
    PreconditionFailed,
    /// The Service no longer exists
    NotFound,
    /// Connectivity or server error; the delete may be retried
    Transient(SvcWatchError),
}

/// The operations svc-watch needs from the control plane
pub trait ControlPlane: Clone + Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Listing>> + Send;

    fn watch(
        &self,
        from_version: &str,
    ) -> impl Future<Output = Result<BoxStream<'static, Result<WatchEvent>>>> + Send;

    fn delete(&self, key: &ServiceKey, uid: &str) -> impl Future<Output = DeleteOutcome> + Send;
}

/// [`ControlPlane`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeControlPlane {
    client: Client,
}

impl KubeControlPlane {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ControlPlane for KubeControlPlane {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Listing> {
        let services: Api<Service> = Api::all(self.client.clone());
        let list = services.list(&ListParams::default()).await?;

        let items = list
            .items
            .iter()
            .filter_map(|svc| match ExposedService::try_from(svc) {
                Ok(exposed) => Some(exposed),
                Err(e) => {
                    warn!("Skipping service from list: {}", e);
                    None
                }
            })
            .collect::<Vec<_>>();

        let resource_version = list.metadata.resource_version.unwrap_or_default();
        debug!(
            "Listed {} services at resourceVersion {}",
            items.len(),
            resource_version
        );

        Ok(Listing {
            items,
            resource_version,
        })
    }

    async fn watch(&self, from_version: &str) -> Result<BoxStream<'static, Result<WatchEvent>>> {
        let services: Api<Service> = Api::all(self.client.clone());
        let params = WatchParams::default().timeout(TIMEOUT_SECS);
        let stream = services.watch(&params, from_version).await?;

        Ok(stream
            .filter_map(|event| async move {
                match event {
                    Ok(event) => convert_watch_event(event),
                    Err(e) => Some(Err(SvcWatchError::from(e))),
                }
            })
            .boxed())
    }

    #[instrument(skip(self, key, uid), fields(service = %key))]
    async fn delete(&self, key: &ServiceKey, uid: &str) -> DeleteOutcome {
        let services: Api<Service> = Api::namespaced(self.client.clone(), &key.namespace);
        let params = DeleteParams {
            preconditions: Some(Preconditions {
                uid: Some(uid.to_string()),
                resource_version: None,
            }),
            ..Default::default()
        };

        match services.delete(&key.name, &params).await {
            Ok(_) => DeleteOutcome::Deleted,
            Err(kube::Error::Api(err)) if err.code == 409 => DeleteOutcome::PreconditionFailed,
            Err(kube::Error::Api(err)) if err.code == 404 => DeleteOutcome::NotFound,
            Err(e) => DeleteOutcome::Transient(e.into()),
        }
    }
}

/// Map a raw watch event; objects that fail conversion are skipped.
fn convert_watch_event(event: KubeWatchEvent<Service>) -> Option<Result<WatchEvent>> {
    let (action, svc) = match event {
        KubeWatchEvent::Added(svc) => (ChangeAction::Added, svc),
        KubeWatchEvent::Modified(svc) => (ChangeAction::Updated, svc),
        KubeWatchEvent::Deleted(svc) => (ChangeAction::Deleted, svc),
        KubeWatchEvent::Bookmark(bookmark) => {
            return Some(Ok(WatchEvent::Bookmark(bookmark.metadata.resource_version)))
        }
        KubeWatchEvent::Error(err) if err.code == 410 => {
            return Some(Err(SvcWatchError::WatchExpired))
        }
        KubeWatchEvent::Error(err) => {
            return Some(Err(SvcWatchError::WatchError(format!(
                "{} ({})",
                err.message, err.code
            ))))
        }
    };

    match ExposedService::try_from(&svc) {
        Ok(exposed) => Some(Ok(WatchEvent::Changed(action, exposed))),
        Err(e) => {
            warn!("Skipping watch event: {}", e);
            None
        }
    }
}
