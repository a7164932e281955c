// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked API server for `kube::Client`, a scripted
//! control plane, and a recording notifier.

use crate::error::{Result, SvcWatchError};
use crate::kubernetes::{ControlPlane, DeleteOutcome, Listing, WatchEvent};
use crate::notify::Notifier;
use crate::types::{ChangeAction, ExposedService, ServiceKey, ServiceType};
use futures::channel::mpsc;
use futures::stream::BoxStream;
use futures::StreamExt;
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a Service JSON document as returned by the API server
pub fn service_json(namespace: &str, name: &str, uid: &str, resource_version: &str, type_: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": uid,
            "resourceVersion": resource_version
        },
        "spec": {
            "type": type_
        }
    })
    .to_string()
}

/// Create a failure Status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

pub fn make_service(
    namespace: &str,
    name: &str,
    uid: &str,
    resource_version: &str,
    service_type: ServiceType,
) -> ExposedService {
    ExposedService {
        key: ServiceKey::new(namespace, name),
        uid: uid.to_string(),
        service_type,
        annotations: BTreeMap::new(),
        resource_version: resource_version.to_string(),
    }
}

/// Poll `condition` for up to two seconds
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

#[derive(Default)]
struct FakeState {
    services: BTreeMap<ServiceKey, ExposedService>,
    list_version: String,
    failing_lists: usize,
    list_calls: usize,
    watch_versions: Vec<String>,
    watch_tx: Option<mpsc::UnboundedSender<Result<WatchEvent>>>,
    closing_watches: bool,
    buffered_events: Vec<Result<WatchEvent>>,
    scripted_deletes: VecDeque<DeleteOutcome>,
    delete_calls: Vec<(ServiceKey, String)>,
}

/// In-memory control plane. Watches stay open until an error is delivered or
/// they are closed; events pushed while no watch is open are delivered to the
/// next one.
#[derive(Clone)]
pub struct FakeControlPlane {
    state: Arc<Mutex<FakeState>>,
}

impl FakeControlPlane {
    pub fn new(list_version: &str, services: Vec<ExposedService>) -> Self {
        let state = FakeState {
            services: services.into_iter().map(|s| (s.key.clone(), s)).collect(),
            list_version: list_version.to_string(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn upsert_service(&self, service: ExposedService, list_version: &str) {
        let mut state = self.state.lock().unwrap();
        state.services.insert(service.key.clone(), service);
        state.list_version = list_version.to_string();
    }

    pub fn remove_service(&self, key: &ServiceKey, list_version: &str) {
        let mut state = self.state.lock().unwrap();
        state.services.remove(key);
        state.list_version = list_version.to_string();
    }

    pub fn service(&self, key: &ServiceKey) -> Option<ExposedService> {
        self.state.lock().unwrap().services.get(key).cloned()
    }

    pub fn push_watch_event(&self, event: Result<WatchEvent>) {
        let mut state = self.state.lock().unwrap();
        push_event(&mut state, event);
    }

    pub fn script_watch(&self, events: Vec<Result<WatchEvent>>) {
        for event in events {
            self.push_watch_event(event);
        }
    }

    /// End the open watch stream without an error
    pub fn close_watch(&self) {
        self.state.lock().unwrap().watch_tx = None;
    }

    /// Make every watch end right after delivering buffered events
    pub fn close_watches_on_open(&self) {
        self.state.lock().unwrap().closing_watches = true;
    }

    /// Make the next `count` list calls fail
    pub fn fail_next_lists(&self, count: usize) {
        self.state.lock().unwrap().failing_lists = count;
    }

    /// Override the outcome of the next delete call
    pub fn script_delete(&self, outcome: DeleteOutcome) {
        self.state.lock().unwrap().scripted_deletes.push_back(outcome);
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn watch_versions(&self) -> Vec<String> {
        self.state.lock().unwrap().watch_versions.clone()
    }

    pub fn delete_calls(&self) -> Vec<(ServiceKey, String)> {
        self.state.lock().unwrap().delete_calls.clone()
    }
}

fn push_event(state: &mut FakeState, event: Result<WatchEvent>) {
    let event = match state.watch_tx.as_ref() {
        Some(tx) => match tx.unbounded_send(event) {
            Ok(()) => return,
            Err(e) => e.into_inner(),
        },
        None => event,
    };
    state.watch_tx = None;
    state.buffered_events.push(event);
}

fn next_version(version: &str) -> String {
    version
        .parse::<u64>()
        .map(|v| (v + 1).to_string())
        .unwrap_or_else(|_| format!("{}-deleted", version))
}

impl ControlPlane for FakeControlPlane {
    async fn list(&self) -> Result<Listing> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.failing_lists > 0 {
            state.failing_lists -= 1;
            return Err(SvcWatchError::WatchError("connection refused".to_string()));
        }

        Ok(Listing {
            items: state.services.values().cloned().collect(),
            resource_version: state.list_version.clone(),
        })
    }

    async fn watch(&self, from_version: &str) -> Result<BoxStream<'static, Result<WatchEvent>>> {
        let mut state = self.state.lock().unwrap();
        state.watch_versions.push(from_version.to_string());

        let (tx, rx) = mpsc::unbounded();
        for event in state.buffered_events.drain(..) {
            let _ = tx.unbounded_send(event);
        }
        if !state.closing_watches {
            state.watch_tx = Some(tx);
        }

        Ok(rx.boxed())
    }

    async fn delete(&self, key: &ServiceKey, uid: &str) -> DeleteOutcome {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push((key.clone(), uid.to_string()));

        if let Some(outcome) = state.scripted_deletes.pop_front() {
            return outcome;
        }

        let existing = match state.services.get(key) {
            None => return DeleteOutcome::NotFound,
            Some(svc) if svc.uid != uid => return DeleteOutcome::PreconditionFailed,
            Some(svc) => svc.clone(),
        };

        state.services.remove(key);
        let mut removed = existing;
        removed.resource_version = next_version(&removed.resource_version);
        state.list_version = removed.resource_version.clone();
        push_event(
            &mut state,
            Ok(WatchEvent::Changed(ChangeAction::Deleted, removed)),
        );

        DeleteOutcome::Deleted
    }
}

/// Notifier that records every announced Service
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notified: Arc<Mutex<Vec<ServiceKey>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every notification fail with `message` (still recorded)
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn notified(&self) -> Vec<ServiceKey> {
        self.notified.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, key: &ServiceKey) -> Result<()> {
        self.notified.lock().unwrap().push(key.clone());
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(SvcWatchError::NotifyError(message)),
            None => Ok(()),
        }
    }
}
