// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-scrape snapshot of Service exposure as Prometheus gauges.

use crate::classifier::{classify, ProviderPolicy};
use crate::constants::metrics::{SERVICE_INFO, SERVICE_INFO_HELP};
use crate::mirror::MirrorStore;
use metrics::{describe_gauge, gauge, with_local_recorder};
use metrics_exporter_prometheus::PrometheusBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSample {
    pub namespace: String,
    pub name: String,
    pub service_type: &'static str,
    pub internal: bool,
}

/// Builds the metric set from the mirror on every scrape; nothing is kept
/// between scrapes.
#[derive(Clone)]
pub struct ServiceCollector {
    store: MirrorStore,
    policy: ProviderPolicy,
}

impl ServiceCollector {
    pub fn new(store: MirrorStore, policy: ProviderPolicy) -> Self {
        Self { store, policy }
    }

    pub fn collect(&self) -> Vec<ServiceSample> {
        let mut samples: Vec<ServiceSample> = self
            .store
            .list()
            .into_iter()
            .map(|svc| ServiceSample {
                internal: classify(&svc, &self.policy).is_internal(),
                service_type: svc.service_type.as_str(),
                namespace: svc.key.namespace,
                name: svc.key.name,
            })
            .collect();
        samples.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        samples
    }

    /// Render the current snapshot in the Prometheus text format
    pub fn render(&self) -> String {
        let samples = self.collect();
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_gauge!(SERVICE_INFO, SERVICE_INFO_HELP);
            for sample in samples {
                gauge!(
                    SERVICE_INFO,
                    "kubernetes_namespace" => sample.namespace,
                    "kubernetes_name" => sample.name,
                    "type" => sample.service_type,
                    "internal" => sample.internal.to_string()
                )
                .set(1.0);
            }
        });

        handle.render()
    }
}
