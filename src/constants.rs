// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Provider annotations that mark a LoadBalancer Service as internal
pub mod annotations {
    pub const AWS_INTERNAL: &str = "service.beta.kubernetes.io/aws-load-balancer-internal";
    pub const AWS_INTERNAL_VALUE: &str = "0.0.0.0/0";

    pub const GCP_INTERNAL: &str = "cloud.google.com/load-balancer-type";
    pub const GCP_INTERNAL_VALUE: &str = "internal";

    pub const AZURE_INTERNAL: &str = "service.beta.kubernetes.io/azure-load-balancer-internal";
    pub const AZURE_INTERNAL_VALUE: &str = "true";
}

/// The operator name used in logs and notifications
pub const OPERATOR_NAME: &str = "svc-watch";

/// Exposed Prometheus metrics
pub mod metrics {
    pub const SERVICE_INFO: &str = "kube_service_info";
    pub const SERVICE_INFO_HELP: &str = "Information about cluster services.";

    pub const METRICS_PATH: &str = "/metrics";
    pub const HEALTH_PATH: &str = "/healthz";
    pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";
}

/// List/watch reconnect configuration
pub mod watch {
    /// Server-side watch timeout, kept below the client read timeout
    pub const TIMEOUT_SECS: u32 = 290;
    /// Initial reconnect delay in milliseconds after a failed list or watch
    pub const INITIAL_BACKOFF_MS: u64 = 500;
    /// Maximum reconnect delay in milliseconds (exponential backoff cap)
    pub const MAX_BACKOFF_MS: u64 = 30_000;
    /// A watch open at least this long counts as healthy and resets the backoff
    pub const MIN_HEALTHY_WATCH_SECS: u64 = 5;
}

/// Termination worker configuration
pub mod terminator {
    /// Delay before a Service is retried after a transient delete failure
    pub const RETRY_DELAY_SECS: u64 = 5;
}

pub mod slack {
    pub const API_URL: &str = "https://slack.com/api/chat.postMessage";
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
}
