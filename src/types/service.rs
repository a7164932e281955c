// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mirrored view of a Kubernetes Service.

use crate::error::{Result, SvcWatchError};
use k8s_openapi::api::core::v1::Service;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Mutable-resource key of a Service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey {
    pub namespace: String,
    pub name: String,
}

impl ServiceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Exposure type of a Service (`spec.type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ClusterIP => "ClusterIP",
            ServiceType::NodePort => "NodePort",
            ServiceType::LoadBalancer => "LoadBalancer",
            ServiceType::ExternalName => "ExternalName",
        }
    }
}

impl FromStr for ServiceType {
    type Err = SvcWatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ClusterIP" => Ok(ServiceType::ClusterIP),
            "NodePort" => Ok(ServiceType::NodePort),
            "LoadBalancer" => Ok(ServiceType::LoadBalancer),
            "ExternalName" => Ok(ServiceType::ExternalName),
            other => Err(SvcWatchError::InvalidService(format!(
                "unknown service type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a Service that svc-watch needs, detached from the API object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedService {
    pub key: ServiceKey,
    pub uid: String,
    pub service_type: ServiceType,
    pub annotations: BTreeMap<String, String>,
    pub resource_version: String,
}

impl ExposedService {
    /// Whether this observation supersedes `other` for the same key.
    ///
    /// Resource versions are compared numerically. When either side is not a
    /// number, any different version counts as newer.
    pub fn is_newer_than(&self, other: &ExposedService) -> bool {
        match (
            self.resource_version.parse::<u64>(),
            other.resource_version.parse::<u64>(),
        ) {
            (Ok(ours), Ok(theirs)) => ours > theirs,
            _ => self.resource_version != other.resource_version,
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(|v| v.as_str())
    }
}

impl TryFrom<&Service> for ExposedService {
    type Error = SvcWatchError;

    fn try_from(svc: &Service) -> Result<Self> {
        let meta = &svc.metadata;
        let name = meta
            .name
            .clone()
            .ok_or_else(|| SvcWatchError::InvalidService("missing metadata.name".to_string()))?;
        let namespace = meta.namespace.clone().unwrap_or_default();

        let uid = meta.uid.clone().ok_or_else(|| {
            SvcWatchError::InvalidService(format!("{}/{} has no uid", namespace, name))
        })?;
        let resource_version = meta.resource_version.clone().ok_or_else(|| {
            SvcWatchError::InvalidService(format!("{}/{} has no resourceVersion", namespace, name))
        })?;

        // An absent type means ClusterIP
        let service_type = match svc.spec.as_ref().and_then(|s| s.type_.as_deref()) {
            Some(t) => t.parse()?,
            None => ServiceType::ClusterIP,
        };

        Ok(ExposedService {
            key: ServiceKey { namespace, name },
            uid,
            service_type,
            annotations: meta.annotations.clone().unwrap_or_default(),
            resource_version,
        })
    }
}
