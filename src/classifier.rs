// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Internal/external exposure classification per cloud provider.

use crate::constants::annotations;
use crate::error::SvcWatchError;
use crate::types::{ExposedService, ServiceType};
use std::fmt;
use std::str::FromStr;

/// Cloud provider whose load balancer annotations are honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Aws,
    Gcp,
    Azure,
}

impl Provider {
    /// The annotation convention this provider uses for internal load balancers
    pub fn policy(self) -> ProviderPolicy {
        match self {
            Provider::Aws => ProviderPolicy {
                marker_key: annotations::AWS_INTERNAL,
                internal_value: annotations::AWS_INTERNAL_VALUE,
            },
            Provider::Gcp => ProviderPolicy {
                marker_key: annotations::GCP_INTERNAL,
                internal_value: annotations::GCP_INTERNAL_VALUE,
            },
            Provider::Azure => ProviderPolicy {
                marker_key: annotations::AZURE_INTERNAL,
                internal_value: annotations::AZURE_INTERNAL_VALUE,
            },
        }
    }
}

impl FromStr for Provider {
    type Err = SvcWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(Provider::Aws),
            "gcp" => Ok(Provider::Gcp),
            "azure" => Ok(Provider::Azure),
            other => Err(SvcWatchError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcp",
            Provider::Azure => "azure",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub marker_key: &'static str,
    pub internal_value: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    Internal,
    External,
}

impl Exposure {
    pub fn is_internal(self) -> bool {
        self == Exposure::Internal
    }
}

/// Only LoadBalancer Services can be reached from outside; those are internal
/// when they carry the provider's marker annotation with the expected value.
pub fn classify(service: &ExposedService, policy: &ProviderPolicy) -> Exposure {
    if service.service_type != ServiceType::LoadBalancer {
        return Exposure::Internal;
    }

    if service.annotation(policy.marker_key) == Some(policy.internal_value) {
        Exposure::Internal
    } else {
        Exposure::External
    }
}
