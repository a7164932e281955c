// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP endpoint serving the metrics snapshot.

use crate::collector::ServiceCollector;
use crate::constants::metrics::{CONTENT_TYPE, HEALTH_PATH, METRICS_PATH};
use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub struct MetricsServer {
    address: SocketAddr,
    collector: ServiceCollector,
}

impl MetricsServer {
    pub fn new(address: SocketAddr, collector: ServiceCollector) -> Self {
        Self { address, collector }
    }

    /// Accept connections until the process exits. Failing to bind is fatal.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.address).await?;
        info!("Serving on {}", self.address);

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let collector = self.collector.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let collector = collector.clone();
                    async move { Ok::<_, Infallible>(route(&collector, req.method(), req.uri().path())) }
                });

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!("Connection from {} closed with error: {}", peer, e);
                }
            });
        }
    }
}

/// Dispatch a request to the metrics snapshot or health check
pub fn route(collector: &ServiceCollector, method: &Method, path: &str) -> Response<Full<Bytes>> {
    if *method != Method::GET {
        return plain(StatusCode::METHOD_NOT_ALLOWED, "method not allowed\n");
    }

    match path {
        METRICS_PATH => {
            let body = collector.render();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, CONTENT_TYPE)
                .body(Full::new(Bytes::from(body)))
                .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "render failed\n"))
        }
        HEALTH_PATH => plain(StatusCode::OK, "ok\n"),
        _ => plain(StatusCode::NOT_FOUND, "not found\n"),
    }
}

fn plain(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain"),
    );
    response
}
