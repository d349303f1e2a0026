use crate::{
    dns::{self, DnsFailureSet},
    http::create_http_pool,
    sink::{LogRecord, LogSink},
    types::{PingerConfig, ProbeOutcome},
};
use reqwest::{Client, StatusCode};
use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Name resolution failed for '{host}': {source}")]
    Dns { host: String, source: io::Error },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProbeError {
    pub fn is_dns(&self) -> bool {
        matches!(self, ProbeError::Dns { .. })
    }
}

pub struct Prober {
    client: Client,
    dns_failures: Arc<DnsFailureSet>,
    sink: Arc<dyn LogSink>,
    timeout: Duration,
}

impl Prober {
    pub fn new(
        config: &PingerConfig,
        dns_failures: Arc<DnsFailureSet>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            client: create_http_pool(config.timeout),
            dns_failures,
            sink,
            timeout: config.timeout,
        }
    }

    pub async fn ping(&self, target: &Url) {
        if self.dns_failures.should_skip(target) {
            tracing::trace!(%target, "skipping target with known-bad DNS");
            return;
        }

        let start = Instant::now();
        let outcome = match self.execute(target).await {
            Ok(status) => ProbeOutcome::Success {
                status,
                latency_ms: start.elapsed().as_millis(),
            },
            Err(error) => {
                if error.is_dns() {
                    self.dns_failures.mark_failed(target);
                }
                ProbeOutcome::Failure { error }
            }
        };

        match &outcome {
            ProbeOutcome::Success { status, .. } => {
                tracing::debug!(%target, status = status.as_u16(), "probe succeeded");
            }
            ProbeOutcome::Failure { error } => {
                tracing::warn!(%target, %error, "probe failed");
            }
        }

        self.sink.append(LogRecord::new(outcome.message(target)));
    }

    async fn execute(&self, target: &Url) -> Result<StatusCode, ProbeError> {
        // The timeout spans the whole attempt, resolution included.
        match tokio::time::timeout(self.timeout, self.attempt(target)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }

    async fn attempt(&self, target: &Url) -> Result<StatusCode, ProbeError> {
        // Domain-name hosts get a resolution preflight so DNS failures come
        // back as their own error kind; IP literals go straight to the request.
        if let Some(Host::Domain(host)) = target.host() {
            let port = target.port_or_known_default().unwrap_or(80);
            dns::resolve_host(host, port)
                .await
                .map_err(|source| ProbeError::Dns {
                    host: host.to_string(),
                    source,
                })?;
        }

        match self.client.get(target.clone()).send().await {
            Ok(response) => Ok(response.status()),
            Err(e) if e.is_timeout() => Err(ProbeError::Timeout(self.timeout)),
            Err(e) => Err(ProbeError::Transport(e)),
        }
    }
}
