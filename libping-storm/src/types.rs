use crate::prober::ProbeError;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

pub const TARGETS_ENV: &str = "HTTPSTORM_TARGETS";

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PingerConfig {
    pub targets: Option<String>,
    pub interval: Duration,
    pub expire_after: Option<Duration>,
    pub timeout: Duration,
}

impl Default for PingerConfig {
    fn default() -> Self {
        Self {
            targets: None,
            interval: DEFAULT_INTERVAL,
            expire_after: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum ProbeOutcome {
    Success { status: StatusCode, latency_ms: u128 },
    Failure { error: ProbeError },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    pub fn message(&self, target: &Url) -> String {
        match self {
            ProbeOutcome::Success { status, latency_ms } => format!(
                "Ping '{}', Status {}, Latency: {}ms",
                target,
                status.as_u16(),
                latency_ms
            ),
            ProbeOutcome::Failure { error } => format!("Ping '{}', {}", target, error),
        }
    }
}
