mod dns;
mod http;
mod prober;
mod scheduler;
mod sink;
mod targets;
mod types;

pub use dns::DnsFailureSet;
pub use prober::{ProbeError, Prober};
pub use scheduler::Scheduler;
pub use sink::{LogRecord, LogSink, MemorySink};
pub use targets::{resolve_targets, TargetError, URI_FORMATS};
pub use types::{PingerConfig, ProbeOutcome, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, TARGETS_ENV};

use std::sync::Arc;

pub async fn run(config: PingerConfig, sink: Arc<dyn LogSink>) {
    Scheduler::new(config, sink).run().await;
}

pub async fn run_once(config: PingerConfig, sink: Arc<dyn LogSink>) {
    Scheduler::new(config, sink).run_cycle().await;
}
