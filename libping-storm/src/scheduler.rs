use crate::{
    dns::DnsFailureSet,
    prober::Prober,
    sink::{LogRecord, LogSink},
    targets::resolve_targets,
    types::{PingerConfig, TARGETS_ENV},
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::{sleep, Instant};

pub struct Scheduler {
    config: PingerConfig,
    prober: Prober,
    dns_failures: Arc<DnsFailureSet>,
    sink: Arc<dyn LogSink>,
}

impl Scheduler {
    pub fn new(config: PingerConfig, sink: Arc<dyn LogSink>) -> Self {
        let dns_failures = Arc::new(DnsFailureSet::new());
        let prober = Prober::new(&config, Arc::clone(&dns_failures), Arc::clone(&sink));
        Self {
            config,
            prober,
            dns_failures,
            sink,
        }
    }

    pub fn dns_failures(&self) -> &DnsFailureSet {
        &self.dns_failures
    }

    pub async fn run(&self) {
        // An expiration too distant to represent as a deadline means none.
        let deadline = self
            .config
            .expire_after
            .and_then(|ttl| Instant::now().checked_add(ttl));

        loop {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::info!("expiration deadline reached, stopping");
                    break;
                }
            }

            self.run_cycle().await;
            sleep(self.config.interval).await;
        }
    }

    // One probe cycle: every target is dispatched concurrently and the cycle
    // ends only once all probes have settled. A bad target list is logged to
    // the sink and the cycle skipped; the loop keeps running.
    pub async fn run_cycle(&self) {
        let raw = self.config.targets.as_deref();
        match resolve_targets(raw) {
            Ok(targets) => {
                tracing::debug!(targets = targets.len(), "dispatching probe cycle");
                join_all(targets.iter().map(|target| self.prober.ping(target))).await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to resolve target list");
                self.sink.append(LogRecord::new(format!(
                    "{}: '{}', {}",
                    TARGETS_ENV,
                    raw.unwrap_or_default(),
                    error
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_ok_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream
                        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                        .await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        addr
    }

    async fn spawn_hanging_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let _held = stream;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                });
            }
        });
        addr
    }

    fn scheduler_with_sink(config: PingerConfig) -> (Scheduler, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let scheduler = Scheduler::new(config, Arc::clone(&sink) as Arc<dyn LogSink>);
        (scheduler, sink)
    }

    #[tokio::test]
    async fn cycle_waits_for_every_target() {
        let first = spawn_ok_server().await;
        let second = spawn_ok_server().await;
        let config = PingerConfig {
            targets: Some(format!("http://{first}/,http://{second}/")),
            ..PingerConfig::default()
        };
        let (scheduler, sink) = scheduler_with_sink(config);

        scheduler.run_cycle().await;

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.contains("Status 200")));
    }

    #[tokio::test]
    async fn slow_targets_time_out_concurrently_not_serially() {
        let addr = spawn_hanging_server().await;
        // Five distinct targets on one unresponsive host; probed serially the
        // cycle would take five timeouts, fanned out it takes about one.
        let raw = (0..5)
            .map(|i| format!("http://{addr}/{i}"))
            .collect::<Vec<_>>()
            .join(",");
        let config = PingerConfig {
            targets: Some(raw),
            timeout: Duration::from_millis(300),
            ..PingerConfig::default()
        };
        let (scheduler, sink) = scheduler_with_sink(config);

        let start = tokio::time::Instant::now();
        scheduler.run_cycle().await;

        assert!(start.elapsed() < Duration::from_millis(1200));
        assert_eq!(sink.len(), 5);
        assert!(sink.messages().iter().all(|m| m.contains("timed out after")));
    }

    #[tokio::test]
    async fn missing_target_list_logs_and_survives() {
        let (scheduler, sink) = scheduler_with_sink(PingerConfig::default());

        scheduler.run_cycle().await;
        scheduler.run_cycle().await;

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "HTTPSTORM_TARGETS: '', Target list is not set");
    }

    #[tokio::test]
    async fn malformed_entry_logs_raw_list() {
        let config = PingerConfig {
            targets: Some("bad host".to_string()),
            ..PingerConfig::default()
        };
        let (scheduler, sink) = scheduler_with_sink(config);

        scheduler.run_cycle().await;

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("HTTPSTORM_TARGETS: 'bad host', Invalid target"));
    }

    #[tokio::test]
    async fn dns_failures_suppress_across_cycles() {
        let config = PingerConfig {
            targets: Some("http://host.invalid/".to_string()),
            ..PingerConfig::default()
        };
        let (scheduler, sink) = scheduler_with_sink(config);

        scheduler.run_cycle().await;
        assert_eq!(sink.len(), 1);
        assert_eq!(scheduler.dns_failures().len(), 1);

        scheduler.run_cycle().await;
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn zero_expiration_stops_before_first_cycle() {
        let config = PingerConfig {
            targets: Some("http://127.0.0.1:1/".to_string()),
            expire_after: Some(Duration::ZERO),
            ..PingerConfig::default()
        };
        let (scheduler, sink) = scheduler_with_sink(config);

        scheduler.run().await;

        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn oversized_expiration_runs_forever_instead_of_panicking() {
        let config = PingerConfig {
            targets: Some(String::new()),
            expire_after: Some(Duration::from_secs(u64::MAX)),
            ..PingerConfig::default()
        };
        let (scheduler, _sink) = scheduler_with_sink(config);

        let handle = tokio::spawn(async move { scheduler.run().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Still looping: the unrepresentable deadline degraded to no deadline.
        assert!(!handle.is_finished());
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn bounded_run_cycles_until_deadline() {
        let addr = spawn_ok_server().await;
        let config = PingerConfig {
            targets: Some(format!("http://{addr}/")),
            interval: Duration::from_millis(50),
            expire_after: Some(Duration::from_millis(160)),
            ..PingerConfig::default()
        };
        let (scheduler, sink) = scheduler_with_sink(config);

        scheduler.run().await;

        assert!(sink.len() >= 1);
        assert!(sink.messages().iter().all(|m| m.contains("Status 200")));
    }
}
