use clap::Parser;
use libping_storm::{
    LogRecord, LogSink, PingerConfig, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, TARGETS_ENV,
};
use std::{
    env,
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const INTERVAL_SECS_ENV: &str = "HTTPSTORM_INTERVAL_SECS";
const EXPIRE_SECS_ENV: &str = "HTTPSTORM_EXPIRE_SECS";
const TIMEOUT_SECS_ENV: &str = "HTTPSTORM_TIMEOUT_SECS";
const LOG_FILE_ENV: &str = "HTTPSTORM_LOG_FILE";

#[derive(Parser, Debug)]
#[command(name = "hp")]
#[command(about = "HTTP pinger - periodic availability probes for web endpoints", long_about = None)]
struct Args {
    /// Targets to probe: absolute URIs or site-name fragments, comma/semicolon
    /// separated (falls back to HTTPSTORM_TARGETS)
    targets: Vec<String>,

    /// Seconds to sleep between probe cycles
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Stop probing this many seconds after startup (runs forever if unset)
    #[arg(long)]
    expire_secs: Option<u64>,

    /// Per-probe timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Append probe records to this file instead of stdout
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run a single probe cycle and exit
    #[arg(long)]
    once: bool,
}

struct StdoutSink;

impl LogSink for StdoutSink {
    fn append(&self, record: LogRecord) {
        println!("{}", record.line());
    }
}

struct FileSink {
    path: PathBuf,
}

impl FileSink {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn try_append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{line}\n").as_bytes())
    }
}

impl LogSink for FileSink {
    fn append(&self, record: LogRecord) {
        // Delivery is best effort; a full disk or bad path must not take the
        // probe loop down with it.
        if let Err(error) = self.try_append(&record.line()) {
            tracing::debug!(path = %self.path.display(), %error, "dropping log record");
        }
    }
}

fn env_secs(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}

fn build_config(args: &Args) -> PingerConfig {
    let targets = if args.targets.is_empty() {
        env::var(TARGETS_ENV).ok()
    } else {
        Some(args.targets.join(","))
    };

    let interval = args
        .interval_secs
        .or_else(|| env_secs(INTERVAL_SECS_ENV))
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_INTERVAL);

    let expire_after = args
        .expire_secs
        .or_else(|| env_secs(EXPIRE_SECS_ENV))
        .map(Duration::from_secs);

    let timeout = args
        .timeout_secs
        .or_else(|| env_secs(TIMEOUT_SECS_ENV))
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    PingerConfig {
        targets,
        interval,
        expire_after,
        timeout,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args);

    let log_file = args
        .log_file
        .clone()
        .or_else(|| env::var(LOG_FILE_ENV).ok().map(PathBuf::from));

    let sink: Arc<dyn LogSink> = match &log_file {
        Some(path) => Arc::new(FileSink::new(path)),
        None => Arc::new(StdoutSink),
    };

    tracing::info!(
        interval_secs = config.interval.as_secs(),
        timeout_secs = config.timeout.as_secs(),
        expire_secs = config.expire_after.map(|ttl| ttl.as_secs()),
        log_file = ?log_file,
        "starting httpstorm"
    );

    let rt = tokio::runtime::Runtime::new()?;
    if args.once {
        rt.block_on(libping_storm::run_once(config, sink));
    } else {
        rt.block_on(libping_storm::run(config, sink));
    }

    Ok(())
}
