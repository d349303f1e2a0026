use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("httpstorm/", env!("CARGO_PKG_VERSION"));

pub fn create_http_pool(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        // Probe targets are routinely fronted by self-signed or mismatched
        // certificates; availability is measured regardless.
        .danger_accept_invalid_certs(true)
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
        .expect("Failed to create HTTP client")
}
