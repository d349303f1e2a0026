use dashmap::DashSet;
use std::io;
use url::Url;

// Once a target's host fails to resolve it stays suppressed for the lifetime
// of the process; entries are never removed.
#[derive(Debug, Default)]
pub struct DnsFailureSet {
    targets: DashSet<String>,
}

impl DnsFailureSet {
    pub fn new() -> Self {
        Self {
            targets: DashSet::new(),
        }
    }

    pub fn should_skip(&self, target: &Url) -> bool {
        self.targets.contains(target.as_str())
    }

    pub fn mark_failed(&self, target: &Url) -> bool {
        self.targets.insert(target.as_str().to_owned())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

pub async fn resolve_host(host: &str, port: u16) -> io::Result<()> {
    let mut addrs = tokio::net::lookup_host((host, port)).await?;
    if addrs.next().is_none() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses found for {host}"),
        ));
    }
    Ok(())
}
