use ferrous_sweep_domain::validators::{parse_nameserver, DEFAULT_DNS_PORT};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing::{debug, warn};

pub const RESOLV_CONF: &str = "/etc/resolv.conf";

pub const FALLBACK_NAMESERVER: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), DEFAULT_DNS_PORT);

/// The system's first configured nameserver, or [`FALLBACK_NAMESERVER`].
pub fn discover_nameserver() -> SocketAddr {
    discover_from(Path::new(RESOLV_CONF))
}

pub fn discover_from(path: &Path) -> SocketAddr {
    match std::fs::read_to_string(path) {
        Ok(content) => match first_nameserver(&content) {
            Some(addr) => {
                debug!(nameserver = %addr, path = %path.display(), "Using system nameserver");
                addr
            }
            None => {
                warn!(
                    path = %path.display(),
                    fallback = %FALLBACK_NAMESERVER,
                    "No usable nameserver line, using fallback"
                );
                FALLBACK_NAMESERVER
            }
        },
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                fallback = %FALLBACK_NAMESERVER,
                "Cannot read resolver configuration, using fallback"
            );
            FALLBACK_NAMESERVER
        }
    }
}

/// First parsable `nameserver` entry in resolv.conf syntax.
///
/// Scoped IPv6 entries (`fe80::1%eth0`) are skipped.
pub fn first_nameserver(content: &str) -> Option<SocketAddr> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => Some(addr),
                _ => None,
            }
        })
        .find_map(|addr| parse_nameserver(addr).ok())
}
