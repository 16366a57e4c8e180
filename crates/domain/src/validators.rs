use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_DNS_PORT: u16 = 53;

/// Accepts `ip`, `ip:port` or `[v6]:port`; a bare address gets port 53.
pub fn parse_nameserver(value: &str) -> Result<SocketAddr, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Nameserver cannot be empty".to_string());
    }
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    value
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
        .map_err(|_| format!("Invalid nameserver '{}': expected ip or ip:port", value))
}

pub fn validate_key_list(entries: &[String], source: &str) -> Result<(), String> {
    if entries.is_empty() {
        return Err(format!("{source} list contains no entries"));
    }
    if let Some(bad) = entries.iter().find(|e| e.chars().any(char::is_whitespace)) {
        return Err(format!("{source} entry '{bad}' contains whitespace"));
    }
    Ok(())
}
