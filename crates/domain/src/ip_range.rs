use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A CIDR block whose addresses become lookup keys for reverse sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRange(IpNetwork);

impl IpRange {
    /// Every address in the block, ascending.
    pub fn addresses(&self) -> impl Iterator<Item = IpAddr> {
        self.0.iter()
    }

    pub fn prefix(&self) -> u8 {
        self.0.prefix()
    }
}

impl FromStr for IpRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains('/') {
            return Err(format!(
                "Range '{}' must include a prefix (e.g., 192.168.1.0/24)",
                s
            ));
        }
        s.parse::<IpNetwork>()
            .map(IpRange)
            .map_err(|e| format!("Invalid CIDR {}: {}", s, e))
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_block_expands_in_order() {
        let range: IpRange = "10.0.0.0/30".parse().unwrap();
        let addrs: Vec<String> = range.addresses().map(|a| a.to_string()).collect();
        assert_eq!(addrs, vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn test_host_route_is_single_address() {
        let range: IpRange = "192.0.2.7/32".parse().unwrap();
        assert_eq!(range.addresses().count(), 1);
    }

    #[test]
    fn test_missing_prefix_rejected() {
        assert!("192.168.1.0".parse::<IpRange>().is_err());
        assert!("banana/24".parse::<IpRange>().is_err());
    }
}
