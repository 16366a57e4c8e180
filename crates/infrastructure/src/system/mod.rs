pub mod nameservers;

pub use nameservers::{discover_nameserver, FALLBACK_NAMESERVER, RESOLV_CONF};
