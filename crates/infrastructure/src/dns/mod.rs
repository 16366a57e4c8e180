pub mod forwarding;
pub mod resolver;
pub mod reverse;
pub mod transport;

pub use resolver::DnsResolver;
pub use reverse::reverse_name;
