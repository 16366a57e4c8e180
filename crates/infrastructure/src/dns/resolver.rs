use super::forwarding::{DnsResponse, MessageBuilder, ResponseParser};
use super::reverse::reverse_name;
use super::transport::Transport;
use async_trait::async_trait;
use ferrous_sweep_application::ports::Resolver;
use ferrous_sweep_domain::{DomainError, LookupKey, QueryType};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;

/// Resolver port backed by one nameserver, spoken to directly over UDP with
/// a TCP retry for truncated answers.
#[derive(Debug, Clone)]
pub struct DnsResolver {
    nameserver: SocketAddr,
    recursion: bool,
    timeout: Duration,
}

impl DnsResolver {
    pub fn new(nameserver: SocketAddr, recursion: bool, timeout: Duration) -> Self {
        Self {
            nameserver,
            recursion,
            timeout,
        }
    }

    /// Name actually put on the wire for `key`.
    pub fn query_name(key: &LookupKey, query_type: QueryType) -> String {
        if query_type == QueryType::PTR {
            if let Ok(ip) = key.as_str().parse::<IpAddr>() {
                return reverse_name(&ip);
            }
        }
        key.as_str().to_string()
    }

    async fn exchange(
        &self,
        transport: &Transport,
        domain: &str,
        query_type: QueryType,
    ) -> Result<DnsResponse, DomainError> {
        let query = MessageBuilder::build_query(domain, query_type, self.recursion)?;
        let raw = transport.send(&query.bytes, self.timeout).await?;
        let response = ResponseParser::parse(&raw.bytes, query_type)?;

        if response.id != query.id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Response ID {} does not match query ID {} ({})",
                response.id, query.id, raw.protocol_used
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn query(
        &self,
        key: &LookupKey,
        query_type: QueryType,
    ) -> Result<Vec<String>, DomainError> {
        let domain = Self::query_name(key, query_type);

        let mut response = self
            .exchange(&Transport::udp(self.nameserver), &domain, query_type)
            .await?;

        if response.truncated {
            debug!(
                domain = %domain,
                server = %self.nameserver,
                "Response truncated (TC bit), retrying via TCP"
            );
            response = self
                .exchange(&Transport::tcp(self.nameserver), &domain, query_type)
                .await?;
        }

        debug!(
            domain = %domain,
            status = ResponseParser::rcode_to_status(response.rcode),
            values = response.values.len(),
            "Lookup answered"
        );

        Ok(response.values)
    }
}
