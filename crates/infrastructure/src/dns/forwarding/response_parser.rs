use ferrous_sweep_domain::{DomainError, QueryType};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, RData};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub rcode: ResponseCode,

    pub truncated: bool,

    /// Answer values of the queried type, in answer order.
    pub values: Vec<String>,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Decode a response and pull out the values for `query_type`.
    ///
    /// Answers of any other type (CNAME hops, glue) are skipped.
    pub fn parse(response_bytes: &[u8], query_type: QueryType) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let values: Vec<String> = message
            .answers()
            .iter()
            .filter_map(|record| Self::value_of(record.data(), query_type))
            .collect();

        debug!(
            id = message.id(),
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            values = values.len(),
            truncated = message.truncated(),
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id: message.id(),
            rcode: message.response_code(),
            truncated: message.truncated(),
            values,
        })
    }

    fn value_of(data: &RData, query_type: QueryType) -> Option<String> {
        match (query_type, data) {
            (QueryType::A, RData::A(a)) => Some(a.0.to_string()),
            (QueryType::NS, RData::NS(ns)) => Some(Self::host(ns)),
            (QueryType::MX, RData::MX(mx)) => Some(Self::host(mx.exchange())),
            (QueryType::PTR, RData::PTR(ptr)) => Some(Self::host(ptr)),
            _ => None,
        }
    }

    /// Name without the trailing root dot.
    fn host(name: &Name) -> String {
        let mut text = name.to_utf8();
        if text.len() > 1 && text.ends_with('.') {
            text.pop();
        }
        text
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}
