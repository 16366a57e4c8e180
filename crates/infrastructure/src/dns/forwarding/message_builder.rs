//! Builds DNS query messages in wire format with `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use ferrous_sweep_domain::{DomainError, QueryType};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// A serialized query and the ID its response must carry.
#[derive(Debug, Clone)]
pub struct QueryMessage {
    pub id: u16,
    pub bytes: Vec<u8>,
}

pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a single-question query with a random ID.
    ///
    /// `recursion` controls the RD flag.
    pub fn build_query(
        domain: &str,
        query_type: QueryType,
        recursion: bool,
    ) -> Result<QueryMessage, DomainError> {
        Self::build_query_with_id(fastrand::u16(..), domain, query_type, recursion)
    }

    pub fn build_query_with_id(
        id: u16,
        domain: &str,
        query_type: QueryType,
        recursion: bool,
    ) -> Result<QueryMessage, DomainError> {
        let name = Name::from_str(domain).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordTypeMapper::to_hickory(query_type));
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(recursion);
        message.add_query(query);

        let bytes = Self::serialize_message(&message)?;
        Ok(QueryMessage { id, bytes })
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDomainName(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
