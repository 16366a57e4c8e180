use ferrous_sweep_domain::QueryType;
use hickory_proto::rr::RecordType as HickoryRecordType;

/// Maps between the sweep's query types and hickory record types.
pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(query_type: QueryType) -> HickoryRecordType {
        match query_type {
            QueryType::A => HickoryRecordType::A,
            QueryType::NS => HickoryRecordType::NS,
            QueryType::MX => HickoryRecordType::MX,
            QueryType::PTR => HickoryRecordType::PTR,
        }
    }

    /// Returns `None` for record types a sweep never asks for.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> Option<QueryType> {
        match hickory_type {
            HickoryRecordType::A => Some(QueryType::A),
            HickoryRecordType::NS => Some(QueryType::NS),
            HickoryRecordType::MX => Some(QueryType::MX),
            HickoryRecordType::PTR => Some(QueryType::PTR),
            _ => None,
        }
    }
}
