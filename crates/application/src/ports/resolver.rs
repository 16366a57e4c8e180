use async_trait::async_trait;
use ferrous_sweep_domain::{DomainError, LookupKey, QueryType};

/// One lookup of a key for a query type.
///
/// Returns the matching values in answer order, or an empty list when the
/// server answered without matching records. Callers enforce their own
/// deadline around `query`, so implementations must be cancel-safe: dropping
/// the future mid-flight may not leave shared state behind.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn query(&self, key: &LookupKey, query_type: QueryType)
        -> Result<Vec<String>, DomainError>;
}
