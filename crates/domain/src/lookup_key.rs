use std::fmt;
use std::sync::Arc;

/// Subject of a single resolution request (hostname, FQDN or address).
/// Uses `Arc<str>` so handing a key from generator → dispatcher → worker is a
/// refcount bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookupKey(Arc<str>);

impl LookupKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Joins a prefix and suffix as `prefix.suffix`.
    pub fn joined(prefix: &str, suffix: &str) -> Self {
        Self(Arc::from(format!("{}.{}", prefix, suffix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LookupKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LookupKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for LookupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
