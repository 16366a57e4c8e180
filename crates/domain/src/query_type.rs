use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record category requested for every key of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    #[default]
    A,
    NS,
    MX,
    PTR,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::A => "A",
            QueryType::NS => "NS",
            QueryType::MX => "MX",
            QueryType::PTR => "PTR",
        }
    }

    /// Wire format type number.
    pub fn to_u16(&self) -> u16 {
        match self {
            QueryType::A => 1,
            QueryType::NS => 2,
            QueryType::PTR => 12,
            QueryType::MX => 15,
        }
    }

    pub fn all() -> [QueryType; 4] {
        [QueryType::A, QueryType::NS, QueryType::MX, QueryType::PTR]
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(QueryType::A),
            "NS" => Ok(QueryType::NS),
            "MX" => Ok(QueryType::MX),
            "PTR" => Ok(QueryType::PTR),
            other => Err(format!(
                "Unsupported query type '{}' (expected A, NS, MX or PTR)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("a".parse::<QueryType>().unwrap(), QueryType::A);
        assert_eq!("Mx".parse::<QueryType>().unwrap(), QueryType::MX);
        assert_eq!("ptr".parse::<QueryType>().unwrap(), QueryType::PTR);
    }

    #[test]
    fn test_parse_rejects_unsupported_types() {
        assert!("AAAA".parse::<QueryType>().is_err());
        assert!("".parse::<QueryType>().is_err());
    }

    #[test]
    fn test_display_matches_wire_names() {
        for qt in QueryType::all() {
            assert_eq!(qt.to_string().parse::<QueryType>().unwrap(), qt);
        }
        assert_eq!(QueryType::PTR.to_u16(), 12);
    }
}
