use crate::LookupKey;
use std::fmt;

/// How a single dispatched lookup ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// At least one matching record, in the order the resolver returned them.
    Success(Vec<String>),
    NoResult,
    Timeout,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(values) => f.write_str(&values.join(",")),
            Outcome::NoResult => f.write_str("<no result>"),
            Outcome::Timeout => f.write_str("<timeout>"),
        }
    }
}

/// Exactly one of these is produced for every key handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultRecord {
    pub key: LookupKey,
    pub outcome: Outcome,
}

impl ResultRecord {
    pub fn new(key: LookupKey, outcome: Outcome) -> Self {
        Self { key, outcome }
    }

    pub fn success(key: LookupKey, values: Vec<String>) -> Self {
        if values.is_empty() {
            return Self::new(key, Outcome::NoResult);
        }
        Self::new(key, Outcome::Success(values))
    }

    /// Success lines are always shown; the rest only in verbose mode.
    pub fn is_visible(&self, verbose: bool) -> bool {
        verbose || self.outcome.is_success()
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.key, self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_line_joins_values_with_commas() {
        let record = ResultRecord::success(
            LookupKey::from("a.example.com"),
            vec!["1.2.3.4".to_string(), "5.6.7.8".to_string()],
        );
        assert_eq!(record.to_string(), "a.example.com\t1.2.3.4,5.6.7.8");
    }

    #[test]
    fn test_single_value_line() {
        let record =
            ResultRecord::success(LookupKey::from("a.example.com"), vec!["1.2.3.4".into()]);
        assert_eq!(record.to_string(), "a.example.com\t1.2.3.4");
    }

    #[test]
    fn test_empty_success_collapses_to_no_result() {
        let record = ResultRecord::success(LookupKey::from("x.example.com"), vec![]);
        assert_eq!(record.outcome, Outcome::NoResult);
        assert_eq!(record.to_string(), "x.example.com\t<no result>");
    }

    #[test]
    fn test_timeout_line() {
        let record = ResultRecord::new(LookupKey::from("slow.example.com"), Outcome::Timeout);
        assert_eq!(record.to_string(), "slow.example.com\t<timeout>");
    }

    #[test]
    fn test_visibility_policy() {
        let hit = ResultRecord::success(LookupKey::from("a"), vec!["1.1.1.1".into()]);
        let miss = ResultRecord::new(LookupKey::from("b"), Outcome::NoResult);
        let slow = ResultRecord::new(LookupKey::from("c"), Outcome::Timeout);

        assert!(hit.is_visible(false));
        assert!(!miss.is_visible(false));
        assert!(!slow.is_visible(false));
        assert!(miss.is_visible(true));
        assert!(slow.is_visible(true));
    }
}
