//! Address allow/deny filtering.
//!
//! A message is kept when the allow list is empty or one allow pattern
//! matches its address, and no deny pattern matches. Patterns are unanchored
//! regular expressions.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid address pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Pattern lists as written in a filter file.
///
/// # Examples
/// ```
/// use oscshark_core::FilterConfig;
///
/// let config: FilterConfig = serde_json::from_str(r#"{ "deny": ["^/ping"] }"#).unwrap();
/// assert!(config.allow.is_empty());
/// assert_eq!(config.deny, vec!["^/ping".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

impl FilterConfig {
    /// Append the patterns of `other` to this configuration.
    pub fn merge(&mut self, other: FilterConfig) {
        self.allow.extend(other.allow);
        self.deny.extend(other.deny);
    }

    pub fn compile(&self) -> Result<AddressFilter, FilterError> {
        AddressFilter::new(&self.allow, &self.deny)
    }
}

/// Compiled allow/deny address filter.
///
/// # Examples
/// ```
/// use oscshark_core::AddressFilter;
///
/// let filter = AddressFilter::new(&["^/foo"], &[] as &[&str]).unwrap();
/// assert!(filter.permits("/foo/bar"));
/// assert!(!filter.permits("/baz"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddressFilter {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
}

impl AddressFilter {
    pub fn new<S: AsRef<str>>(allow: &[S], deny: &[S]) -> Result<Self, FilterError> {
        Ok(Self {
            allow: compile_all(allow)?,
            deny: compile_all(deny)?,
        })
    }

    /// Filter that keeps every address.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn permits(&self, address: &str) -> bool {
        let allowed = self.allow.is_empty() || self.allow.iter().any(|re| re.is_match(address));
        let denied = self.deny.iter().any(|re| re.is_match(address));
        allowed && !denied
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{AddressFilter, FilterConfig, FilterError};

    const NONE: &[&str] = &[];

    #[test]
    fn empty_filter_permits_everything() {
        let filter = AddressFilter::allow_all();
        assert!(filter.is_empty());
        assert!(filter.permits("/anything"));
    }

    #[test]
    fn allow_list_restricts() {
        let filter = AddressFilter::new(&["^/foo"], NONE).unwrap();
        assert!(filter.permits("/foo/bar"));
        assert!(!filter.permits("/baz"));
    }

    #[test]
    fn deny_wins_over_allow() {
        let filter = AddressFilter::new(&["^/mixer"], &["/meter"]).unwrap();
        assert!(filter.permits("/mixer/ch/1/fader"));
        assert!(!filter.permits("/mixer/ch/1/meter"));
    }

    #[test]
    fn deny_only() {
        let filter = AddressFilter::new(NONE, &["^/ping$"]).unwrap();
        assert!(!filter.permits("/ping"));
        assert!(filter.permits("/ping/reply"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = AddressFilter::new(&["("], NONE).unwrap_err();
        let FilterError::InvalidPattern { pattern, .. } = err;
        assert_eq!(pattern, "(");
    }

    #[test]
    fn configs_merge() {
        let mut config = FilterConfig {
            allow: vec!["^/a".to_string()],
            deny: vec![],
        };
        config.merge(FilterConfig {
            allow: vec!["^/b".to_string()],
            deny: vec!["^/a/x".to_string()],
        });
        let filter = config.compile().unwrap();
        assert!(filter.permits("/b"));
        assert!(filter.permits("/a/y"));
        assert!(!filter.permits("/a/x"));
        assert!(!filter.permits("/c"));
    }
}
