//! Core data types for WHOIS resolution.
//!
//! This module defines the lookup request (`Query`), what a single exchange
//! produces (`RawResponse`), and the final output of the engine
//! (`ResolutionResult`).

use crate::protocols::dialer::Dialer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A single lookup request.
///
/// Built once with the `with_*` methods and then only read. The transport
/// and resolver take it by reference.
///
/// # Example
///
/// ```rust
/// use whois_lib::Query;
/// use std::time::Duration;
///
/// let query = Query::new("example.com")
///     .with_server("whois.verisign-grs.com")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(query.subject(), "example.com");
/// ```
#[derive(Clone, Default)]
pub struct Query {
    subject: String,
    explicit_server: Option<String>,
    timeout: Option<Duration>,
    disable_referral: bool,
    dialer: Option<Arc<dyn Dialer>>,
    cancel: Option<CancellationToken>,
}

impl Query {
    /// Create a query for a domain, IP literal or ASN token.
    pub fn new<S: Into<String>>(subject: S) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Query this server instead of classifying the subject.
    ///
    /// Accepts `host` or `host:port`. An empty string means "no override".
    pub fn with_server<S: Into<String>>(mut self, server: S) -> Self {
        let server = server.into();
        self.explicit_server = if server.trim().is_empty() {
            None
        } else {
            Some(server.trim().to_string())
        };
        self
    }

    /// Per round-trip timeout. Zero falls back to the default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Never chase a referral marker found in the first response.
    pub fn with_referral_disabled(mut self, disabled: bool) -> Self {
        self.disable_referral = disabled;
        self
    }

    /// Route connections for this query through a specific dialer.
    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = Some(dialer);
        self
    }

    /// Abort in-flight I/O when this token is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn explicit_server(&self) -> Option<&str> {
        self.explicit_server.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn referral_disabled(&self) -> bool {
        self.disable_referral
    }

    pub fn dialer(&self) -> Option<&Arc<dyn Dialer>> {
        self.dialer.as_ref()
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("subject", &self.subject)
            .field("explicit_server", &self.explicit_server)
            .field("timeout", &self.timeout)
            .field("disable_referral", &self.disable_referral)
            .field("dialer", &self.dialer)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// What kind of thing is being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A domain name or any token that is not an IP or ASN
    Domain,

    /// An IPv4/IPv6 literal or CIDR prefix
    Ip,

    /// An autonomous system number (`AS15169` or `15169`)
    Asn,
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectKind::Domain => write!(f, "domain"),
            SubjectKind::Ip => write!(f, "ip"),
            SubjectKind::Asn => write!(f, "asn"),
        }
    }
}

/// The text received from one exchange with one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// Server address the text came from (`host:port`)
    pub server: String,

    /// Response decoded as text; empty when the server sent nothing
    pub text: String,

    /// Time from dial to end-of-stream
    pub elapsed: Duration,
}

/// Final output of a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// The subject as it was sent to the servers
    pub subject: String,

    /// First response followed by the referred server's response, if any
    pub text: String,

    /// Servers whose responses make up `text`, in query order
    pub servers: Vec<String>,

    /// Total time across both round-trips
    pub elapsed: Duration,

    /// Why a referral hop was attempted but contributed nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_error: Option<String>,
}

impl ResolutionResult {
    /// The server that produced the last part of `text`.
    pub fn answering_server(&self) -> Option<&str> {
        self.servers.last().map(String::as_str)
    }

    /// Whether the engine followed a referral successfully.
    pub fn followed_referral(&self) -> bool {
        self.servers.len() > 1
    }

    /// The server returned zero bytes; distinct from a failed lookup.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::new("example.com")
            .with_server("whois.example.net:4343")
            .with_timeout(Duration::from_secs(5))
            .with_referral_disabled(true);

        assert_eq!(query.subject(), "example.com");
        assert_eq!(query.explicit_server(), Some("whois.example.net:4343"));
        assert_eq!(query.timeout(), Some(Duration::from_secs(5)));
        assert!(query.referral_disabled());
        assert!(query.dialer().is_none());
        assert!(query.cancellation().is_none());
    }

    #[test]
    fn test_blank_server_means_no_override() {
        assert_eq!(Query::new("example.com").with_server("").explicit_server(), None);
        assert_eq!(Query::new("example.com").with_server("  ").explicit_server(), None);
    }

    #[test]
    fn test_resolution_result_helpers() {
        let result = ResolutionResult {
            subject: "example.com".to_string(),
            text: "a\nb\n".to_string(),
            servers: vec!["whois.a:43".to_string(), "whois.b:43".to_string()],
            elapsed: Duration::from_millis(10),
            referral_error: None,
        };
        assert_eq!(result.answering_server(), Some("whois.b:43"));
        assert!(result.followed_referral());
        assert!(!result.is_empty());
    }

    #[test]
    fn test_subject_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SubjectKind::Asn).unwrap(), "\"asn\"");
        assert_eq!(SubjectKind::Ip.to_string(), "ip");
    }
}
