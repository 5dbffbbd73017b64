//! The resolver.
//!
//! `WhoisClient` picks the first server, runs one round-trip, and follows at
//! most one referral found in that response.

use crate::error::WhoisError;
use crate::protocols::dialer::{Dialer, DirectDialer};
use crate::protocols::referral::next_hop;
use crate::protocols::servers::select_server;
use crate::protocols::transport::{effective_timeout, query_server};
use crate::types::{Query, ResolutionResult};
use crate::utils::validate_subject;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Resolves WHOIS queries.
///
/// Holds only defaults (dialer, timeout, referral policy); every call is
/// independent and the client can be shared across tasks.
///
/// # Example
///
/// ```rust,no_run
/// use whois_lib::WhoisClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WhoisClient::new();
///     let result = client.lookup("example.com").await?;
///     println!("{}", result.text);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WhoisClient {
    dialer: Arc<dyn Dialer>,
    timeout: Option<Duration>,
    disable_referral: bool,
}

impl WhoisClient {
    /// Create a client that dials directly with the default timeout.
    pub fn new() -> Self {
        Self {
            dialer: Arc::new(DirectDialer),
            timeout: None,
            disable_referral: false,
        }
    }

    /// Use this dialer for queries that don't carry their own.
    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }

    /// Timeout for queries that don't set one.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable referral following for every query from this client.
    pub fn with_referral_disabled(mut self, disabled: bool) -> Self {
        self.disable_referral = disabled;
        self
    }

    /// Resolve a subject with the client's defaults.
    pub async fn lookup(&self, subject: &str) -> Result<ResolutionResult, WhoisError> {
        self.whois(&Query::new(subject)).await
    }

    /// Resolve a query.
    ///
    /// The process:
    /// 1. Reject empty or multi-line subjects before any network I/O
    /// 2. Use the explicit server verbatim, or pick one from the static table
    /// 3. Query it; on failure return the error
    /// 4. If the response names a different server and referrals are enabled,
    ///    query that one too and append its text
    ///
    /// A failed second hop is logged and recorded in `referral_error`; the
    /// first response is still returned.
    ///
    /// # Errors
    ///
    /// `InvalidSubject`, or any transport error from the first round-trip.
    pub async fn whois(&self, query: &Query) -> Result<ResolutionResult, WhoisError> {
        let start = Instant::now();
        let subject = validate_subject(query.subject())?;

        let timeout = effective_timeout(query.timeout().or(self.timeout));
        let dialer: &dyn Dialer = query.dialer().unwrap_or(&self.dialer).as_ref();
        let cancel = query.cancellation();
        let referral_disabled = query.referral_disabled() || self.disable_referral;

        let server = match query.explicit_server() {
            Some(server) => {
                debug!("Using explicit server {} for '{}'", server, subject);
                server.to_string()
            }
            None => {
                let selection = select_server(subject);
                debug!(
                    "Selected {} for '{}' ({})",
                    selection.server, subject, selection.kind
                );
                selection.server.to_string()
            }
        };

        let first = query_server(&server, subject, timeout, dialer, cancel).await?;

        let mut result = ResolutionResult {
            subject: subject.to_string(),
            text: first.text,
            servers: vec![first.server],
            elapsed: start.elapsed(),
            referral_error: None,
        };

        if referral_disabled {
            return Ok(result);
        }

        let Some(referred) = next_hop(&result.text, &result.servers[0]) else {
            return Ok(result);
        };

        debug!("Following referral from {} to {}", result.servers[0], referred);
        match query_server(&referred, subject, timeout, dialer, cancel).await {
            Ok(second) => {
                if !result.text.is_empty() && !result.text.ends_with('\n') {
                    result.text.push('\n');
                }
                result.text.push_str(&second.text);
                result.servers.push(second.server);
            }
            Err(e) => {
                warn!("Referral to {} failed, keeping first response: {}", referred, e);
                result.referral_error = Some(e.to_string());
            }
        }

        result.elapsed = start.elapsed();
        Ok(result)
    }

    /// Resolve several subjects, at most `concurrency` at a time.
    ///
    /// Results come back in input order, one per subject.
    pub async fn lookup_all(
        &self,
        queries: &[Query],
        concurrency: usize,
    ) -> Vec<Result<ResolutionResult, WhoisError>> {
        stream::iter(queries)
            .map(|query| self.whois(query))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = WhoisClient::new()
            .with_timeout(Duration::from_secs(3))
            .with_referral_disabled(true);
        assert_eq!(client.timeout, Some(Duration::from_secs(3)));
        assert!(client.disable_referral);
    }

    #[tokio::test]
    async fn test_empty_subject_rejected() {
        let client = WhoisClient::new();
        let err = client.lookup("   ").await.unwrap_err();
        assert!(matches!(err, WhoisError::InvalidSubject { .. }));
    }

    #[tokio::test]
    async fn test_lookup_all_keeps_input_order() {
        let client = WhoisClient::new();
        let queries = vec![Query::new(""), Query::new("\n"), Query::new(" ")];
        let results = client.lookup_all(&queries, 2).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_err()));
    }
}
