//! One WHOIS round-trip (RFC 3912).
//!
//! Connect to port 43, send the subject terminated by CRLF, then read until
//! the server closes the connection. Each phase is bounded by the same
//! deadline, computed once when the exchange starts.

use crate::error::WhoisError;
use crate::protocols::dialer::Dialer;
use crate::protocols::servers::server_address;
use crate::types::RawResponse;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Used when the caller gives no timeout, or a zero timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolve a caller-supplied timeout to the one actually applied.
pub fn effective_timeout(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(t) if !t.is_zero() => t,
        _ => DEFAULT_TIMEOUT,
    }
}

/// Perform one query/response exchange against `server`.
///
/// `server` may be `host` or `host:port`; port 43 is implied. An empty
/// response is a success with empty text. When `cancel` fires, the exchange
/// is abandoned at whatever phase it's in and the connection is dropped.
pub async fn query_server(
    server: &str,
    subject: &str,
    timeout: Duration,
    dialer: &dyn Dialer,
    cancel: Option<&CancellationToken>,
) -> Result<RawResponse, WhoisError> {
    let address = server_address(server);
    let exchange = exchange(&address, subject, timeout, dialer);

    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Query to {} cancelled", address);
                    Err(WhoisError::cancelled(address.clone()))
                }
                result = exchange => result,
            }
        }
        None => exchange.await,
    }
}

/// Roughly 30 years; stands in for deadlines `Instant` can't represent.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    start
        .checked_add(timeout)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

async fn exchange(
    address: &str,
    subject: &str,
    timeout: Duration,
    dialer: &dyn Dialer,
) -> Result<RawResponse, WhoisError> {
    let start = Instant::now();
    let deadline = deadline_after(start, timeout);

    let mut stream = dialer.dial(address, deadline).await?;

    let line = format!("{}\r\n", subject);
    let write = async {
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await
    };
    match timeout_at(deadline, write).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(WhoisError::write(address, e.to_string())),
        Err(_) => return Err(WhoisError::timeout(address, "write", timeout)),
    }
    debug!("Sent query for '{}' to {}", subject, address);

    let mut buf = Vec::new();
    match timeout_at(deadline, stream.read_to_end(&mut buf)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            return Err(WhoisError::connection(
                address,
                format!("read failed: {}", e),
            ))
        }
        Err(_) => return Err(WhoisError::timeout(address, "read", timeout)),
    }

    let elapsed = start.elapsed();
    debug!("Received {} bytes from {} in {:?}", buf.len(), address, elapsed);

    Ok(RawResponse {
        server: address.to_string(),
        text: String::from_utf8_lossy(&buf).into_owned(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::dialer::DirectDialer;
    use tokio::net::TcpListener;

    /// Serve one connection: read the query line, reply, close.
    async fn one_shot_server(reply: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut byte = [0u8; 1];
            while !received.ends_with(b"\r\n") {
                if conn.read(&mut byte).await.unwrap() == 0 {
                    break;
                }
                received.push(byte[0]);
            }
            conn.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8(received).unwrap()
        });
        (addr, handle)
    }

    #[test]
    fn test_effective_timeout() {
        assert_eq!(effective_timeout(None), DEFAULT_TIMEOUT);
        assert_eq!(effective_timeout(Some(Duration::ZERO)), DEFAULT_TIMEOUT);
        assert_eq!(
            effective_timeout(Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn test_query_sends_crlf_terminated_subject() {
        let (addr, handle) = one_shot_server("Domain Name: EXAMPLE.COM\r\n").await;

        let response = query_server(&addr, "example.com", Duration::from_secs(5), &DirectDialer, None)
            .await
            .unwrap();

        assert_eq!(handle.await.unwrap(), "example.com\r\n");
        assert_eq!(response.server, addr);
        assert_eq!(response.text, "Domain Name: EXAMPLE.COM\r\n");
    }

    #[test]
    fn test_deadline_after_saturates() {
        let start = Instant::now();
        assert_eq!(deadline_after(start, Duration::from_secs(5)), start + Duration::from_secs(5));
        assert_eq!(deadline_after(start, Duration::MAX), start + FAR_FUTURE);
    }

    #[tokio::test]
    async fn test_huge_timeout_does_not_panic() {
        let (addr, _handle) = one_shot_server("Domain Name: EXAMPLE.COM\r\n").await;

        let response = query_server(
            &addr,
            "example.com",
            Duration::from_secs(u64::MAX),
            &DirectDialer,
            None,
        )
        .await
        .unwrap();
        assert_eq!(response.text, "Domain Name: EXAMPLE.COM\r\n");
    }

    #[tokio::test]
    async fn test_empty_response_is_success() {
        let (addr, _handle) = one_shot_server("").await;

        let response = query_server(&addr, "example.com", Duration::from_secs(5), &DirectDialer, None)
            .await
            .unwrap();
        assert!(response.text.is_empty());
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let _server = tokio::spawn(async move {
            let (conn, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(conn);
        });

        let timeout = Duration::from_millis(200);
        let start = std::time::Instant::now();
        let err = query_server(&addr, "example.com", timeout, &DirectDialer, None)
            .await
            .unwrap_err();

        assert!(start.elapsed() >= timeout);
        assert!(err.is_timeout());
        assert!(matches!(err, WhoisError::Timeout { ref operation, .. } if operation == "read"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let _server = tokio::spawn(async move {
            let (conn, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(conn);
        });

        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = query_server(&addr, "example.com", Duration::from_secs(5), &DirectDialer, Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, WhoisError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = query_server(&addr, "example.com", Duration::from_secs(2), &DirectDialer, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WhoisError::ConnectionError { .. }));
    }
}
