//! Protocol implementations for WHOIS resolution.
//!
//! This module contains the network connectors, the single round-trip
//! transport, the static server table and referral detection.

/// Direct and SOCKS5 connectors
pub mod dialer;

/// Static server table and subject classification
pub mod servers;

/// Referral marker detection
pub mod referral;

/// One query/response exchange
pub mod transport;
