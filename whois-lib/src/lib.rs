//! # Whois Library
//!
//! A WHOIS resolution engine for domain names, IP addresses and autonomous
//! system numbers.
//!
//! Given a subject, the engine picks a server from a static table (or uses
//! the one you name), performs the RFC 3912 exchange, and follows at most
//! one referral to a more specific server. The raw text can then be parsed
//! into a best-effort structured [`Record`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_lib::{parse_record, WhoisClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WhoisClient::new();
//!     let result = client.lookup("example.com").await?;
//!
//!     println!("answered by {:?}", result.servers);
//!     let record = parse_record(&result.text)?;
//!     println!("expires: {:?}", record.expiration_date);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Server selection**: TLD suffixes, RIR address blocks and ASN ranges
//! - **One-hop referrals**: `Registrar WHOIS Server`, `ReferralServer`, `refer`
//! - **Deadlines and cancellation** on every network phase
//! - **SOCKS5 proxies** through `ALL_PROXY` or an explicit dialer
//! - **Record parsing** into dates, contacts, name servers and status codes

// Re-export main public API types and functions
// This makes them available as whois_lib::TypeName
pub use client::WhoisClient;
pub use config::{
    load_env_config, resolve_dialer, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    LoggingConfig, ProxyConfig,
};
pub use error::WhoisError;
pub use parser::{parse_datetime, parse_record, Contact, Record};
pub use protocols::dialer::{
    dialer_from_env, dialer_from_url, BoxedStream, Dialer, DirectDialer, Socks5Dialer,
    WhoisStream,
};
pub use protocols::referral::find_referral;
pub use protocols::servers::{
    classify_subject, known_suffixes, select_server, whois_server_for_tld, ServerSelection,
    ASN_WHOIS_SERVER, DEFAULT_WHOIS_PORT, IANA_WHOIS_SERVER, IP_WHOIS_SERVER,
};
pub use protocols::transport::{query_server, DEFAULT_TIMEOUT};
pub use types::{Query, RawResponse, ResolutionResult, SubjectKind};
pub use utils::{dedup_subjects, validate_subject};

// Internal modules - these are not part of the public API
mod client;
mod config;
mod error;
mod parser;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhoisError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
