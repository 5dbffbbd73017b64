//! Referral marker detection.
//!
//! Registries point at a more specific server with one of a handful of
//! `key: value` lines. Thin registries (`.com`, `.net`) use `Registrar WHOIS
//! Server`, ARIN uses `ReferralServer`, and IANA uses `refer` with `whois` as
//! a weaker hint.

use crate::protocols::servers::same_server;

/// Keys that name the next server outright. Compared case-insensitively.
const PRIMARY_KEYS: &[&str] = &[
    "registrar whois server",
    "whois server",
    "referralserver",
    "refer",
];

/// Only used when no primary key is present.
const FALLBACK_KEYS: &[&str] = &["whois"];

/// Scan a response for a referral marker and return the referred server.
///
/// The first primary marker with a usable value wins. A `whois:` line is
/// only returned when no primary marker exists.
///
/// ```text
/// refer:        whois.verisign-grs.com
/// Registrar WHOIS Server: whois.markmonitor.com
/// ReferralServer:  rwhois://rwhois.example.net:4321/
/// ```
pub fn find_referral(response: &str) -> Option<String> {
    let mut fallback = None;

    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();

        if PRIMARY_KEYS.contains(&key.as_str()) {
            if let Some(server) = normalize_referral(value) {
                return Some(server);
            }
        } else if fallback.is_none() && FALLBACK_KEYS.contains(&key.as_str()) {
            fallback = normalize_referral(value);
        }
    }

    fallback
}

/// Turn a marker value into `host` or `host:port`.
///
/// Returns `None` for empty values and web URLs, which can't be queried
/// over port 43.
pub fn normalize_referral(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let lower = value.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return None;
    }

    let without_scheme = ["whois://", "rwhois://"]
        .iter()
        .find_map(|scheme| lower.strip_prefix(scheme))
        .unwrap_or(&lower);

    let host = without_scheme
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .trim_end_matches('.');

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Referral worth following: present, and not the server just queried.
pub fn next_hop(response: &str, queried: &str) -> Option<String> {
    find_referral(response).filter(|referred| !same_server(referred, queried))
}
