//! Static WHOIS server table and subject classification.
//!
//! The tables are built once on first use and never written afterwards, so
//! lookups are plain reads that any number of concurrent resolutions can
//! share without locking.

use crate::types::SubjectKind;
use cidr::IpCidr;
use regex::Regex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::ops::RangeInclusive;

/// Standard WHOIS port (RFC 3912).
pub const DEFAULT_WHOIS_PORT: u16 = 43;

/// Root server; unknown suffixes go here and are expected to be referred on.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Designated server for ASNs outside the range table.
pub const ASN_WHOIS_SERVER: &str = "whois.arin.net";

/// Designated server for addresses outside the block table.
pub const IP_WHOIS_SERVER: &str = "whois.arin.net";

const RIPE: &str = "whois.ripe.net";
const APNIC: &str = "whois.apnic.net";
const ARIN: &str = "whois.arin.net";
const LACNIC: &str = "whois.lacnic.net";
const AFRINIC: &str = "whois.afrinic.net";

/// The server chosen for a subject and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSelection {
    pub server: &'static str,
    pub kind: SubjectKind,
}

lazy_static::lazy_static! {
    static ref ASN_PATTERN: Regex = Regex::new(r"(?i)^(?:as)?(\d+)$")
        .expect("ASN pattern is valid");

    static ref TLD_SERVERS: HashMap<&'static str, &'static str> = build_tld_table();

    static ref IP_BLOCKS: Vec<(IpCidr, &'static str)> = IP_BLOCK_TABLE
        .iter()
        .filter_map(|(block, server)| block.parse::<IpCidr>().ok().map(|c| (c, *server)))
        .collect();
}

/// Suffix -> server. Compound suffixes sit alongside their parents and win
/// by being longer.
const TLD_TABLE: &[(&str, &str)] = &[
    // Generic TLDs
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.nic.info"),
    ("biz", "whois.nic.biz"),
    ("name", "whois.nic.name"),
    ("mobi", "whois.nic.mobi"),
    ("pro", "whois.nic.pro"),
    ("aero", "whois.aero"),
    ("asia", "whois.nic.asia"),
    ("cat", "whois.nic.cat"),
    ("coop", "whois.nic.coop"),
    ("edu", "whois.educause.edu"),
    ("gov", "whois.dotgov.gov"),
    ("int", "whois.iana.org"),
    ("jobs", "whois.nic.jobs"),
    ("museum", "whois.nic.museum"),
    ("tel", "whois.nic.tel"),
    ("travel", "whois.nic.travel"),
    ("arpa", "whois.iana.org"),
    // New gTLDs
    ("app", "whois.nic.google"),
    ("dev", "whois.nic.google"),
    ("page", "whois.nic.google"),
    ("blog", "whois.nic.blog"),
    ("cloud", "whois.nic.cloud"),
    ("xyz", "whois.nic.xyz"),
    ("online", "whois.nic.online"),
    ("site", "whois.nic.site"),
    ("tech", "whois.nic.tech"),
    ("store", "whois.nic.store"),
    ("shop", "whois.nic.shop"),
    ("top", "whois.nic.top"),
    ("club", "whois.nic.club"),
    ("vip", "whois.nic.vip"),
    ("icu", "whois.nic.icu"),
    ("wiki", "whois.nic.wiki"),
    ("email", "whois.nic.email"),
    ("digital", "whois.nic.digital"),
    ("network", "whois.nic.network"),
    ("zone", "whois.nic.zone"),
    ("live", "whois.nic.live"),
    ("world", "whois.nic.world"),
    // Country code TLDs
    ("ai", "whois.nic.ai"),
    ("io", "whois.nic.io"),
    ("co", "whois.nic.co"),
    ("me", "whois.nic.me"),
    ("tv", "whois.nic.tv"),
    ("cc", "ccwhois.verisign-grs.com"),
    ("us", "whois.nic.us"),
    ("uk", "whois.nic.uk"),
    ("de", "whois.denic.de"),
    ("fr", "whois.nic.fr"),
    ("nl", "whois.domain-registry.nl"),
    ("be", "whois.dns.be"),
    ("eu", "whois.eu"),
    ("it", "whois.nic.it"),
    ("es", "whois.nic.es"),
    ("ch", "whois.nic.ch"),
    ("li", "whois.nic.li"),
    ("at", "whois.nic.at"),
    ("se", "whois.iis.se"),
    ("nu", "whois.iis.nu"),
    ("no", "whois.norid.no"),
    ("dk", "whois.punktum.dk"),
    ("fi", "whois.fi"),
    ("pl", "whois.dns.pl"),
    ("cz", "whois.nic.cz"),
    ("ru", "whois.tcinet.ru"),
    ("su", "whois.tcinet.ru"),
    ("ca", "whois.cira.ca"),
    ("au", "whois.auda.org.au"),
    ("nz", "whois.irs.net.nz"),
    ("jp", "whois.jprs.jp"),
    ("kr", "whois.kr"),
    ("cn", "whois.cnnic.cn"),
    ("tw", "whois.twnic.net.tw"),
    ("hk", "whois.hkirc.hk"),
    ("sg", "whois.sgnic.sg"),
    ("in", "whois.registry.in"),
    ("br", "whois.registro.br"),
    ("mx", "whois.mx"),
    ("ar", "whois.nic.ar"),
    ("za", "whois.registry.net.za"),
    ("gg", "whois.gg"),
    ("je", "whois.je"),
    ("is", "whois.isnic.is"),
    ("ie", "whois.weare.ie"),
    ("pt", "whois.dns.pt"),
    ("ws", "whois.website.ws"),
    // Compound second-level suffixes
    ("co.uk", "whois.nic.uk"),
    ("org.uk", "whois.nic.uk"),
    ("ac.uk", "whois.nic.uk"),
    ("com.au", "whois.auda.org.au"),
    ("net.au", "whois.auda.org.au"),
    ("org.au", "whois.auda.org.au"),
    ("com.cn", "whois.cnnic.cn"),
    ("net.cn", "whois.cnnic.cn"),
    ("co.jp", "whois.jprs.jp"),
    ("ne.jp", "whois.jprs.jp"),
    ("co.nz", "whois.irs.net.nz"),
    ("com.br", "whois.registro.br"),
    ("co.za", "whois.registry.net.za"),
    ("co.in", "whois.registry.in"),
    ("br.com", "whois.centralnic.com"),
    ("uk.com", "whois.centralnic.com"),
    ("us.com", "whois.centralnic.com"),
    ("eu.com", "whois.centralnic.com"),
    ("uk.net", "whois.centralnic.com"),
    ("eu.org", "whois.eu.org"),
];

/// RIR-delegated address blocks.
const IP_BLOCK_TABLE: &[(&str, &str)] = &[
    // IPv4 /8s
    ("1.0.0.0/8", APNIC),
    ("2.0.0.0/8", RIPE),
    ("5.0.0.0/8", RIPE),
    ("14.0.0.0/8", APNIC),
    ("27.0.0.0/8", APNIC),
    ("31.0.0.0/8", RIPE),
    ("36.0.0.0/8", APNIC),
    ("37.0.0.0/8", RIPE),
    ("41.0.0.0/8", AFRINIC),
    ("42.0.0.0/8", APNIC),
    ("46.0.0.0/8", RIPE),
    ("49.0.0.0/8", APNIC),
    ("58.0.0.0/7", APNIC),
    ("60.0.0.0/7", APNIC),
    ("62.0.0.0/8", RIPE),
    ("77.0.0.0/8", RIPE),
    ("78.0.0.0/7", RIPE),
    ("80.0.0.0/4", RIPE),
    ("101.0.0.0/8", APNIC),
    ("102.0.0.0/8", AFRINIC),
    ("105.0.0.0/8", AFRINIC),
    ("109.0.0.0/8", RIPE),
    ("110.0.0.0/7", APNIC),
    ("112.0.0.0/5", APNIC),
    ("120.0.0.0/6", APNIC),
    ("124.0.0.0/7", APNIC),
    ("126.0.0.0/8", APNIC),
    ("154.0.0.0/8", AFRINIC),
    ("175.0.0.0/8", APNIC),
    ("176.0.0.0/8", RIPE),
    ("177.0.0.0/8", LACNIC),
    ("178.0.0.0/8", RIPE),
    ("179.0.0.0/8", LACNIC),
    ("180.0.0.0/8", APNIC),
    ("181.0.0.0/8", LACNIC),
    ("182.0.0.0/7", APNIC),
    ("185.0.0.0/8", RIPE),
    ("186.0.0.0/7", LACNIC),
    ("188.0.0.0/8", RIPE),
    ("189.0.0.0/8", LACNIC),
    ("190.0.0.0/7", LACNIC),
    ("193.0.0.0/8", RIPE),
    ("194.0.0.0/7", RIPE),
    ("196.0.0.0/7", AFRINIC),
    ("200.0.0.0/7", LACNIC),
    ("202.0.0.0/7", APNIC),
    ("210.0.0.0/7", APNIC),
    ("212.0.0.0/7", RIPE),
    ("217.0.0.0/8", RIPE),
    ("218.0.0.0/7", APNIC),
    ("220.0.0.0/6", APNIC),
    // IPv6
    ("2001:200::/23", APNIC),
    ("2001:400::/23", ARIN),
    ("2001:600::/23", RIPE),
    ("2001:800::/22", RIPE),
    ("2001:1200::/23", LACNIC),
    ("2001:4200::/23", AFRINIC),
    ("2400::/12", APNIC),
    ("2600::/12", ARIN),
    ("2800::/12", LACNIC),
    ("2a00::/12", RIPE),
    ("2c00::/12", AFRINIC),
];

/// Initial 32-bit ASN blocks per RIR.
const ASN_RANGE_TABLE: &[(RangeInclusive<u32>, &str)] = &[
    (131072..=132095, APNIC),
    (196608..=197631, RIPE),
    (262144..=263167, LACNIC),
    (327680..=328703, AFRINIC),
    (393216..=394239, ARIN),
];

fn build_tld_table() -> HashMap<&'static str, &'static str> {
    TLD_TABLE.iter().copied().collect()
}

/// Classify a subject as ASN, IP or domain.
///
/// No validation happens here; anything that isn't recognisably an ASN or
/// an IP is treated as a domain name.
pub fn classify_subject(subject: &str) -> SubjectKind {
    let subject = subject.trim();
    if ASN_PATTERN.is_match(subject) {
        SubjectKind::Asn
    } else if parse_ip(subject).is_some() {
        SubjectKind::Ip
    } else {
        SubjectKind::Domain
    }
}

/// Parse an IP literal, or a CIDR prefix reduced to its network address.
fn parse_ip(subject: &str) -> Option<IpAddr> {
    if let Ok(ip) = subject.parse::<IpAddr>() {
        return Some(ip);
    }
    subject
        .parse::<IpCidr>()
        .ok()
        .map(|cidr| cidr.first_address())
}

/// Choose the default server for a subject.
///
/// # Examples
///
/// ```rust
/// use whois_lib::{select_server, SubjectKind};
///
/// let selection = select_server("example.com");
/// assert_eq!(selection.server, "whois.verisign-grs.com");
/// assert_eq!(selection.kind, SubjectKind::Domain);
/// ```
pub fn select_server(subject: &str) -> ServerSelection {
    let subject = subject.trim();
    let kind = classify_subject(subject);

    let server = match kind {
        SubjectKind::Asn => asn_server(subject),
        SubjectKind::Ip => parse_ip(subject)
            .map(ip_server)
            .unwrap_or(IP_WHOIS_SERVER),
        SubjectKind::Domain => domain_server(subject),
    };

    ServerSelection { server, kind }
}

fn asn_server(subject: &str) -> &'static str {
    let number = ASN_PATTERN
        .captures(subject)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    match number {
        Some(n) => ASN_RANGE_TABLE
            .iter()
            .find(|(range, _)| range.contains(&n))
            .map(|(_, server)| *server)
            .unwrap_or(ASN_WHOIS_SERVER),
        None => ASN_WHOIS_SERVER,
    }
}

fn ip_server(ip: IpAddr) -> &'static str {
    IP_BLOCKS
        .iter()
        .find(|(block, _)| block.contains(&ip))
        .map(|(_, server)| *server)
        .unwrap_or(IP_WHOIS_SERVER)
}

fn domain_server(domain: &str) -> &'static str {
    let domain = domain.trim_end_matches('.').to_lowercase();
    if !domain.contains('.') {
        // Bare TLDs and registry handles are answered by the root
        return IANA_WHOIS_SERVER;
    }

    // Longest matching suffix wins: try "a.b.c", then "b.c", then "c"
    let labels: Vec<&str> = domain.split('.').collect();
    (1..labels.len())
        .filter_map(|start| whois_server_for_tld(&labels[start..].join(".")))
        .next()
        .unwrap_or(IANA_WHOIS_SERVER)
}

/// Look up the server for a suffix such as `com` or `co.uk`.
pub fn whois_server_for_tld(suffix: &str) -> Option<&'static str> {
    let suffix = suffix.trim_start_matches('.').to_lowercase();
    TLD_SERVERS.get(suffix.as_str()).copied()
}

/// Every suffix in the static table, sorted.
pub fn known_suffixes() -> Vec<&'static str> {
    let mut suffixes: Vec<&'static str> = TLD_SERVERS.keys().copied().collect();
    suffixes.sort_unstable();
    suffixes
}

/// Append the default port when `server` has none.
pub fn server_address(server: &str) -> String {
    let server = server.trim();
    if let Some(rest) = server.strip_prefix('[') {
        // Bracketed IPv6, with or without port
        return if rest.contains("]:") {
            server.to_string()
        } else {
            format!("{}:{}", server, DEFAULT_WHOIS_PORT)
        };
    }
    if server.parse::<std::net::Ipv6Addr>().is_ok() {
        return format!("[{}]:{}", server, DEFAULT_WHOIS_PORT);
    }
    match server.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            server.to_string()
        }
        _ => format!("{}:{}", server, DEFAULT_WHOIS_PORT),
    }
}

/// Compare two servers, ignoring case and an implied default port.
pub fn same_server(a: &str, b: &str) -> bool {
    server_address(a).eq_ignore_ascii_case(&server_address(b))
}
