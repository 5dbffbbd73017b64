//! Best-effort parsing of WHOIS text into a structured record.
//!
//! Registries don't share a format, so this module works on the common
//! denominator: `key: value` lines, a known set of key spellings per field,
//! and indented continuation lines under an empty header (the `.uk` style).
//! Fields that can't be found are simply absent.
//!
//! Parsing is pure. The same text always yields the same record.

use crate::error::WhoisError;
use crate::utils::split_domain;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person, organisation or registrar attached to a domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_url: Option<String>,
}

impl Contact {
    /// No field was found.
    pub fn is_empty(&self) -> bool {
        *self == Contact::default()
    }
}

/// Structured view of a WHOIS response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Lower-cased domain name
    pub domain: String,

    /// First label of the domain ("example" for "example.co.uk")
    pub name: String,

    /// Everything after the first label ("co.uk")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_server: Option<String>,

    /// EPP status codes, first token of each status line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date_in_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date_in_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date_in_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrant: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Contact>,
}

/// Lines that mean "there is no such object".
const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match for",
    "no match!!",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "no matching record",
    "no object found",
    "object does not exist",
    "the queried object does not exist",
    "domain name not found",
    "this domain name has not been registered",
    "status: free",
    "status: available",
    "domain status: no object found",
];

/// Lines that mean the name is held back by the registry.
const RESERVED_PATTERNS: &[&str] = &[
    "reserved domain name",
    "this domain is reserved",
    "the domain is reserved",
    "domain is reserved",
    "status: reserved",
];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "quota exceeded",
    "query rate exceeded",
    "you have exceeded",
    "limit exceeded",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Registrar,
    Registrant,
    Administrative,
    Technical,
    Billing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactField {
    Id,
    Name,
    Organization,
    Street,
    City,
    Province,
    PostalCode,
    Country,
    Phone,
    Fax,
    Email,
    ReferralUrl,
}

/// Where a key's value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    DomainName,
    /// Bare `domain:` keys; used only when no `Domain Name` line exists
    DomainFallback,
    DomainId,
    WhoisServer,
    Status,
    NameServer,
    Dnssec,
    Created,
    Updated,
    Expiration,
    Contact(Role, ContactField),
}

impl Field {
    fn is_list(self) -> bool {
        matches!(self, Field::Status | Field::NameServer)
    }
}

/// Parse raw WHOIS text into a [`Record`].
///
/// When the text is a referral chain (first server's answer followed by the
/// referred server's), single-valued fields take the first value seen and
/// list fields collect from every part.
///
/// # Errors
///
/// `ParseError` when the text is empty, when the registry reports the
/// object as not found, reserved or rate-limited, or when no domain name
/// can be found (IP and ASN answers land here).
///
/// # Example
///
/// ```rust
/// use whois_lib::parse_record;
///
/// let record = parse_record("Domain Name: EXAMPLE.COM\nName Server: A.IANA-SERVERS.NET\n").unwrap();
/// assert_eq!(record.domain, "example.com");
/// assert_eq!(record.name_servers, vec!["a.iana-servers.net"]);
/// ```
pub fn parse_record(text: &str) -> Result<Record, WhoisError> {
    if text.trim().is_empty() {
        return Err(WhoisError::parse("whois text is empty"));
    }

    check_registry_notices(text)?;

    let mut registry = RecordBuilder::default();
    // IANA's root zone entry for the TLD, when the chain starts at IANA
    let mut root = RecordBuilder::default();
    let mut in_root = false;
    let mut pending: Option<Field> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            pending = None;
            continue;
        }
        if is_comment(line) {
            if is_root_banner(line) {
                in_root = true;
                pending = None;
            }
            continue;
        }

        let indented = raw_line.starts_with([' ', '\t']);
        let pair = line.split_once(':').filter(|(key, _)| !looks_like_value(key));
        let field = pair.and_then(|(key, _)| lookup_field(&normalize_key(key)));

        if field == Some(Field::DomainName) {
            in_root = false;
        }
        let builder = if in_root { &mut root } else { &mut registry };

        match pair {
            Some((key, value)) => {
                let value = value.trim();
                match (field, pending) {
                    (Some(field), _) => {
                        pending = None;
                        if value.is_empty() {
                            pending = Some(field);
                        } else {
                            builder.apply(field, value);
                        }
                    }
                    // "ns2.example.net  192.0.2.1  2001:db8::1" under a list header
                    (None, Some(list)) if indented && list.is_list() => {
                        builder.apply(list, line);
                    }
                    (None, _) => {
                        pending = None;
                        if in_root && is_root_source(key, value) {
                            in_root = false;
                        }
                    }
                }
            }
            None => {
                // Continuation under an empty header
                if let (true, Some(field)) = (indented, pending) {
                    builder.apply(field, line);
                    if !field.is_list() {
                        pending = None;
                    }
                }
            }
        }
    }

    registry.or_root(root).build()
}

/// `% IANA WHOIS server` opens IANA's answer in a referral chain.
fn is_root_banner(line: &str) -> bool {
    line.trim_start_matches('%')
        .trim()
        .to_lowercase()
        .starts_with("iana whois server")
}

/// `source: IANA` is the last line of IANA's answer.
fn is_root_source(key: &str, value: &str) -> bool {
    key.trim().eq_ignore_ascii_case("source") && value.eq_ignore_ascii_case("iana")
}

/// Fail on registry notices that mean there's no record to parse.
fn check_registry_notices(text: &str) -> Result<(), WhoisError> {
    let lower = text.to_lowercase();

    for line in lower.lines() {
        let line = line.trim_start_matches(['%', '#', ' ', '\t']).trim();
        if NOT_FOUND_PATTERNS.iter().any(|p| line.starts_with(p)) {
            return Err(WhoisError::parse("domain is not found"));
        }
        if RESERVED_PATTERNS.iter().any(|p| line.starts_with(p)) {
            return Err(WhoisError::parse("domain is reserved"));
        }
    }

    if RATE_LIMIT_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Err(WhoisError::parse("query was rate limited by the server"));
    }

    Ok(())
}

fn is_comment(line: &str) -> bool {
    line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>")
}

/// A "key" that is really a value with a colon in it, such as an IPv6 glue
/// address or a URL under a continuation header.
fn looks_like_value(key: &str) -> bool {
    let key = key.trim();
    key.is_empty()
        || key.contains("//")
        || key.eq_ignore_ascii_case("http")
        || key.eq_ignore_ascii_case("https")
        || key.chars().all(|c| c.is_ascii_hexdigit())
}

/// Lower-case and collapse runs of whitespace.
fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn lookup_field(key: &str) -> Option<Field> {
    use ContactField as C;
    use Role::Registrar;

    let field = match key {
        "domain name" | "domain_name" | "domainname" => Field::DomainName,
        "domain" => Field::DomainFallback,
        "registry domain id" | "domain id" | "roid" => Field::DomainId,
        "registrar whois server" | "whois server" | "whois" => Field::WhoisServer,
        "domain status" | "status" | "state" => Field::Status,
        "name server" | "name servers" | "nameserver" | "nameservers" | "nserver"
        | "name server(s)" => Field::NameServer,
        "dnssec" | "dnssec signed" => Field::Dnssec,
        "creation date" | "created" | "created on" | "created date" | "registered"
        | "registered on" | "registration date" | "registration time"
        | "domain registration date" | "domain create date" => Field::Created,
        "updated date" | "updated" | "last updated" | "last updated on" | "last modified"
        | "changed" | "modified" | "domain last updated date" => Field::Updated,
        "registry expiry date" | "registrar registration expiration date"
        | "expiration date" | "expiry date" | "expires" | "expires on" | "expire date"
        | "paid-till" | "expiration time" | "domain expiration date" => Field::Expiration,
        "registrar" | "sponsoring registrar" | "registrar name" => {
            Field::Contact(Registrar, C::Name)
        }
        "registrar iana id" | "sponsoring registrar iana id" => Field::Contact(Registrar, C::Id),
        "registrar url" | "referral url" => Field::Contact(Registrar, C::ReferralUrl),
        "registrar abuse contact email" => Field::Contact(Registrar, C::Email),
        "registrar abuse contact phone" => Field::Contact(Registrar, C::Phone),
        _ => return lookup_contact_field(key),
    };

    Some(field)
}

/// `Registrant Name`, `Admin Email`, `Registry Tech ID` and friends.
fn lookup_contact_field(key: &str) -> Option<Field> {
    let key = key.strip_prefix("registry ").unwrap_or(key);

    let (role, rest) = [
        ("registrant", Role::Registrant),
        ("administrative", Role::Administrative),
        ("admin", Role::Administrative),
        ("technical", Role::Technical),
        ("tech", Role::Technical),
        ("billing", Role::Billing),
    ]
    .iter()
    .find_map(|(prefix, role)| key.strip_prefix(prefix).map(|rest| (*role, rest)))?;

    let rest = rest.trim();
    let rest = rest.strip_prefix("contact").unwrap_or(rest).trim();

    let field = match rest {
        "" | "name" => ContactField::Name,
        "id" => ContactField::Id,
        "organization" | "organisation" | "org" => ContactField::Organization,
        "street" | "address" => ContactField::Street,
        "city" => ContactField::City,
        "state/province" | "state" | "province" => ContactField::Province,
        "postal code" | "postcode" | "zip code" => ContactField::PostalCode,
        "country" | "country code" => ContactField::Country,
        "phone" => ContactField::Phone,
        "fax" => ContactField::Fax,
        "email" | "e-mail" => ContactField::Email,
        _ => return None,
    };

    Some(Field::Contact(role, field))
}

#[derive(Default)]
struct RecordBuilder {
    domain: Option<String>,
    domain_fallback: Option<String>,
    domain_id: Option<String>,
    whois_server: Option<String>,
    status: Vec<String>,
    name_servers: Vec<String>,
    dnssec: Option<bool>,
    created: Option<String>,
    updated: Option<String>,
    expiration: Option<String>,
    registrar: Contact,
    registrant: Contact,
    administrative: Contact,
    technical: Contact,
    billing: Contact,
}

impl RecordBuilder {
    /// Fill gaps from IANA's TLD entry; the registry's own values win.
    fn or_root(self, root: RecordBuilder) -> RecordBuilder {
        RecordBuilder {
            domain: self.domain.or(root.domain),
            domain_fallback: self.domain_fallback.or(root.domain_fallback),
            domain_id: self.domain_id.or(root.domain_id),
            whois_server: self.whois_server.or(root.whois_server),
            status: or_list(self.status, root.status),
            name_servers: or_list(self.name_servers, root.name_servers),
            dnssec: self.dnssec.or(root.dnssec),
            created: self.created.or(root.created),
            updated: self.updated.or(root.updated),
            expiration: self.expiration.or(root.expiration),
            registrar: or_contact(self.registrar, root.registrar),
            registrant: or_contact(self.registrant, root.registrant),
            administrative: or_contact(self.administrative, root.administrative),
            technical: or_contact(self.technical, root.technical),
            billing: or_contact(self.billing, root.billing),
        }
    }

    fn apply(&mut self, field: Field, value: &str) {
        match field {
            Field::DomainName => set_first(&mut self.domain, first_token(value)),
            Field::DomainFallback => set_first(&mut self.domain_fallback, first_token(value)),
            Field::DomainId => set_first(&mut self.domain_id, value),
            Field::WhoisServer => {
                let server = value.trim_end_matches('.').to_lowercase();
                set_first(&mut self.whois_server, &server)
            }
            Field::Status => {
                let status = first_token(value);
                push_unique(&mut self.status, status, false);
            }
            Field::NameServer => {
                let host = first_token(value).trim_end_matches('.').to_lowercase();
                push_unique(&mut self.name_servers, &host, true);
            }
            Field::Dnssec => {
                if self.dnssec.is_none() {
                    self.dnssec = Some(parse_dnssec(value));
                }
            }
            Field::Created => set_first(&mut self.created, value),
            Field::Updated => set_first(&mut self.updated, value),
            Field::Expiration => set_first(&mut self.expiration, value),
            Field::Contact(role, field) => {
                let contact = match role {
                    Role::Registrar => &mut self.registrar,
                    Role::Registrant => &mut self.registrant,
                    Role::Administrative => &mut self.administrative,
                    Role::Technical => &mut self.technical,
                    Role::Billing => &mut self.billing,
                };
                apply_contact(contact, field, value);
            }
        }
    }

    fn build(self) -> Result<Record, WhoisError> {
        let domain = self
            .domain
            .or(self.domain_fallback)
            .map(|d| d.trim_end_matches('.').to_lowercase())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| WhoisError::parse("no domain name field found"))?;

        let (name, extension) = split_domain(&domain);

        Ok(Record {
            created_date_in_time: self.created.as_deref().and_then(parse_datetime),
            updated_date_in_time: self.updated.as_deref().and_then(parse_datetime),
            expiration_date_in_time: self.expiration.as_deref().and_then(parse_datetime),
            domain,
            name,
            extension,
            domain_id: self.domain_id,
            whois_server: self.whois_server,
            status: self.status,
            name_servers: self.name_servers,
            dnssec: self.dnssec,
            created_date: self.created,
            updated_date: self.updated,
            expiration_date: self.expiration,
            registrar: non_empty(self.registrar),
            registrant: non_empty(self.registrant),
            administrative: non_empty(self.administrative),
            technical: non_empty(self.technical),
            billing: non_empty(self.billing),
        })
    }
}

fn apply_contact(contact: &mut Contact, field: ContactField, value: &str) {
    let slot = match field {
        ContactField::Id => &mut contact.id,
        ContactField::Name => &mut contact.name,
        ContactField::Organization => &mut contact.organization,
        ContactField::Street => {
            // Multi-line addresses repeat the key
            match &mut contact.street {
                Some(street) if !street.contains(value) => {
                    street.push_str(", ");
                    street.push_str(value);
                }
                Some(_) => {}
                None => contact.street = Some(value.to_string()),
            }
            return;
        }
        ContactField::City => &mut contact.city,
        ContactField::Province => &mut contact.province,
        ContactField::PostalCode => &mut contact.postal_code,
        ContactField::Country => &mut contact.country,
        ContactField::Phone => &mut contact.phone,
        ContactField::Fax => &mut contact.fax,
        ContactField::Email => &mut contact.email,
        ContactField::ReferralUrl => &mut contact.referral_url,
    };
    set_first(slot, value);
}

fn set_first(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn push_unique(list: &mut Vec<String>, value: &str, lowercase: bool) {
    if value.is_empty() {
        return;
    }
    if list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        return;
    }
    if lowercase {
        list.push(value.to_lowercase());
    } else {
        list.push(value.to_string());
    }
}

fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or_default()
}

fn or_list(own: Vec<String>, root: Vec<String>) -> Vec<String> {
    if own.is_empty() {
        root
    } else {
        own
    }
}

fn or_contact(own: Contact, root: Contact) -> Contact {
    if own.is_empty() {
        root
    } else {
        own
    }
}

fn non_empty(contact: Contact) -> Option<Contact> {
    if contact.is_empty() {
        None
    } else {
        Some(contact)
    }
}

fn parse_dnssec(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value.starts_with("signed") || value == "yes" || value == "true" || value == "active"
}

/// Normalise the date formats registries actually use.
///
/// Values without an offset are taken as UTC. Trailing zone labels such as
/// `UTC` or `(JST)` are dropped.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const OFFSET_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
    ];
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let stripped = strip_zone_label(value);

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%d.%m.%Y %H:%M:%S",
        "%d-%b-%Y %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, format) {
            return Some(naive.and_utc());
        }
    }

    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y", "%d/%m/%Y", "%Y%m%d",
    ];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(stripped, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

fn strip_zone_label(value: &str) -> &str {
    let value = match value.rfind(" (") {
        Some(idx) if value.ends_with(')') => &value[..idx],
        _ => value,
    };
    value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix(" GMT"))
        .or_else(|| value.strip_suffix(" Z"))
        .unwrap_or(value)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const VERISIGN_COM: &str = "   Domain Name: EXAMPLE.COM\r
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r
   Registrar WHOIS Server: whois.iana.org\r
   Registrar URL: http://res-dom.iana.org\r
   Updated Date: 2024-08-14T07:01:34Z\r
   Creation Date: 1995-08-14T04:00:00Z\r
   Registry Expiry Date: 2025-08-13T04:00:00Z\r
   Registrar: RESERVED-Internet Assigned Numbers Authority\r
   Registrar IANA ID: 376\r
   Registrar Abuse Contact Email:\r
   Registrar Abuse Contact Phone:\r
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r
   Domain Status: clientUpdateProhibited https://icann.org/epp#clientUpdateProhibited\r
   Name Server: A.IANA-SERVERS.NET\r
   Name Server: B.IANA-SERVERS.NET\r
   DNSSEC: signedDelegation\r
   DNSSEC DS Data: 370 13 2 BE74359954660069D5C63D200C39F5603827D7DD02B56F120EE9F3A86764247C\r
   URL of the ICANN Whois Inaccuracy Complaint Form: https://www.icann.org/wicf/\r
>>> Last update of whois database: 2024-10-01T12:00:00Z <<<\r
\r
NOTICE: The expiration date displayed in this record is the date the\r
registrar's sponsorship of the domain name registration in the registry is\r
currently set to expire.\r
";

    const NOMINET_UK: &str = "
    Domain name:
        bbc.co.uk

    Registrant:
        British Broadcasting Corporation

    Registrar:
        Markmonitor Inc. t/a MarkMonitor Inc. [Tag = MARKMONITOR]
        URL: http://www.markmonitor.com

    Relevant dates:
        Registered on: before Aug-1996
        Expiry date:  13-Dec-2025
        Last updated:  11-Nov-2024

    Name servers:
        ns1.bbc.co.uk             212.58.241.66
        ns2.bbc.co.uk             212.58.241.67  2a04:4e40:8000::1
        dns0.bbc.co.uk

    WHOIS lookup made at 10:00:00 01-Oct-2024
";

    #[test]
    fn test_parse_verisign_record() {
        let record = parse_record(VERISIGN_COM).unwrap();

        assert_eq!(record.domain, "example.com");
        assert_eq!(record.name, "example");
        assert_eq!(record.extension.as_deref(), Some("com"));
        assert_eq!(record.domain_id.as_deref(), Some("2336799_DOMAIN_COM-VRSN"));
        assert_eq!(record.whois_server.as_deref(), Some("whois.iana.org"));
        assert_eq!(
            record.status,
            vec![
                "clientDeleteProhibited",
                "clientTransferProhibited",
                "clientUpdateProhibited"
            ]
        );
        assert_eq!(
            record.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(record.dnssec, Some(true));

        let registrar = record.registrar.unwrap();
        assert_eq!(
            registrar.name.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(registrar.id.as_deref(), Some("376"));
        assert_eq!(registrar.referral_url.as_deref(), Some("http://res-dom.iana.org"));
        assert_eq!(registrar.email, None);
    }

    #[test]
    fn test_dates_are_normalized() {
        let record = parse_record(VERISIGN_COM).unwrap();

        assert_eq!(record.created_date.as_deref(), Some("1995-08-14T04:00:00Z"));
        let created = record.created_date_in_time.unwrap();
        assert_eq!((created.year(), created.month(), created.day()), (1995, 8, 14));
        assert_eq!(created.hour(), 4);

        let expires = record.expiration_date_in_time.unwrap();
        assert_eq!(expires.year(), 2025);
        assert!(record.updated_date_in_time.is_some());
    }

    #[test]
    fn test_parse_block_format() {
        let record = parse_record(NOMINET_UK).unwrap();

        assert_eq!(record.domain, "bbc.co.uk");
        assert_eq!(record.extension.as_deref(), Some("co.uk"));
        assert_eq!(
            record.name_servers,
            vec!["ns1.bbc.co.uk", "ns2.bbc.co.uk", "dns0.bbc.co.uk"]
        );
        assert_eq!(
            record.registrant.unwrap().name.as_deref(),
            Some("British Broadcasting Corporation")
        );
        assert_eq!(record.expiration_date.as_deref(), Some("13-Dec-2025"));
        assert!(record.expiration_date_in_time.is_some());
        // "before Aug-1996" is kept as text but has no timestamp
        assert_eq!(record.created_date.as_deref(), Some("before Aug-1996"));
        assert!(record.created_date_in_time.is_none());
    }

    #[test]
    fn test_referral_chain_merges_lists_and_keeps_first_scalars() {
        let chain = format!(
            "{}Domain Name: example.com\nRegistrar: Example Registrar, Inc.\nName Server: ns3.example.net\nRegistrant Name: Jane Doe\nRegistrant Street: 1 Main St\nRegistrant Street: Suite 2\nAdmin Email: admin@example.com\nTech Country: US\n",
            VERISIGN_COM
        );
        let record = parse_record(&chain).unwrap();

        assert_eq!(
            record.registrar.as_ref().unwrap().name.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(record.name_servers.len(), 3);

        let registrant = record.registrant.unwrap();
        assert_eq!(registrant.name.as_deref(), Some("Jane Doe"));
        assert_eq!(registrant.street.as_deref(), Some("1 Main St, Suite 2"));
        assert_eq!(
            record.administrative.unwrap().email.as_deref(),
            Some("admin@example.com")
        );
        assert_eq!(record.technical.unwrap().country.as_deref(), Some("US"));
        assert!(record.billing.is_none());
    }

    const IANA_NINJA: &str = "% IANA WHOIS server\n% for more information on IANA, visit http://www.iana.org\n% This query returned 1 object\n\nrefer:        whois.nic.ninja\n\ndomain:       NINJA\n\norganisation: Identity Digital Limited\n\nnserver:      V0N0.NIC.NINJA 65.22.20.39\nwhois:        whois.nic.ninja\n\nstatus:       ACTIVE\nremarks:      Registration information: https://www.identity.digital\n\ncreated:      2014-06-05\nchanged:      2023-10-03\nsource:       IANA\n\n";

    #[test]
    fn test_registry_dates_win_over_iana_tld_entry() {
        let chain = format!(
            "{}Domain Name: example.ninja\nRegistry Domain ID: 8f2c_ninja\nUpdated Date: 2024-05-01T00:00:00Z\nCreation Date: 2020-01-01T00:00:00Z\nDomain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\nName Server: ns1.example.net\n",
            IANA_NINJA
        );
        let record = parse_record(&chain).unwrap();

        assert_eq!(record.domain, "example.ninja");
        assert_eq!(record.created_date.as_deref(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(record.updated_date.as_deref(), Some("2024-05-01T00:00:00Z"));
        assert_eq!(record.status, vec!["clientTransferProhibited"]);
        assert_eq!(record.name_servers, vec!["ns1.example.net"]);
        assert_eq!(record.domain_id.as_deref(), Some("8f2c_ninja"));
    }

    #[test]
    fn test_iana_tld_entry_alone() {
        let record = parse_record(IANA_NINJA).unwrap();

        assert_eq!(record.domain, "ninja");
        assert_eq!(record.created_date.as_deref(), Some("2014-06-05"));
        assert_eq!(record.updated_date.as_deref(), Some("2023-10-03"));
        assert_eq!(record.status, vec!["ACTIVE"]);
        assert_eq!(record.name_servers, vec!["v0n0.nic.ninja"]);
        assert_eq!(record.whois_server.as_deref(), Some("whois.nic.ninja"));
    }

    #[test]
    fn test_domain_name_preferred_over_bare_domain_key() {
        let iana_then_registry = "domain:       XYZ\nwhois:        whois.nic.xyz\n\nDomain Name: EXAMPLE.XYZ\n";
        let record = parse_record(iana_then_registry).unwrap();
        assert_eq!(record.domain, "example.xyz");
        assert_eq!(record.whois_server.as_deref(), Some("whois.nic.xyz"));
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(parse_record(""), Err(WhoisError::ParseError { .. })));
        assert!(matches!(parse_record("  \n\n"), Err(WhoisError::ParseError { .. })));

        let not_found = "No match for \"EXAMPLE-NOT-REGISTERED.COM\".\r\n>>> Last update of whois database: 2024-10-01T12:00:00Z <<<\r\n";
        let err = parse_record(not_found).unwrap_err();
        assert!(err.to_string().contains("not found"));

        let denic_free = "Domain: example-free.de\nStatus: free\n";
        assert!(parse_record(denic_free).is_err());

        let limited = "Too many requests from your IP, try again later\n";
        assert!(parse_record(limited).unwrap_err().to_string().contains("rate limited"));

        let arin = "NetRange: 8.8.8.0 - 8.8.8.255\nCIDR: 8.8.8.0/24\nOrgName: Google LLC\n";
        let err = parse_record(arin).unwrap_err();
        assert!(err.to_string().contains("no domain name"));
    }

    #[test]
    fn test_unsigned_dnssec() {
        let record = parse_record("Domain Name: example.org\nDNSSEC: unsigned\n").unwrap();
        assert_eq!(record.dnssec, Some(false));
    }

    #[test]
    fn test_parse_datetime_formats() {
        let cases = [
            "2024-08-14T07:01:34Z",
            "2024-08-14T07:01:34.123Z",
            "2024-08-14T07:01:34+08:00",
            "2024-08-14 07:01:34",
            "2024-08-14 07:01:34 UTC",
            "2024/08/14 07:01:34 (JST)",
            "2024.08.14 07:01:34",
            "14-Aug-2024",
            "2024-08-14",
            "14.08.2024",
        ];
        for case in cases {
            let dt = parse_datetime(case).unwrap_or_else(|| panic!("failed to parse {}", case));
            assert_eq!(dt.year(), 2024, "{}", case);
        }

        assert!(parse_datetime("before Aug-1996").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn test_record_serializes_without_absent_fields() {
        let record = parse_record("Domain Name: EXAMPLE.COM\n").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert!(json.get("registrar").is_none());
        assert!(json.get("name_servers").is_none());
    }
}
