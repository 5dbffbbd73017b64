//! Terminal display for the whois CLI.
//!
//! Handles the usage banner, per-subject headers in batch runs and the
//! `--pretty` summary of a parsed record. Uses only the `console` crate.

use console::{pad_str, style, Alignment};
use whois_lib::{Contact, Record, ResolutionResult, WhoisError};

const LABEL_WIDTH: usize = 14;

// ── Usage ────────────────────────────────────────────────────────────────────

/// Short usage text printed when no query is given.
pub fn usage_text() -> String {
    let mut out = String::new();
    out.push_str("Usage:\n");
    out.push_str("\twhois [-j] [-p] [-v] [-h server] [--config FILE] QUERY...\n\n");
    out.push_str("Options:\n");
    out.push_str("\t-h, --host SERVER   query this WHOIS server\n");
    out.push_str("\t-j, --json          print the parsed record as JSON\n");
    out.push_str("\t-p, --pretty        print a colored summary of the record\n");
    out.push_str("\t-v, --verbose       debug logging to stderr\n");
    out.push_str("\t    --config FILE   read settings from FILE\n");
    out.push_str("\t    --help          print full help\n");
    out
}

pub fn print_usage() {
    print!("{}", usage_text());
}

// ── Batch header ─────────────────────────────────────────────────────────────

/// Separator printed before each subject when several are queried.
pub fn print_subject_header(subject: &str) {
    println!(
        "{} {} {}",
        style("──").dim(),
        style(subject).cyan().bold(),
        style("─".repeat(40usize.saturating_sub(subject.len()).max(4))).dim(),
    );
}

// ── Pretty record ────────────────────────────────────────────────────────────

fn label(name: &str) -> String {
    let padded = pad_str(name, LABEL_WIDTH, Alignment::Left, None);
    style(padded).bold().to_string()
}

fn line(out: &mut Vec<String>, name: &str, value: impl std::fmt::Display) {
    out.push(format!("  {} {}", label(name), value));
}

/// Summary of a parsed record plus the servers that answered.
pub fn format_record(record: &Record, result: &ResolutionResult) -> String {
    let mut lines = Vec::new();

    line(&mut lines, "Domain", style(&record.domain).white().bold());

    if let Some(registrar) = record.registrar.as_ref().and_then(contact_summary) {
        line(&mut lines, "Registrar", registrar);
    }
    if let Some(created) = &record.created_date {
        line(&mut lines, "Created", created);
    }
    if let Some(updated) = &record.updated_date {
        line(&mut lines, "Updated", updated);
    }
    if let Some(expires) = &record.expiration_date {
        line(&mut lines, "Expires", style(expires).yellow());
    }
    if !record.status.is_empty() {
        line(&mut lines, "Status", record.status.join(", "));
    }
    if !record.name_servers.is_empty() {
        line(&mut lines, "Name servers", record.name_servers.join(", "));
    }
    if let Some(dnssec) = record.dnssec {
        let value = if dnssec {
            style("signed").green()
        } else {
            style("unsigned").dim()
        };
        line(&mut lines, "DNSSEC", value);
    }
    if let Some(registrant) = record.registrant.as_ref().and_then(contact_summary) {
        line(&mut lines, "Registrant", registrant);
    }

    lines.push(servers_line(result));
    lines.join("\n")
}

/// Shown when `--pretty` was asked for but the text has no record in it.
pub fn format_unparsed(result: &ResolutionResult, error: &WhoisError) -> String {
    let mut out = String::new();
    out.push_str(&result.text);
    if !result.text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("{}\n", style(format!("({})", error)).dim()));
    out.push_str(&servers_line(result));
    out
}

fn servers_line(result: &ResolutionResult) -> String {
    let mut servers = result.servers.join(" → ");
    if let Some(err) = &result.referral_error {
        servers.push_str(&format!(" (referral failed: {})", err));
    }
    format!("  {} {}", label("Servers"), style(servers).dim())
}

/// Organization first, then name; None when neither is known.
fn contact_summary(contact: &Contact) -> Option<String> {
    match (&contact.organization, &contact.name) {
        (Some(org), Some(name)) if org != name => Some(format!("{} ({})", name, org)),
        (Some(org), _) => Some(org.clone()),
        (None, Some(name)) => Some(name.clone()),
        (None, None) => None,
    }
}
