//! VCF and CSV rendering of collected contacts.
//!
//! Contacts are written in the order given. Both formats use CRLF line
//! endings. An empty list renders as an empty VCF string or a header-only
//! CSV.

use crate::store::ContactView;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Vcf,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Vcf => "vcf",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Vcf => "text/vcard",
            ExportFormat::Csv => "text/csv",
        }
    }

    /// Parses `vcf` or `csv`, case-insensitively.
    pub fn parse(value: &str) -> Option<ExportFormat> {
        match value.to_ascii_lowercase().as_str() {
            "vcf" => Some(ExportFormat::Vcf),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// `<session name>_contacts.<ext>`, safe to use as a single path component
/// and inside a header value.
///
/// Path separators and control characters in the name become `_`.
pub fn export_filename(session_name: &str, format: ExportFormat) -> String {
    let stem: String = session_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    format!("{}_contacts.{}", stem, format.extension())
}

/// One vCard 3.0 block per contact. `EMAIL` and `ORG` are left out when
/// absent.
pub fn to_vcf<C: ContactView>(contacts: &[C]) -> String {
    let mut out = String::new();
    for contact in contacts {
        out.push_str("BEGIN:VCARD");
        out.push_str(CRLF);
        out.push_str("VERSION:3.0");
        out.push_str(CRLF);
        push_line(&mut out, "FN", contact.name());
        push_line(&mut out, "TEL", contact.phone());
        if let Some(email) = contact.email() {
            push_line(&mut out, "EMAIL", email);
        }
        if let Some(company) = contact.company() {
            push_line(&mut out, "ORG", company);
        }
        out.push_str("END:VCARD");
        out.push_str(CRLF);
    }
    out
}

fn push_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push(':');
    out.push_str(value);
    out.push_str(CRLF);
}

/// Header row plus one row per contact, every field quoted.
///
/// With `include_submitted_at` a trailing `Submitted At` column carries the
/// submission time as RFC 3339 UTC.
pub fn to_csv<C: ContactView>(contacts: &[C], include_submitted_at: bool) -> String {
    let mut header = vec!["Name", "Phone", "Email", "Company"];
    if include_submitted_at {
        header.push("Submitted At");
    }

    let mut out = header.join(",");
    out.push_str(CRLF);

    for contact in contacts {
        let mut row = vec![
            quote(contact.name()),
            quote(contact.phone()),
            quote(contact.email().unwrap_or("")),
            quote(contact.company().unwrap_or("")),
        ];
        if include_submitted_at {
            let at = contact.submitted_at().and_utc().to_rfc3339();
            row.push(quote(&at));
        }
        out.push_str(&row.join(","));
        out.push_str(CRLF);
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
