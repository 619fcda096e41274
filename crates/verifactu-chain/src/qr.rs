//! Verification-URL construction for the record's QR code.
//!
//! The printed invoice carries a QR pointing at the authority's public
//! checker, parameterized by the invoice's identifying fields. Only sealed
//! records get a URL.

use verifactu_records::RegistrationRecord;

use crate::encoder::format_issue_date;
use crate::error::ChainError;

const PRODUCTION_BASE: &str = "https://www2.agenciatributaria.gob.es/wlpl/TIKE-CONT/ValidarQR";
const TESTING_BASE: &str = "https://prewww2.aeat.es/wlpl/TIKE-CONT/ValidarQR";

/// Builds the public verification URL for a sealed registration record.
pub fn verification_url(
    record: &RegistrationRecord,
    production: bool,
) -> Result<String, ChainError> {
    if !record.common.is_sealed() {
        return Err(ChainError::Unsealed);
    }
    let base = if production {
        PRODUCTION_BASE
    } else {
        TESTING_BASE
    };
    let id = &record.common.invoice_id;
    Ok(format!(
        "{}?nif={}&numserie={}&fecha={}&importe={}",
        base,
        percent_encode(&id.issuer_id),
        percent_encode(&id.invoice_number),
        percent_encode(&format_issue_date(id.issue_date)),
        percent_encode(record.total_amount.as_str()),
    ))
}

/// Percent-encodes every byte outside the RFC 3986 unreserved set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
