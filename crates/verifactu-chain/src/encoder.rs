//! Canonical digest-input encoding.
//!
//! The authority digests a fixed `key=value` field sequence joined with `&`,
//! not the XML document itself. Field order is normative and differs between
//! the two record kinds; values are taken verbatim, with no escaping.

use chrono::{DateTime, FixedOffset, NaiveDate};
use verifactu_records::{CancellationRecord, Record, RegistrationRecord};

use crate::error::ChainError;

/// Renders an issue date in the authority's `dd-mm-yyyy` wire form.
pub fn format_issue_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Renders a digest timestamp as ISO-8601 with a numeric offset,
/// e.g. `2025-06-01T10:20:30+02:00`.
pub fn format_hashed_at(at: DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Builds the exact byte sequence the record's digest is computed over.
///
/// Requires the digest timestamp to be set and the previous-link fields to
/// be paired; an unlinked record contributes an empty `Huella` value.
pub fn canonical_payload(record: &Record) -> Result<String, ChainError> {
    let common = record.common();
    if common.previous_invoice_id.is_some() != common.previous_hash.is_some() {
        return Err(ChainError::HalfLink);
    }
    let hashed_at = common.hashed_at.ok_or(ChainError::MissingTimestamp)?;
    let previous_hash = common
        .previous_hash
        .as_ref()
        .map(|h| h.as_str())
        .unwrap_or("");

    match record {
        Record::Registration(r) => Ok(registration_payload(r, previous_hash, hashed_at)),
        Record::Cancellation(r) => Ok(cancellation_payload(r, previous_hash, hashed_at)),
    }
}

fn registration_payload(
    record: &RegistrationRecord,
    previous_hash: &str,
    hashed_at: DateTime<FixedOffset>,
) -> String {
    let id = &record.common.invoice_id;
    format!(
        "IDEmisorFactura={}&NumSerieFactura={}&FechaExpedicionFactura={}\
         &TipoFactura={}&CuotaTotal={}&ImporteTotal={}&Huella={}\
         &FechaHoraHusoGenRegistro={}",
        id.issuer_id,
        id.invoice_number,
        format_issue_date(id.issue_date),
        record.invoice_type.code(),
        record.total_tax_amount.as_str(),
        record.total_amount.as_str(),
        previous_hash,
        format_hashed_at(hashed_at),
    )
}

fn cancellation_payload(
    record: &CancellationRecord,
    previous_hash: &str,
    hashed_at: DateTime<FixedOffset>,
) -> String {
    let id = &record.common.invoice_id;
    format!(
        "IDEmisorFacturaAnulada={}&NumSerieFacturaAnulada={}\
         &FechaExpedicionFacturaAnulada={}&Huella={}\
         &FechaHoraHusoGenRegistro={}",
        id.issuer_id,
        id.invoice_number,
        format_issue_date(id.issue_date),
        previous_hash,
        format_hashed_at(hashed_at),
    )
}
