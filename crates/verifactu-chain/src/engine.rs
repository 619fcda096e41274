//! Digest computation, one-time sealing and chain-link verification.

use chrono::{DateTime, FixedOffset};
use sha2::{Digest, Sha256};
use verifactu_records::{Record, RecordHash};

use crate::encoder::canonical_payload;
use crate::error::ChainError;

/// Computes the SHA-256 digest of the record's canonical payload.
///
/// Pure with respect to the record: the digest timestamp must already be
/// set, and the record is not modified.
pub fn compute_digest(record: &Record) -> Result<RecordHash, ChainError> {
    let payload = canonical_payload(record)?;
    let digest = Sha256::digest(payload.as_bytes());
    let hex = hex::encode_upper(digest);
    RecordHash::parse(hex).map_err(|v| ChainError::MalformedDigest(v.to_string()))
}

/// Seals the record: stamps the digest timestamp, computes the digest and
/// stores it. A record is sealed exactly once; a second call fails without
/// touching it.
pub fn seal(record: &mut Record, at: DateTime<FixedOffset>) -> Result<RecordHash, ChainError> {
    if record.is_sealed() {
        return Err(ChainError::AlreadySealed);
    }
    let common = record.common();
    if common.previous_invoice_id.is_some() != common.previous_hash.is_some() {
        return Err(ChainError::HalfLink);
    }
    record.common_mut().hashed_at = Some(at);
    let hash = compute_digest(record)?;
    record.common_mut().hash = Some(hash.clone());
    Ok(hash)
}

/// Verifies the record's link against its predecessor.
///
/// With no predecessor the record must be unlinked. With a predecessor the
/// record must carry both link fields, the linked invoice identity must
/// equal the predecessor's, and the linked digest must match the
/// predecessor's sealed digest byte for byte.
pub fn verify_chain(record: &Record, previous: Option<&Record>) -> Result<(), ChainError> {
    let common = record.common();
    let Some(previous) = previous else {
        if common.previous_invoice_id.is_some() || common.previous_hash.is_some() {
            return Err(ChainError::UnexpectedLink);
        }
        return Ok(());
    };

    let previous_hash = previous.hash().ok_or(ChainError::Unsealed)?;
    let (linked_id, linked_hash) = match (&common.previous_invoice_id, &common.previous_hash) {
        (Some(id), Some(hash)) => (id, hash),
        (None, None) => return Err(ChainError::MissingLink),
        _ => return Err(ChainError::HalfLink),
    };

    if linked_id != previous.invoice_id() {
        return Err(ChainError::LinkMismatch {
            field: "previous_invoice_id",
            expected: format!("{:?}", previous.invoice_id()),
            actual: format!("{linked_id:?}"),
        });
    }
    if linked_hash.as_str() != previous_hash.as_str() {
        return Err(ChainError::LinkMismatch {
            field: "previous_hash",
            expected: previous_hash.as_str().to_string(),
            actual: linked_hash.as_str().to_string(),
        });
    }
    Ok(())
}
