use thiserror::Error;

/// Errors raised while encoding, digesting or verifying chain links.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The previous-link fields are only half populated.
    #[error("previous invoice identifier and previous hash must be provided together")]
    HalfLink,
    /// The record carries no digest timestamp.
    #[error("record has no digest timestamp")]
    MissingTimestamp,
    /// The record already carries a digest; records are sealed exactly once.
    #[error("record is already sealed")]
    AlreadySealed,
    /// A record that must carry a digest does not.
    #[error("record has not been sealed")]
    Unsealed,
    /// A first-in-chain record carries previous-link fields.
    #[error("first record in a chain cannot reference a previous record")]
    UnexpectedLink,
    /// A predecessor was supplied but the record carries no link to it.
    #[error("record does not link to the supplied previous record")]
    MissingLink,
    /// A link field does not match the previous record.
    #[error("{field} does not match the previous record (expected {expected}, got {actual})")]
    LinkMismatch {
        /// Link field that failed the comparison.
        field: &'static str,
        /// Value taken from the previous record.
        expected: String,
        /// Value carried by the record under verification.
        actual: String,
    },
    /// The computed digest did not render as 64 uppercase hex characters.
    #[error("malformed digest: {0}")]
    MalformedDigest(String),
}
