//! Hash-chain engine for VERI*FACTU invoice records.
//!
//! Three concerns, in dependency order:
//! - [`encoder`] renders the canonical `key=value` payload the authority
//!   digests, field order fixed per record kind.
//! - [`engine`] computes SHA-256 digests over that payload, seals records
//!   exactly once, and verifies the link between consecutive records.
//! - [`qr`] derives the public verification URL for a sealed record.
//!
//! The same record content, previous digest and timestamp always produce
//! the same digest; sealing is the only mutation in the crate.
#![deny(missing_docs)]

/// Canonical digest-input encoding.
pub mod encoder;
/// Digest computation, sealing and link verification.
pub mod engine;
mod error;
/// Verification-URL construction.
pub mod qr;

pub use encoder::{canonical_payload, format_hashed_at, format_issue_date};
pub use engine::{compute_digest, seal, verify_chain};
pub use error::ChainError;
pub use qr::verification_url;
