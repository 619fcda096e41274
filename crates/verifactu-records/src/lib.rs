//! Invoice record model and compliance rule set for the VERI*FACTU
//! tax-reporting regime.
//!
//! This crate owns the entity graph (invoice identity, breakdown lines,
//! parties, the record envelope and its two concrete kinds) and the rule
//! engine that decides whether a record is submittable. Digesting and chain
//! verification live in `verifactu-chain`; the wire codec lives in
//! `verifactu-protocol`.
//!
//! Core invariants:
//! - Wire values (amounts, rates, digests) are validated once and never
//!   reformatted afterwards.
//! - Validation is read-only, repeatable, and reports every violated rule
//!   in one pass.
//! - A record's previous-link fields are populated together or not at all.
//!
#![deny(missing_docs)]

/// Per-rate tax breakdown lines.
pub mod breakdown;
/// Enumerated code sets defined by the authority.
pub mod codes;
/// Invoice and party identifiers.
pub mod identifiers;
/// Invoice records and the common envelope.
pub mod records;
/// Compliance rule engine.
pub mod rules;
/// Issuing software descriptor.
pub mod system;
/// Validated wire-format value types.
pub mod values;

pub use breakdown::BreakdownDetails;
pub use codes::{
    Correction, CorrectiveType, ForeignIdType, InvoiceType, OperationType, PriorRejection,
    RegimeType, TaxType,
};
pub use identifiers::{FiscalId, ForeignFiscalId, InvoiceId, Recipient};
pub use records::{CancellationRecord, Record, RecordCommon, RegistrationRecord};
pub use rules::{Validate, ValidationError, Violation};
pub use system::ComputerSystem;
pub use values::{Amount, RecordHash, TaxRate};
