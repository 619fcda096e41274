//! Invoice records: the common envelope plus the two concrete kinds.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::breakdown::BreakdownDetails;
use crate::codes::{Correction, CorrectiveType, InvoiceType, PriorRejection};
use crate::identifiers::{InvoiceId, Recipient};
use crate::values::{Amount, RecordHash};

/// Fields shared by every invoice record.
///
/// The previous-link fields (`previous_invoice_id`, `previous_hash`) must be
/// populated together or not at all, and only before the record is sealed.
/// `hash` and `hashed_at` are written exactly once by the chain engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCommon {
    /// Identity of the invoice this record documents (`IDFactura`).
    pub invoice_id: InvoiceId,
    /// Display name of the issuing party (`NombreRazonEmisor`).
    pub issuer_name: String,
    /// Invoice identity of the preceding record in this issuer's chain.
    pub previous_invoice_id: Option<InvoiceId>,
    /// Digest of the preceding record (`Encadenamiento/RegistroAnterior/Huella`).
    pub previous_hash: Option<RecordHash>,
    /// This record's own digest (`Huella`); present once sealed.
    pub hash: Option<RecordHash>,
    /// Instant the digest was computed (`FechaHoraHusoGenRegistro`).
    pub hashed_at: Option<DateTime<FixedOffset>>,
    /// Prior-rejection marker (`RechazoPrevio`).
    pub prior_rejection: Option<PriorRejection>,
    /// Amendment marker (`Subsanacion`).
    pub correction: Option<Correction>,
    /// Free-form external reference (`RefExterna`, up to 60 characters).
    pub external_reference: Option<String>,
}

impl RecordCommon {
    /// Builds the common envelope for a not-yet-sealed, first-in-chain record.
    pub fn new(invoice_id: InvoiceId, issuer_name: impl Into<String>) -> Self {
        Self {
            invoice_id,
            issuer_name: issuer_name.into(),
            previous_invoice_id: None,
            previous_hash: None,
            hash: None,
            hashed_at: None,
            prior_rejection: None,
            correction: None,
            external_reference: None,
        }
    }

    /// Links this record to its predecessor in the issuer's chain.
    pub fn chain_to(&mut self, previous_invoice_id: InvoiceId, previous_hash: RecordHash) {
        self.previous_invoice_id = Some(previous_invoice_id);
        self.previous_hash = Some(previous_hash);
    }

    /// Whether the digest has already been computed.
    pub fn is_sealed(&self) -> bool {
        self.hash.is_some()
    }
}

/// Registration of an issued invoice (`RegistroAlta`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Common record envelope.
    pub common: RecordCommon,
    /// Invoice type (`TipoFactura`).
    pub invoice_type: InvoiceType,
    /// Description of the invoiced operation (`DescripcionOperacion`, up to 500).
    pub description: String,
    /// Invoice recipients (`Destinatarios`, up to 1000).
    pub recipients: Vec<Recipient>,
    /// Corrective method (`TipoRectificativa`); corrective types only.
    pub corrective_type: Option<CorrectiveType>,
    /// Invoices corrected by this one (`FacturasRectificadas`).
    pub corrected_invoices: Vec<InvoiceId>,
    /// Corrected base being superseded (`ImporteRectificacion/BaseRectificada`).
    pub corrected_base_amount: Option<Amount>,
    /// Corrected tax being superseded (`ImporteRectificacion/CuotaRectificada`).
    pub corrected_tax_amount: Option<Amount>,
    /// Simplified invoices replaced by this one (`FacturasSustituidas`).
    pub replaced_invoices: Vec<InvoiceId>,
    /// Tax breakdown (`Desglose`, 1 to 12 lines).
    pub breakdown: Vec<BreakdownDetails>,
    /// Sum of all charged tax (`CuotaTotal`).
    pub total_tax_amount: Amount,
    /// Total invoice amount (`ImporteTotal`).
    pub total_amount: Amount,
}

/// Voiding of a previously registered invoice (`RegistroAnulacion`).
///
/// A cancellation can never open a chain: both previous-link fields are
/// mandatory. Its digest deliberately excludes the correction-state markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRecord {
    /// Common record envelope.
    pub common: RecordCommon,
    /// Marks cancellation of a record the authority never saw
    /// (`SinRegistroPrevio`).
    pub without_prior_record: bool,
}

/// An invoice record of either kind.
///
/// Closed union: the encoder, the rule set and the codec each dispatch over
/// exactly these two variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// Invoice registration.
    Registration(RegistrationRecord),
    /// Invoice cancellation.
    Cancellation(CancellationRecord),
}

impl Record {
    /// Common envelope of either record kind.
    pub fn common(&self) -> &RecordCommon {
        match self {
            Record::Registration(r) => &r.common,
            Record::Cancellation(r) => &r.common,
        }
    }

    /// Mutable common envelope of either record kind.
    pub fn common_mut(&mut self) -> &mut RecordCommon {
        match self {
            Record::Registration(r) => &mut r.common,
            Record::Cancellation(r) => &mut r.common,
        }
    }

    /// Identity of the invoice this record documents.
    pub fn invoice_id(&self) -> &InvoiceId {
        &self.common().invoice_id
    }

    /// This record's digest, if sealed.
    pub fn hash(&self) -> Option<&RecordHash> {
        self.common().hash.as_ref()
    }

    /// Whether the digest has already been computed.
    pub fn is_sealed(&self) -> bool {
        self.common().is_sealed()
    }
}

impl From<RegistrationRecord> for Record {
    fn from(record: RegistrationRecord) -> Self {
        Record::Registration(record)
    }
}

impl From<CancellationRecord> for Record {
    fn from(record: CancellationRecord) -> Self {
        Record::Cancellation(record)
    }
}
