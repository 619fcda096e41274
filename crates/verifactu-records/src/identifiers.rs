//! Invoice and party identifiers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::codes::ForeignIdType;

/// Unique invoice identity within an issuer's namespace (`IDFactura`).
///
/// Immutable once attached to a record; equality over all three fields is
/// the chain-link key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceId {
    /// Tax identifier of the issuing party (`IDEmisorFactura`, 9 characters).
    pub issuer_id: String,
    /// Series plus invoice number (`NumSerieFactura`, up to 60 characters).
    pub invoice_number: String,
    /// Issue date (`FechaExpedicionFactura`).
    pub issue_date: NaiveDate,
}

impl InvoiceId {
    /// Builds an invoice identifier.
    pub fn new(
        issuer_id: impl Into<String>,
        invoice_number: impl Into<String>,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            invoice_number: invoice_number.into(),
            issue_date,
        }
    }
}

/// Domestic fiscal identity: a name plus a Spanish NIF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalId {
    /// Name or company name (`NombreRazon`, up to 120 characters).
    pub name: String,
    /// Tax identification number (`NIF`, 9 characters).
    pub nif: String,
}

impl FiscalId {
    /// Builds a domestic fiscal identity.
    pub fn new(name: impl Into<String>, nif: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nif: nif.into(),
        }
    }
}

/// Foreign fiscal identity: a name plus a country-coded identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignFiscalId {
    /// Name or company name (`NombreRazon`, up to 120 characters).
    pub name: String,
    /// ISO 3166-1 alpha-2 country code (`CodigoPais`, never "ES").
    pub country: String,
    /// Kind of identification document (`IDType`).
    pub id_type: ForeignIdType,
    /// Identification value in the country of residence (`ID`, up to 20).
    pub value: String,
}

/// Invoice recipient: either a domestic or a foreign fiscal identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    /// Recipient identified by a Spanish NIF.
    Domestic(FiscalId),
    /// Recipient identified by a foreign, country-coded document.
    Foreign(ForeignFiscalId),
}

impl Recipient {
    /// Display name of the recipient.
    pub fn name(&self) -> &str {
        match self {
            Recipient::Domestic(id) => &id.name,
            Recipient::Foreign(id) => &id.name,
        }
    }
}
