//! Enumerated code sets defined by the authority.
//!
//! Variants are named after the external codes where the authority
//! itself speaks in codes; `code()` returns the exact wire text.

use serde::{Deserialize, Serialize};

/// Invoice type (`TipoFactura`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    /// Standard invoice (art. 6, 7.2 and 7.3 of RD 1619/2012).
    F1,
    /// Simplified invoice, recipient not identified (art. 6.1.d).
    F2,
    /// Invoice issued in substitution of declared simplified invoices.
    F3,
    /// Corrective invoice (art. 80.1, 80.2 and error founded in law).
    R1,
    /// Corrective invoice (art. 80.3).
    R2,
    /// Corrective invoice (art. 80.4).
    R3,
    /// Corrective invoice (all other grounds).
    R4,
    /// Corrective invoice over simplified invoices.
    R5,
}

impl InvoiceType {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            InvoiceType::F1 => "F1",
            InvoiceType::F2 => "F2",
            InvoiceType::F3 => "F3",
            InvoiceType::R1 => "R1",
            InvoiceType::R2 => "R2",
            InvoiceType::R3 => "R3",
            InvoiceType::R4 => "R4",
            InvoiceType::R5 => "R5",
        }
    }

    /// Whether this is one of the corrective types (R1-R5).
    pub fn is_corrective(&self) -> bool {
        matches!(
            self,
            InvoiceType::R1 | InvoiceType::R2 | InvoiceType::R3 | InvoiceType::R4 | InvoiceType::R5
        )
    }

    /// Whether invoices of this type must carry at least one recipient.
    ///
    /// Simplified invoices (F2) and correctives over them (R5) must carry
    /// none; every other type requires one or more.
    pub fn requires_recipients(&self) -> bool {
        !matches!(self, InvoiceType::F2 | InvoiceType::R5)
    }
}

/// Corrective method (`TipoRectificativa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectiveType {
    /// By substitution: the corrective fully replaces the original.
    #[serde(rename = "S")]
    Substitution,
    /// By differences: the corrective adjusts the original's amounts.
    #[serde(rename = "I")]
    Differences,
}

impl CorrectiveType {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            CorrectiveType::Substitution => "S",
            CorrectiveType::Differences => "I",
        }
    }
}

/// Tax regime family (`Impuesto`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxType {
    /// Value-added tax (IVA).
    #[serde(rename = "01")]
    Iva,
    /// Production, services and import tax of Ceuta and Melilla (IPSI).
    #[serde(rename = "02")]
    Ipsi,
    /// Canary Islands general indirect tax (IGIC).
    #[serde(rename = "03")]
    Igic,
    /// Other taxes.
    #[serde(rename = "05")]
    Other,
}

impl TaxType {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            TaxType::Iva => "01",
            TaxType::Ipsi => "02",
            TaxType::Igic => "03",
            TaxType::Other => "05",
        }
    }
}

/// Special-regime key (`ClaveRegimen`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeType {
    /// General regime operation.
    #[serde(rename = "01")]
    C01,
    /// Export.
    #[serde(rename = "02")]
    C02,
    /// Used goods, works of art, antiques and collectors' items.
    #[serde(rename = "03")]
    C03,
    /// Investment gold special regime.
    #[serde(rename = "04")]
    C04,
    /// Travel agencies special regime.
    #[serde(rename = "05")]
    C05,
    /// VAT entity groups (advanced level).
    #[serde(rename = "06")]
    C06,
    /// Cash-basis criterion special regime.
    #[serde(rename = "07")]
    C07,
    /// Operations subject to IPSI / IGIC.
    #[serde(rename = "08")]
    C08,
    /// Travel agency services acting as mediators on behalf of others.
    #[serde(rename = "09")]
    C09,
    /// Third-party collections of professional fees or IP-derived rights.
    #[serde(rename = "10")]
    C10,
    /// Business premises rental operations.
    #[serde(rename = "11")]
    C11,
    /// VAT pending accrual in works certifications for public bodies.
    #[serde(rename = "14")]
    C14,
    /// VAT pending accrual in successive-tract operations.
    #[serde(rename = "15")]
    C15,
    /// Operation under one of the OSS / IOSS regimes.
    #[serde(rename = "17")]
    C17,
    /// Equivalence surcharge.
    #[serde(rename = "18")]
    C18,
    /// Agriculture, livestock and fisheries special regime (REAGYP).
    #[serde(rename = "19")]
    C19,
    /// Simplified regime.
    #[serde(rename = "20")]
    C20,
}

impl RegimeType {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            RegimeType::C01 => "01",
            RegimeType::C02 => "02",
            RegimeType::C03 => "03",
            RegimeType::C04 => "04",
            RegimeType::C05 => "05",
            RegimeType::C06 => "06",
            RegimeType::C07 => "07",
            RegimeType::C08 => "08",
            RegimeType::C09 => "09",
            RegimeType::C10 => "10",
            RegimeType::C11 => "11",
            RegimeType::C14 => "14",
            RegimeType::C15 => "15",
            RegimeType::C17 => "17",
            RegimeType::C18 => "18",
            RegimeType::C19 => "19",
            RegimeType::C20 => "20",
        }
    }
}

/// Operation classification (`CalificacionOperacion` / `OperacionExenta`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    /// Subject and not exempt, without reverse charge.
    S1,
    /// Subject and not exempt, with reverse charge.
    S2,
    /// Not subject (articles 7, 14 and others).
    N1,
    /// Not subject by localization rules.
    N2,
    /// Exempt under article 20.
    E1,
    /// Exempt under article 21.
    E2,
    /// Exempt under article 22.
    E3,
    /// Exempt under articles 23 and 24.
    E4,
    /// Exempt under article 25.
    E5,
    /// Exempt on other grounds.
    E6,
}

impl OperationType {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            OperationType::S1 => "S1",
            OperationType::S2 => "S2",
            OperationType::N1 => "N1",
            OperationType::N2 => "N2",
            OperationType::E1 => "E1",
            OperationType::E2 => "E2",
            OperationType::E3 => "E3",
            OperationType::E4 => "E4",
            OperationType::E5 => "E5",
            OperationType::E6 => "E6",
        }
    }

    /// Subject and taxable: a rate and a tax amount are mandatory.
    pub fn is_subject(&self) -> bool {
        matches!(self, OperationType::S1 | OperationType::S2)
    }

    /// Not subject to the tax at all.
    pub fn is_non_subject(&self) -> bool {
        matches!(self, OperationType::N1 | OperationType::N2)
    }

    /// Subject but exempt.
    pub fn is_exempt(&self) -> bool {
        matches!(
            self,
            OperationType::E1
                | OperationType::E2
                | OperationType::E3
                | OperationType::E4
                | OperationType::E5
                | OperationType::E6
        )
    }
}

/// Foreign identification document type (`IDType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignIdType {
    /// Intra-community VAT number.
    #[serde(rename = "02")]
    Vat,
    /// Passport.
    #[serde(rename = "03")]
    Passport,
    /// Official identity document issued by the country of residence.
    #[serde(rename = "04")]
    NationalId,
    /// Residence certificate.
    #[serde(rename = "05")]
    Residence,
    /// Other supporting document.
    #[serde(rename = "06")]
    Other,
    /// Not registered.
    #[serde(rename = "07")]
    Unregistered,
}

impl ForeignIdType {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            ForeignIdType::Vat => "02",
            ForeignIdType::Passport => "03",
            ForeignIdType::NationalId => "04",
            ForeignIdType::Residence => "05",
            ForeignIdType::Other => "06",
            ForeignIdType::Unregistered => "07",
        }
    }
}

/// Prior-rejection marker (`RechazoPrevio`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorRejection {
    /// No prior rejection ("N").
    #[serde(rename = "N")]
    No,
    /// A prior submission of this record was rejected by the authority ("S").
    #[serde(rename = "S")]
    ByAuthority,
    /// The prior record was rejected before reaching the authority ("X").
    #[serde(rename = "X")]
    BeforeSubmission,
}

impl PriorRejection {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            PriorRejection::No => "N",
            PriorRejection::ByAuthority => "S",
            PriorRejection::BeforeSubmission => "X",
        }
    }
}

/// Amendment marker (`Subsanacion`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Correction {
    /// This record amends a previously submitted one ("S").
    #[serde(rename = "S")]
    Yes,
    /// Explicit no-correction marker ("N").
    #[serde(rename = "N")]
    No,
}

impl Correction {
    /// External wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Correction::Yes => "S",
            Correction::No => "N",
        }
    }
}
