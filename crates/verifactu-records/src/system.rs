//! Issuing software descriptor.

use serde::{Deserialize, Serialize};

/// Static description of the invoicing software (`SistemaInformatico`).
///
/// Attached to a submission, not to an individual record; it has no chain
/// relevance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputerSystem {
    /// Name of the producing person or entity (`NombreRazon`, up to 120).
    pub vendor_name: String,
    /// NIF of the producing person or entity (`NIF`, 9 characters).
    pub vendor_nif: String,
    /// Name the vendor gave the software (`NombreSistemaInformatico`, up to 30).
    pub name: String,
    /// Vendor-assigned product code (`IdSistemaInformatico`, 1 to 2 characters).
    pub id: String,
    /// Software version (`Version`, up to 50 characters).
    pub version: String,
    /// Installation number (`NumeroInstalacion`, up to 100 characters).
    pub installation_number: String,
    /// Whether the software can only operate in VERI*FACTU mode
    /// (`TipoUsoPosibleSoloVerifactu`).
    pub only_supports_verifactu: bool,
    /// Whether it supports invoicing for several taxpayers
    /// (`TipoUsoPosibleMultiOT`).
    pub supports_multiple_taxpayers: bool,
    /// Whether it is currently invoicing for several taxpayers
    /// (`IndicadorMultiplesOT`).
    pub has_multiple_taxpayers: bool,
}
