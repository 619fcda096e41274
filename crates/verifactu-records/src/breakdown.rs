//! Per-rate tax breakdown lines.

use serde::{Deserialize, Serialize};

use crate::codes::{OperationType, RegimeType, TaxType};
use crate::values::{Amount, TaxRate};

/// One tax line of an invoice's breakdown (`DetalleDesglose`).
///
/// Subject lines carry a rate and the tax charged over the base; not-subject
/// and exempt lines carry the base only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownDetails {
    /// Applicable tax family (`Impuesto`).
    pub tax_type: TaxType,
    /// Special-regime key (`ClaveRegimen`).
    pub regime_type: RegimeType,
    /// Operation classification (`CalificacionOperacion` / `OperacionExenta`).
    pub operation_type: OperationType,
    /// Tax base, or the not-subject amount (`BaseImponibleOimporteNoSujeto`).
    pub base_amount: Amount,
    /// Rate applied over the base (`TipoImpositivo`); subject lines only.
    pub tax_rate: Option<TaxRate>,
    /// Resulting tax amount (`CuotaRepercutida`); subject lines only.
    pub tax_amount: Option<Amount>,
}
