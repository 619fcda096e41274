//! Submission envelope construction (`RegFactuSistemaFacturacion`).

use verifactu_chain::{format_hashed_at, format_issue_date};
use verifactu_records::{
    CancellationRecord, ComputerSystem, FiscalId, InvoiceId, Record, Recipient,
    RegistrationRecord,
};

use crate::error::ProtocolError;
use crate::xml::{close, leaf, open};

pub(crate) const NS_SOAPENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub(crate) const NS_SUM: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroLR.xsd";
pub(crate) const NS_SUM1: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd";

/// Builder for the record-submission SOAP envelope.
///
/// Holds the per-sender constants (issuing software, taxpayer, optional
/// representative, voluntary-incident marker); the records to submit are
/// supplied per call, in chain order.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Issuing software descriptor, emitted with every record.
    pub system: ComputerSystem,
    /// Party obliged to issue the invoices (`ObligadoEmision`).
    pub taxpayer: FiscalId,
    /// Party submitting on the taxpayer's behalf (`Representante`).
    pub representative: Option<FiscalId>,
    /// Marks a voluntary submission after a system incident
    /// (`RemisionVoluntaria/Incidencia`).
    pub incident: bool,
}

impl SubmissionRequest {
    /// Creates a request builder without representative or incident marker.
    pub fn new(system: ComputerSystem, taxpayer: FiscalId) -> Self {
        Self {
            system,
            taxpayer,
            representative: None,
            incident: false,
        }
    }

    /// Sets the representative party.
    pub fn with_representative(mut self, representative: FiscalId) -> Self {
        self.representative = Some(representative);
        self
    }

    /// Marks the submission as a voluntary post-incident remission.
    pub fn with_incident(mut self) -> Self {
        self.incident = true;
        self
    }

    /// Builds the full SOAP envelope for the given records.
    ///
    /// Records appear in caller order. Every record must be sealed; the
    /// first unsealed one aborts the build.
    pub fn to_xml(&self, records: &[Record]) -> Result<String, ProtocolError> {
        for record in records {
            if !record.is_sealed() {
                let id = record.invoice_id();
                return Err(ProtocolError::UnsealedRecord(format!(
                    "{}/{}",
                    id.issuer_id, id.invoice_number
                )));
            }
        }

        let mut out = String::with_capacity(2048);
        out.push_str(&format!(
            "<soapenv:Envelope xmlns:soapenv=\"{NS_SOAPENV}\" \
             xmlns:sum=\"{NS_SUM}\" xmlns:sum1=\"{NS_SUM1}\">"
        ));
        out.push_str("<soapenv:Header/><soapenv:Body>");
        open(&mut out, "sum:RegFactuSistemaFacturacion");

        self.write_header(&mut out);
        for record in records {
            self.write_record(&mut out, record);
        }

        close(&mut out, "sum:RegFactuSistemaFacturacion");
        out.push_str("</soapenv:Body></soapenv:Envelope>");
        Ok(out)
    }

    fn write_header(&self, out: &mut String) {
        open(out, "sum:Cabecera");
        open(out, "sum1:ObligadoEmision");
        leaf(out, "sum1:NombreRazon", &self.taxpayer.name);
        leaf(out, "sum1:NIF", &self.taxpayer.nif);
        close(out, "sum1:ObligadoEmision");
        if let Some(representative) = &self.representative {
            open(out, "sum1:Representante");
            leaf(out, "sum1:NombreRazon", &representative.name);
            leaf(out, "sum1:NIF", &representative.nif);
            close(out, "sum1:Representante");
        }
        if self.incident {
            open(out, "sum1:RemisionVoluntaria");
            leaf(out, "sum1:Incidencia", "S");
            close(out, "sum1:RemisionVoluntaria");
        }
        close(out, "sum:Cabecera");
    }

    fn write_record(&self, out: &mut String, record: &Record) {
        open(out, "sum:RegistroFactura");
        let element = match record {
            Record::Registration(_) => "sum1:RegistroAlta",
            Record::Cancellation(_) => "sum1:RegistroAnulacion",
        };
        open(out, element);
        leaf(out, "sum1:IDVersion", "1.0");

        match record {
            Record::Registration(r) => write_registration(out, r),
            Record::Cancellation(r) => write_cancellation(out, r),
        }

        write_chaining(out, record);
        write_system(out, &self.system);

        let common = record.common();
        // to_xml rejected unsealed records, so these are present.
        if let Some(hashed_at) = common.hashed_at {
            leaf(out, "sum1:FechaHoraHusoGenRegistro", &format_hashed_at(hashed_at));
        }
        leaf(out, "sum1:TipoHuella", "01");
        if let Some(hash) = &common.hash {
            leaf(out, "sum1:Huella", hash.as_str());
        }

        if let Some(rejection) = common.prior_rejection {
            leaf(out, "sum1:RechazoPrevio", rejection.code());
        }
        if let Some(correction) = common.correction {
            leaf(out, "sum1:Subsanacion", correction.code());
        }
        if let Some(reference) = &common.external_reference {
            leaf(out, "sum1:RefExterna", reference);
        }

        close(out, element);
        close(out, "sum:RegistroFactura");
    }
}

fn write_invoice_id(out: &mut String, tag: &str, id: &InvoiceId) {
    open(out, tag);
    leaf(out, "sum1:IDEmisorFactura", &id.issuer_id);
    leaf(out, "sum1:NumSerieFactura", &id.invoice_number);
    leaf(out, "sum1:FechaExpedicionFactura", &format_issue_date(id.issue_date));
    close(out, tag);
}

fn write_registration(out: &mut String, record: &RegistrationRecord) {
    write_invoice_id(out, "sum1:IDFactura", &record.common.invoice_id);
    leaf(out, "sum1:NombreRazonEmisor", &record.common.issuer_name);
    leaf(out, "sum1:TipoFactura", record.invoice_type.code());

    if let Some(corrective_type) = record.corrective_type {
        leaf(out, "sum1:TipoRectificativa", corrective_type.code());
    }
    if !record.corrected_invoices.is_empty() {
        open(out, "sum1:FacturasRectificadas");
        for id in &record.corrected_invoices {
            write_invoice_id(out, "sum1:IDFacturaRectificada", id);
        }
        close(out, "sum1:FacturasRectificadas");
    }
    if !record.replaced_invoices.is_empty() {
        open(out, "sum1:FacturasSustituidas");
        for id in &record.replaced_invoices {
            write_invoice_id(out, "sum1:IDFacturaSustituida", id);
        }
        close(out, "sum1:FacturasSustituidas");
    }
    if record.corrected_base_amount.is_some() || record.corrected_tax_amount.is_some() {
        open(out, "sum1:ImporteRectificacion");
        if let Some(base) = &record.corrected_base_amount {
            leaf(out, "sum1:BaseRectificada", base.as_str());
        }
        if let Some(tax) = &record.corrected_tax_amount {
            leaf(out, "sum1:CuotaRectificada", tax.as_str());
        }
        close(out, "sum1:ImporteRectificacion");
    }

    leaf(out, "sum1:DescripcionOperacion", &record.description);

    if !record.recipients.is_empty() {
        open(out, "sum1:Destinatarios");
        for recipient in &record.recipients {
            open(out, "sum1:IDDestinatario");
            match recipient {
                Recipient::Domestic(id) => {
                    leaf(out, "sum1:NombreRazon", &id.name);
                    leaf(out, "sum1:NIF", &id.nif);
                }
                Recipient::Foreign(id) => {
                    leaf(out, "sum1:NombreRazon", &id.name);
                    open(out, "sum1:IDOtro");
                    leaf(out, "sum1:CodigoPais", &id.country);
                    leaf(out, "sum1:IDType", id.id_type.code());
                    leaf(out, "sum1:ID", &id.value);
                    close(out, "sum1:IDOtro");
                }
            }
            close(out, "sum1:IDDestinatario");
        }
        close(out, "sum1:Destinatarios");
    }

    open(out, "sum1:Desglose");
    for details in &record.breakdown {
        open(out, "sum1:DetalleDesglose");
        leaf(out, "sum1:Impuesto", details.tax_type.code());
        leaf(out, "sum1:ClaveRegimen", details.regime_type.code());
        leaf(out, "sum1:CalificacionOperacion", details.operation_type.code());
        if let Some(rate) = &details.tax_rate {
            leaf(out, "sum1:TipoImpositivo", rate.as_str());
        }
        leaf(
            out,
            "sum1:BaseImponibleOimporteNoSujeto",
            details.base_amount.as_str(),
        );
        if let Some(tax) = &details.tax_amount {
            leaf(out, "sum1:CuotaRepercutida", tax.as_str());
        }
        close(out, "sum1:DetalleDesglose");
    }
    close(out, "sum1:Desglose");

    leaf(out, "sum1:CuotaTotal", record.total_tax_amount.as_str());
    leaf(out, "sum1:ImporteTotal", record.total_amount.as_str());
}

fn write_cancellation(out: &mut String, record: &CancellationRecord) {
    write_invoice_id(out, "sum1:IDFactura", &record.common.invoice_id);
    if record.without_prior_record {
        leaf(out, "sum1:SinRegistroPrevio", "S");
    }
}

fn write_chaining(out: &mut String, record: &Record) {
    let common = record.common();
    open(out, "sum1:Encadenamiento");
    match (&common.previous_invoice_id, &common.previous_hash) {
        (Some(id), Some(hash)) => {
            open(out, "sum1:RegistroAnterior");
            leaf(out, "sum1:IDEmisorFactura", &id.issuer_id);
            leaf(out, "sum1:NumSerieFactura", &id.invoice_number);
            leaf(out, "sum1:FechaExpedicionFactura", &format_issue_date(id.issue_date));
            leaf(out, "sum1:Huella", hash.as_str());
            close(out, "sum1:RegistroAnterior");
        }
        _ => leaf(out, "sum1:PrimerRegistro", "S"),
    }
    close(out, "sum1:Encadenamiento");
}

fn write_system(out: &mut String, system: &ComputerSystem) {
    open(out, "sum1:SistemaInformatico");
    leaf(out, "sum1:NombreRazon", &system.vendor_name);
    leaf(out, "sum1:NIF", &system.vendor_nif);
    leaf(out, "sum1:NombreSistemaInformatico", &system.name);
    leaf(out, "sum1:IdSistemaInformatico", &system.id);
    leaf(out, "sum1:Version", &system.version);
    leaf(out, "sum1:NumeroInstalacion", &system.installation_number);
    leaf(out, "sum1:TipoUsoPosibleSoloVerifactu", flag(system.only_supports_verifactu));
    leaf(out, "sum1:TipoUsoPosibleMultiOT", flag(system.supports_multiple_taxpayers));
    leaf(out, "sum1:IndicadorMultiplesOT", flag(system.has_multiple_taxpayers));
    close(out, "sum1:SistemaInformatico");
}

fn flag(value: bool) -> &'static str {
    if value {
        "S"
    } else {
        "N"
    }
}
