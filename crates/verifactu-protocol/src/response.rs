//! Decoding of the authority's submission reply
//! (`RespuestaRegFactuSistemaFacturacion`).

use chrono::{DateTime, FixedOffset, NaiveDate};

use verifactu_records::InvoiceId;

use crate::error::ProtocolError;
use crate::xml::{find_all, find_tag, find_text};

/// Global outcome of a submission (`EstadoEnvio`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Every record in the batch was accepted cleanly.
    Correct,
    /// At least one record was rejected or accepted with errors.
    PartiallyCorrect,
    /// Every record in the batch was rejected.
    Incorrect,
}

impl ResponseStatus {
    fn decode(value: &str) -> Result<Self, ProtocolError> {
        match value {
            "Correcto" => Ok(ResponseStatus::Correct),
            "ParcialmenteCorrecto" => Ok(ResponseStatus::PartiallyCorrect),
            "Incorrecto" => Ok(ResponseStatus::Incorrect),
            other => Err(ProtocolError::InvalidValue {
                field: "EstadoEnvio",
                value: other.to_string(),
            }),
        }
    }
}

/// Kind of operation a response line refers to (`TipoOperacion`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// Invoice registration (`Alta`).
    Registration,
    /// Invoice cancellation (`Anulacion`).
    Cancellation,
}

/// Per-record outcome. Partial batch failure is data, not an error:
/// each line decodes independently of its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The record was registered without objection.
    Accepted,
    /// The record was registered but the authority flagged issues.
    AcceptedWithErrors {
        /// Authority error code (`CodigoErrorRegistro`).
        code: String,
        /// Authority error description.
        message: String,
    },
    /// The record was rejected and is not registered.
    Rejected {
        /// Authority error code (`CodigoErrorRegistro`).
        code: String,
        /// Authority error description.
        message: String,
    },
}

impl ItemOutcome {
    /// Whether the record ended up registered with the authority.
    pub fn is_registered(&self) -> bool {
        !matches!(self, ItemOutcome::Rejected { .. })
    }
}

/// One `RespuestaLinea`: the authority's verdict on a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseItem {
    /// Invoice the verdict refers to; the key for correlating with the
    /// submitted batch.
    pub invoice_id: InvoiceId,
    /// Operation kind the line refers to.
    pub record_type: RecordType,
    /// Verdict for this record.
    pub outcome: ItemOutcome,
    /// Whether the line refers to a correction submission.
    pub is_correction: bool,
}

/// Decoded submission reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AeatResponse {
    /// Global outcome of the batch.
    pub status: ResponseStatus,
    /// Authority confirmation code (`CSV`); absent on full rejection.
    pub csv: Option<String>,
    /// When the authority registered the submission.
    pub submitted_at: Option<DateTime<FixedOffset>>,
    /// Seconds the sender must wait before the next submission
    /// (`TiempoEsperaEnvio`).
    pub wait_seconds: u32,
    /// Per-record verdicts, in reply order.
    pub items: Vec<ResponseItem>,
}

impl AeatResponse {
    /// Decodes a raw SOAP reply.
    ///
    /// A SOAP fault becomes [`ProtocolError::ServerFault`]; a reply
    /// without the expected root element becomes
    /// [`ProtocolError::MissingElement`].
    pub fn decode(xml: &str) -> Result<Self, ProtocolError> {
        check_fault(xml)?;

        let root = find_tag(xml, "RespuestaRegFactuSistemaFacturacion")
            .ok_or(ProtocolError::MissingElement(
                "RespuestaRegFactuSistemaFacturacion",
            ))?;

        let status_text = find_text(root, "EstadoEnvio")
            .ok_or(ProtocolError::MissingElement("EstadoEnvio"))?;
        let status = ResponseStatus::decode(&status_text)?;

        let csv = find_text(root, "CSV");

        let submitted_at = match find_tag(root, "DatosPresentacion")
            .and_then(|block| find_text(block, "TimestampPresentacion"))
        {
            Some(text) => Some(parse_timestamp(&text, "TimestampPresentacion")?),
            None => None,
        };

        let wait_seconds = match find_text(root, "TiempoEsperaEnvio") {
            Some(text) => text.parse().map_err(|_| ProtocolError::InvalidValue {
                field: "TiempoEsperaEnvio",
                value: text,
            })?,
            None => 0,
        };

        let mut items = Vec::new();
        for line in find_all(root, "RespuestaLinea") {
            items.push(decode_item(line)?);
        }

        Ok(Self {
            status,
            csv,
            submitted_at,
            wait_seconds,
            items,
        })
    }

    /// The verdict for a specific invoice, if the reply carries one.
    pub fn item_for(&self, invoice_id: &InvoiceId) -> Option<&ResponseItem> {
        self.items.iter().find(|item| &item.invoice_id == invoice_id)
    }
}

pub(crate) fn check_fault(xml: &str) -> Result<(), ProtocolError> {
    if let Some(fault) = find_tag(xml, "Fault") {
        let message = find_text(fault, "faultstring")
            .unwrap_or_else(|| "unspecified server fault".to_string());
        return Err(ProtocolError::ServerFault(message));
    }
    Ok(())
}

pub(crate) fn parse_timestamp(
    text: &str,
    field: &'static str,
) -> Result<DateTime<FixedOffset>, ProtocolError> {
    DateTime::parse_from_rfc3339(text).map_err(|_| ProtocolError::InvalidValue {
        field,
        value: text.to_string(),
    })
}

pub(crate) fn parse_wire_date(
    text: &str,
    field: &'static str,
) -> Result<NaiveDate, ProtocolError> {
    NaiveDate::parse_from_str(text, "%d-%m-%Y").map_err(|_| ProtocolError::InvalidValue {
        field,
        value: text.to_string(),
    })
}

pub(crate) fn decode_invoice_id(block: &str) -> Result<InvoiceId, ProtocolError> {
    let issuer_id = find_text(block, "IDEmisorFactura")
        .ok_or(ProtocolError::MissingElement("IDEmisorFactura"))?;
    let invoice_number = find_text(block, "NumSerieFactura")
        .ok_or(ProtocolError::MissingElement("NumSerieFactura"))?;
    let date_text = find_text(block, "FechaExpedicionFactura")
        .ok_or(ProtocolError::MissingElement("FechaExpedicionFactura"))?;
    let issue_date = parse_wire_date(&date_text, "FechaExpedicionFactura")?;
    Ok(InvoiceId::new(issuer_id, invoice_number, issue_date))
}

fn decode_item(line: &str) -> Result<ResponseItem, ProtocolError> {
    let id_block = find_tag(line, "IDFactura")
        .ok_or(ProtocolError::MissingElement("IDFactura"))?;
    let invoice_id = decode_invoice_id(id_block)?;

    let operation = find_tag(line, "Operacion");
    let record_type = match operation.and_then(|block| find_text(block, "TipoOperacion")) {
        Some(text) => match text.as_str() {
            "Alta" => RecordType::Registration,
            "Anulacion" => RecordType::Cancellation,
            other => {
                return Err(ProtocolError::InvalidValue {
                    field: "TipoOperacion",
                    value: other.to_string(),
                })
            }
        },
        None => RecordType::Registration,
    };
    let is_correction = operation
        .and_then(|block| find_text(block, "Subsanacion"))
        .is_some_and(|text| text == "S");

    let status_text = find_text(line, "EstadoRegistro")
        .ok_or(ProtocolError::MissingElement("EstadoRegistro"))?;
    let outcome = match status_text.as_str() {
        "Correcto" => ItemOutcome::Accepted,
        "AceptadoConErrores" => ItemOutcome::AcceptedWithErrors {
            code: find_text(line, "CodigoErrorRegistro").unwrap_or_default(),
            message: find_text(line, "DescripcionErrorRegistro").unwrap_or_default(),
        },
        "Incorrecto" => ItemOutcome::Rejected {
            code: find_text(line, "CodigoErrorRegistro").unwrap_or_default(),
            message: find_text(line, "DescripcionErrorRegistro").unwrap_or_default(),
        },
        other => {
            return Err(ProtocolError::InvalidValue {
                field: "EstadoRegistro",
                value: other.to_string(),
            })
        }
    };

    Ok(ResponseItem {
        invoice_id,
        record_type,
        outcome,
        is_correction,
    })
}
