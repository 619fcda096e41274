//! Invoice query codec (`ConsultaFactuSistemaFacturacion`).
//!
//! Lets a sender ask the authority which records it holds for a tax
//! period, with optional filters and key-based pagination.

use chrono::{DateTime, FixedOffset, NaiveDate};

use verifactu_chain::format_issue_date;
use verifactu_records::{Amount, FiscalId, InvoiceId, RecordHash};

use crate::error::ProtocolError;
use crate::request::{NS_SOAPENV, NS_SUM1};
use crate::response::{check_fault, decode_invoice_id, parse_timestamp};
use crate::xml::{close, find_all, find_tag, find_text, leaf, open};

const NS_CON: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/ConsultaLR.xsd";

/// Tax period under query (`PeriodoImputacion`). Validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPeriod {
    year: u16,
    month: u8,
}

impl QueryPeriod {
    /// Builds a period; the year must be 2000-9999 and the month 1-12.
    pub fn new(year: u16, month: u8) -> Result<Self, ProtocolError> {
        if !(2000..=9999).contains(&year) {
            return Err(ProtocolError::InvalidValue {
                field: "Ejercicio",
                value: year.to_string(),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(ProtocolError::InvalidValue {
                field: "Periodo",
                value: month.to_string(),
            });
        }
        Ok(Self { year, month })
    }

    /// Tax year.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Tax month, 1 to 12.
    pub fn month(&self) -> u8 {
        self.month
    }

    fn ejercicio(&self) -> String {
        self.year.to_string()
    }

    fn periodo(&self) -> String {
        format!("{:02}", self.month)
    }
}

/// Filter criteria for an invoice query (`FiltroConsulta`).
#[derive(Debug, Clone)]
pub struct QueryFilter {
    /// Tax period to query; the only mandatory criterion.
    pub period: QueryPeriod,
    /// Restrict to a single invoice number (`NumSerieFactura`).
    pub invoice_number: Option<String>,
    /// Restrict to invoices naming this counterparty NIF (`Contraparte`).
    pub counterparty_nif: Option<String>,
    /// Lower bound on the issue date, inclusive.
    pub issued_from: Option<NaiveDate>,
    /// Upper bound on the issue date, inclusive.
    pub issued_to: Option<NaiveDate>,
    /// Restrict to records carrying this external reference (`RefExterna`).
    pub external_reference: Option<String>,
    /// Continuation key from a previous page (`ClavePaginacion`).
    pub pagination_key: Option<String>,
    /// Ask the authority to include issuer names in the reply.
    pub show_issuer_name: bool,
    /// Ask the authority to include software descriptors in the reply.
    pub show_computer_system: bool,
}

impl QueryFilter {
    /// Creates a filter over a period with no further criteria.
    pub fn new(period: QueryPeriod) -> Self {
        Self {
            period,
            invoice_number: None,
            counterparty_nif: None,
            issued_from: None,
            issued_to: None,
            external_reference: None,
            pagination_key: None,
            show_issuer_name: true,
            show_computer_system: false,
        }
    }

    /// Builds the query SOAP envelope for the given taxpayer.
    pub fn to_xml(&self, taxpayer: &FiscalId) -> Result<String, ProtocolError> {
        if let (Some(from), Some(to)) = (self.issued_from, self.issued_to) {
            if from > to {
                return Err(ProtocolError::InvalidValue {
                    field: "FechaExpedicionFactura",
                    value: format!("{} > {}", format_issue_date(from), format_issue_date(to)),
                });
            }
        }

        let mut out = String::with_capacity(1024);
        out.push_str(&format!(
            "<soapenv:Envelope xmlns:soapenv=\"{NS_SOAPENV}\" \
             xmlns:con=\"{NS_CON}\" xmlns:sum1=\"{NS_SUM1}\">"
        ));
        out.push_str("<soapenv:Header/><soapenv:Body>");
        open(&mut out, "con:ConsultaFactuSistemaFacturacion");

        open(&mut out, "con:Cabecera");
        leaf(&mut out, "sum1:IDVersion", "1.0");
        open(&mut out, "sum1:ObligadoEmision");
        leaf(&mut out, "sum1:NombreRazon", &taxpayer.name);
        leaf(&mut out, "sum1:NIF", &taxpayer.nif);
        close(&mut out, "sum1:ObligadoEmision");
        close(&mut out, "con:Cabecera");

        open(&mut out, "con:FiltroConsulta");
        open(&mut out, "con:PeriodoImputacion");
        leaf(&mut out, "sum1:Ejercicio", &self.period.ejercicio());
        leaf(&mut out, "sum1:Periodo", &self.period.periodo());
        close(&mut out, "con:PeriodoImputacion");
        if let Some(number) = &self.invoice_number {
            leaf(&mut out, "con:NumSerieFactura", number);
        }
        if let Some(nif) = &self.counterparty_nif {
            open(&mut out, "con:Contraparte");
            leaf(&mut out, "sum1:NIF", nif);
            close(&mut out, "con:Contraparte");
        }
        if self.issued_from.is_some() || self.issued_to.is_some() {
            open(&mut out, "con:FechaExpedicionFactura");
            if let Some(from) = self.issued_from {
                leaf(&mut out, "sum1:Desde", &format_issue_date(from));
            }
            if let Some(to) = self.issued_to {
                leaf(&mut out, "sum1:Hasta", &format_issue_date(to));
            }
            close(&mut out, "con:FechaExpedicionFactura");
        }
        if let Some(reference) = &self.external_reference {
            leaf(&mut out, "con:RefExterna", reference);
        }
        if let Some(key) = &self.pagination_key {
            leaf(&mut out, "con:ClavePaginacion", key);
        }
        close(&mut out, "con:FiltroConsulta");

        open(&mut out, "con:DatosAdicionalesRespuesta");
        leaf(
            &mut out,
            "con:MostrarNombreRazonEmisor",
            if self.show_issuer_name { "S" } else { "N" },
        );
        leaf(
            &mut out,
            "con:MostrarSistemaInformatico",
            if self.show_computer_system { "S" } else { "N" },
        );
        close(&mut out, "con:DatosAdicionalesRespuesta");

        close(&mut out, "con:ConsultaFactuSistemaFacturacion");
        out.push_str("</soapenv:Body></soapenv:Envelope>");
        Ok(out)
    }
}

/// Whether the query matched anything (`ResultadoConsulta`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryResult {
    /// The reply carries at least one record.
    WithData,
    /// No record matched the filter.
    WithoutData,
}

/// Registered state of a queried record (`EstadoRegistro`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRecordStatus {
    /// Registered without objection.
    Correct,
    /// Registered, but the authority flagged issues.
    AcceptedWithErrors,
    /// The record has since been cancelled.
    Cancelled,
}

/// Position of a queried record in its issuer's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainPosition {
    /// The record opened the chain (`PrimerRegistro`).
    First,
    /// The record links to a predecessor (`RegistroAnterior`).
    Linked {
        /// Invoice identity of the predecessor.
        previous_invoice_id: InvoiceId,
        /// Digest of the predecessor.
        previous_hash: RecordHash,
    },
    /// The reply did not report a chain position.
    Unreported,
}

/// One registered record as reported by the query service.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecordItem {
    /// Invoice identity.
    pub invoice_id: InvoiceId,
    /// Issuer name, when the filter asked for it.
    pub issuer_name: Option<String>,
    /// Invoice type wire code, as reported.
    pub invoice_type: Option<String>,
    /// Operation description.
    pub description: Option<String>,
    /// Total charged tax.
    pub total_tax_amount: Option<Amount>,
    /// Total invoice amount.
    pub total_amount: Option<Amount>,
    /// The record's digest.
    pub hash: Option<RecordHash>,
    /// When the record's digest was generated.
    pub registered_at: Option<DateTime<FixedOffset>>,
    /// Registered state of the record.
    pub status: Option<QueryRecordStatus>,
    /// Authority error code, if flagged.
    pub error_code: Option<String>,
    /// Authority error description, if flagged.
    pub error_message: Option<String>,
    /// Confirmation code of the submission that registered this record.
    pub csv: Option<String>,
    /// When that submission was presented.
    pub presented_at: Option<DateTime<FixedOffset>>,
    /// Chain position as reported by the authority.
    pub chain_position: ChainPosition,
}

/// Decoded query reply.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// Period the reply covers.
    pub period: QueryPeriod,
    /// Whether anything matched.
    pub result: QueryResult,
    /// More pages are available under `pagination_key`.
    pub has_more_pages: bool,
    /// Continuation key for the next page.
    pub pagination_key: Option<String>,
    /// Matched records, in reply order.
    pub items: Vec<QueryRecordItem>,
}

impl QueryResponse {
    /// Decodes a raw SOAP query reply.
    pub fn decode(xml: &str) -> Result<Self, ProtocolError> {
        check_fault(xml)?;

        let root = find_tag(xml, "RespuestaConsultaFactuSistemaFacturacion").ok_or(
            ProtocolError::MissingElement("RespuestaConsultaFactuSistemaFacturacion"),
        )?;

        let period_block = find_tag(root, "PeriodoImputacion")
            .ok_or(ProtocolError::MissingElement("PeriodoImputacion"))?;
        let period = decode_period(period_block)?;

        let result = match find_text(root, "ResultadoConsulta").as_deref() {
            Some("ConDatos") => QueryResult::WithData,
            Some("SinDatos") | None => QueryResult::WithoutData,
            Some(other) => {
                return Err(ProtocolError::InvalidValue {
                    field: "ResultadoConsulta",
                    value: other.to_string(),
                })
            }
        };

        let has_more_pages =
            find_text(root, "IndicadorPaginacion").is_some_and(|text| text == "S");
        let pagination_key = find_text(root, "ClavePaginacion");

        let mut items = Vec::new();
        for block in find_all(root, "RegistroRespuestaConsultaFactuSistemaFacturacion") {
            items.push(decode_record_item(block)?);
        }

        Ok(Self {
            period,
            result,
            has_more_pages,
            pagination_key,
            items,
        })
    }
}

fn decode_period(block: &str) -> Result<QueryPeriod, ProtocolError> {
    let year_text =
        find_text(block, "Ejercicio").ok_or(ProtocolError::MissingElement("Ejercicio"))?;
    let month_text =
        find_text(block, "Periodo").ok_or(ProtocolError::MissingElement("Periodo"))?;
    let year = year_text.parse().map_err(|_| ProtocolError::InvalidValue {
        field: "Ejercicio",
        value: year_text.clone(),
    })?;
    let month = month_text.parse().map_err(|_| ProtocolError::InvalidValue {
        field: "Periodo",
        value: month_text.clone(),
    })?;
    QueryPeriod::new(year, month)
}

fn parse_amount(text: String, field: &'static str) -> Result<Amount, ProtocolError> {
    Amount::parse(text.clone()).map_err(|_| ProtocolError::InvalidValue { field, value: text })
}

fn decode_record_item(block: &str) -> Result<QueryRecordItem, ProtocolError> {
    let id_block =
        find_tag(block, "IDFactura").ok_or(ProtocolError::MissingElement("IDFactura"))?;
    let invoice_id = decode_invoice_id(id_block)?;

    let data = find_tag(block, "DatosRegistroFacturacion").unwrap_or("");

    let total_tax_amount = match find_text(data, "CuotaTotal") {
        Some(text) => Some(parse_amount(text, "CuotaTotal")?),
        None => None,
    };
    let total_amount = match find_text(data, "ImporteTotal") {
        Some(text) => Some(parse_amount(text, "ImporteTotal")?),
        None => None,
    };
    let hash = match find_text(data, "Huella") {
        Some(text) => Some(RecordHash::parse(text.clone()).map_err(|_| {
            ProtocolError::InvalidValue {
                field: "Huella",
                value: text,
            }
        })?),
        None => None,
    };
    let registered_at = match find_text(data, "FechaHoraHusoGenRegistro") {
        Some(text) => Some(parse_timestamp(&text, "FechaHoraHusoGenRegistro")?),
        None => None,
    };

    // The record state arrives as an EstadoRegistro block holding an
    // element of the same name.
    let state_block = find_tag(block, "EstadoRegistro");
    let status = match state_block.and_then(|state| find_text(state, "EstadoRegistro")) {
        Some(text) => Some(match text.as_str() {
            "Correcto" => QueryRecordStatus::Correct,
            "AceptadoConErrores" => QueryRecordStatus::AcceptedWithErrors,
            "Anulado" => QueryRecordStatus::Cancelled,
            other => {
                return Err(ProtocolError::InvalidValue {
                    field: "EstadoRegistro",
                    value: other.to_string(),
                })
            }
        }),
        None => None,
    };
    let error_code = state_block.and_then(|state| find_text(state, "CodigoErrorRegistro"));
    let error_message =
        state_block.and_then(|state| find_text(state, "DescripcionErrorRegistro"));

    let presentation = find_tag(block, "DatosPresentacion");
    let csv = presentation.and_then(|p| find_text(p, "CSV"));
    let presented_at = match presentation.and_then(|p| find_text(p, "TimestampPresentacion")) {
        Some(text) => Some(parse_timestamp(&text, "TimestampPresentacion")?),
        None => None,
    };

    let chaining = find_tag(data, "Encadenamiento");
    let chain_position = decode_chain_position(chaining)?;

    Ok(QueryRecordItem {
        invoice_id,
        issuer_name: find_text(data, "NombreRazonEmisor"),
        invoice_type: find_text(data, "TipoFactura"),
        description: find_text(data, "DescripcionOperacion"),
        total_tax_amount,
        total_amount,
        hash,
        registered_at,
        status,
        error_code,
        error_message,
        csv,
        presented_at,
        chain_position,
    })
}

fn decode_chain_position(chaining: Option<&str>) -> Result<ChainPosition, ProtocolError> {
    let Some(chaining) = chaining else {
        return Ok(ChainPosition::Unreported);
    };
    if find_text(chaining, "PrimerRegistro").is_some_and(|text| text == "S") {
        return Ok(ChainPosition::First);
    }
    let Some(previous) = find_tag(chaining, "RegistroAnterior") else {
        return Ok(ChainPosition::Unreported);
    };
    let previous_invoice_id = decode_invoice_id(previous)?;
    let hash_text =
        find_text(previous, "Huella").ok_or(ProtocolError::MissingElement("Huella"))?;
    let previous_hash =
        RecordHash::parse(hash_text.clone()).map_err(|_| ProtocolError::InvalidValue {
            field: "Huella",
            value: hash_text,
        })?;
    Ok(ChainPosition::Linked {
        previous_invoice_id,
        previous_hash,
    })
}

