use std::cell::RefCell;

use chrono::{DateTime, FixedOffset, NaiveDate};
use verifactu_chain::seal;
use verifactu_protocol::{
    AeatClient, ProtocolError, QueryFilter, QueryPeriod, ResponseStatus, Transport,
    TransportError, PRODUCTION_BASE_URL, TESTING_BASE_URL,
};
use verifactu_records::{
    Amount, BreakdownDetails, ComputerSystem, FiscalId, InvoiceId, InvoiceType, OperationType,
    Record, RecordCommon, RegimeType, RegistrationRecord, TaxRate, TaxType,
};

struct MockTransport {
    reply: Result<Vec<u8>, String>,
    calls: RefCell<Vec<(String, String)>>,
}

impl MockTransport {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.as_bytes().to_vec()),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for &MockTransport {
    fn post(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.calls.borrow_mut().push((
            url.to_string(),
            String::from_utf8(body.to_vec()).unwrap(),
        ));
        match &self.reply {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(TransportError(message.clone())),
        }
    }
}

const ACCEPTED_REPLY: &str = "<env:Envelope><env:Body>\
    <tikR:RespuestaRegFactuSistemaFacturacion>\
      <tikR:EstadoEnvio>Correcto</tikR:EstadoEnvio>\
      <tikR:RespuestaLinea>\
        <tikR:IDFactura>\
          <tik:IDEmisorFactura>A00000000</tik:IDEmisorFactura>\
          <tik:NumSerieFactura>PRUEBA-0001</tik:NumSerieFactura>\
          <tik:FechaExpedicionFactura>01-06-2025</tik:FechaExpedicionFactura>\
        </tikR:IDFactura>\
        <tikR:EstadoRegistro>Correcto</tikR:EstadoRegistro>\
      </tikR:RespuestaLinea>\
    </tikR:RespuestaRegFactuSistemaFacturacion>\
    </env:Body></env:Envelope>";

const EMPTY_QUERY_REPLY: &str = "<env:Envelope><env:Body>\
    <tikLRRC:RespuestaConsultaFactuSistemaFacturacion>\
      <tikLRRC:PeriodoImputacion>\
        <tikLRRC:Ejercicio>2025</tikLRRC:Ejercicio>\
        <tikLRRC:Periodo>06</tikLRRC:Periodo>\
      </tikLRRC:PeriodoImputacion>\
      <tikLRRC:ResultadoConsulta>SinDatos</tikLRRC:ResultadoConsulta>\
    </tikLRRC:RespuestaConsultaFactuSistemaFacturacion>\
    </env:Body></env:Envelope>";

fn ts(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

fn make_client(transport: &MockTransport) -> AeatClient<&MockTransport> {
    let system = ComputerSystem {
        vendor_name: "SOFTWARE FACTURADOR SL".to_string(),
        vendor_nif: "B11111111".to_string(),
        name: "Facturador".to_string(),
        id: "FX".to_string(),
        version: "1.0.0".to_string(),
        installation_number: "383".to_string(),
        only_supports_verifactu: true,
        supports_multiple_taxpayers: false,
        has_multiple_taxpayers: false,
    };
    AeatClient::new(
        transport,
        system,
        FiscalId::new("EMPRESA DE PRUEBAS SA", "A00000000"),
    )
}

fn make_sealed_record() -> Record {
    let id = InvoiceId::new(
        "A00000000",
        "PRUEBA-0001",
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    );
    let mut record: Record = RegistrationRecord {
        common: RecordCommon::new(id, "EMPRESA DE PRUEBAS SA"),
        invoice_type: InvoiceType::F2,
        description: "Venta".to_string(),
        recipients: Vec::new(),
        corrective_type: None,
        corrected_invoices: Vec::new(),
        corrected_base_amount: None,
        corrected_tax_amount: None,
        replaced_invoices: Vec::new(),
        breakdown: vec![BreakdownDetails {
            tax_type: TaxType::Iva,
            regime_type: RegimeType::C01,
            operation_type: OperationType::S1,
            base_amount: Amount::parse("10.00").unwrap(),
            tax_rate: Some(TaxRate::parse("21.00").unwrap()),
            tax_amount: Some(Amount::parse("2.10").unwrap()),
        }],
        total_tax_amount: Amount::parse("2.10").unwrap(),
        total_amount: Amount::parse("12.10").unwrap(),
    }
    .into();
    seal(&mut record, ts("2025-06-01T10:20:30+02:00")).unwrap();
    record
}

#[test]
fn send_posts_once_to_the_submission_endpoint() {
    let transport = MockTransport::replying(ACCEPTED_REPLY);
    let client = make_client(&transport);

    let response = client.send(&[make_sealed_record()]).unwrap();
    assert_eq!(response.status, ResponseStatus::Correct);

    let calls = transport.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        format!("{PRODUCTION_BASE_URL}/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP")
    );
    assert!(calls[0].1.contains("RegFactuSistemaFacturacion"));
    assert!(!calls[0].1.contains("Incidencia"));
}

#[test]
fn testing_environment_switches_the_host() {
    let transport = MockTransport::replying(ACCEPTED_REPLY);
    let client = make_client(&transport).production(false);

    client.send(&[make_sealed_record()]).unwrap();
    assert!(transport.calls.borrow()[0].0.starts_with(TESTING_BASE_URL));
}

#[test]
fn incident_submission_marks_the_header() {
    let transport = MockTransport::replying(ACCEPTED_REPLY);
    let client = make_client(&transport);

    client.send_after_incident(&[make_sealed_record()]).unwrap();
    assert!(transport.calls.borrow()[0]
        .1
        .contains("<sum1:Incidencia>S</sum1:Incidencia>"));
}

#[test]
fn query_posts_to_the_query_endpoint() {
    let transport = MockTransport::replying(EMPTY_QUERY_REPLY);
    let client = make_client(&transport);

    let filter = QueryFilter::new(QueryPeriod::new(2025, 6).unwrap());
    let response = client.query(&filter).unwrap();
    assert!(response.items.is_empty());

    let calls = transport.calls.borrow();
    assert_eq!(
        calls[0].0,
        format!("{PRODUCTION_BASE_URL}/wlpl/TIKE-CONT/ws/SistemaFacturacion/ConsultaSOAP")
    );
    assert!(calls[0].1.contains("ConsultaFactuSistemaFacturacion"));
}

#[test]
fn transport_failures_pass_through() {
    let transport = MockTransport::failing("connection refused");
    let client = make_client(&transport);

    match client.send(&[make_sealed_record()]) {
        Err(ProtocolError::Transport(error)) => {
            assert!(error.to_string().contains("connection refused"))
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[test]
fn non_utf8_replies_are_malformed() {
    let transport = MockTransport {
        reply: Ok(vec![0xFF, 0xFE, 0x00]),
        calls: RefCell::new(Vec::new()),
    };
    let client = make_client(&transport);

    assert!(matches!(
        client.send(&[make_sealed_record()]),
        Err(ProtocolError::MalformedResponse(_))
    ));
}
