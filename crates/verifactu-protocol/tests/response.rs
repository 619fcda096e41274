use chrono::{DateTime, NaiveDate};
use verifactu_protocol::{AeatResponse, ItemOutcome, ProtocolError, RecordType, ResponseStatus};
use verifactu_records::InvoiceId;

fn line(number: &str, operation: &str, status: &str, error: Option<(&str, &str)>) -> String {
    let error_block = match error {
        Some((code, message)) => format!(
            "<tikR:CodigoErrorRegistro>{code}</tikR:CodigoErrorRegistro>\
             <tikR:DescripcionErrorRegistro>{message}</tikR:DescripcionErrorRegistro>"
        ),
        None => String::new(),
    };
    format!(
        "<tikR:RespuestaLinea>\
           <tikR:IDFactura>\
             <tik:IDEmisorFactura>A00000000</tik:IDEmisorFactura>\
             <tik:NumSerieFactura>{number}</tik:NumSerieFactura>\
             <tik:FechaExpedicionFactura>01-06-2025</tik:FechaExpedicionFactura>\
           </tikR:IDFactura>\
           <tikR:Operacion><tik:TipoOperacion>{operation}</tik:TipoOperacion></tikR:Operacion>\
           <tikR:EstadoRegistro>{status}</tikR:EstadoRegistro>\
           {error_block}\
         </tikR:RespuestaLinea>"
    )
}

fn reply(status: &str, extras: &str, lines: &str) -> String {
    format!(
        "<env:Envelope xmlns:env=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <env:Body>\
           <tikR:RespuestaRegFactuSistemaFacturacion>\
             {extras}\
             <tikR:EstadoEnvio>{status}</tikR:EstadoEnvio>\
             {lines}\
           </tikR:RespuestaRegFactuSistemaFacturacion>\
         </env:Body></env:Envelope>"
    )
}

fn invoice(number: &str) -> InvoiceId {
    InvoiceId::new(
        "A00000000",
        number,
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    )
}

#[test]
fn decodes_a_fully_accepted_batch() {
    let xml = reply(
        "Correcto",
        "<tikR:CSV>A-7UPZFQMHWPYQZQ</tikR:CSV>\
         <tikR:DatosPresentacion>\
           <tik:TimestampPresentacion>2025-06-01T10:21:00+02:00</tik:TimestampPresentacion>\
         </tikR:DatosPresentacion>\
         <tikR:TiempoEsperaEnvio>60</tikR:TiempoEsperaEnvio>",
        &line("PRUEBA-0001", "Alta", "Correcto", None),
    );
    let response = AeatResponse::decode(&xml).unwrap();

    assert_eq!(response.status, ResponseStatus::Correct);
    assert_eq!(response.csv.as_deref(), Some("A-7UPZFQMHWPYQZQ"));
    assert_eq!(
        response.submitted_at,
        Some(DateTime::parse_from_rfc3339("2025-06-01T10:21:00+02:00").unwrap())
    );
    assert_eq!(response.wait_seconds, 60);
    assert_eq!(response.items.len(), 1);

    let item = &response.items[0];
    assert_eq!(item.invoice_id, invoice("PRUEBA-0001"));
    assert_eq!(item.record_type, RecordType::Registration);
    assert_eq!(item.outcome, ItemOutcome::Accepted);
    assert!(!item.is_correction);
}

#[test]
fn partial_failure_is_data_not_an_error() {
    let lines = format!(
        "{}{}{}",
        line("PRUEBA-0001", "Alta", "Correcto", None),
        line(
            "PRUEBA-0002",
            "Alta",
            "Incorrecto",
            Some(("1117", "Huella incorrecta"))
        ),
        line("PRUEBA-0003", "Anulacion", "Correcto", None),
    );
    let xml = reply("ParcialmenteCorrecto", "", &lines);
    let response = AeatResponse::decode(&xml).unwrap();

    assert_eq!(response.status, ResponseStatus::PartiallyCorrect);
    assert_eq!(response.items.len(), 3);
    assert_eq!(
        response.item_for(&invoice("PRUEBA-0001")).unwrap().outcome,
        ItemOutcome::Accepted
    );
    assert_eq!(
        response.item_for(&invoice("PRUEBA-0002")).unwrap().outcome,
        ItemOutcome::Rejected {
            code: "1117".to_string(),
            message: "Huella incorrecta".to_string(),
        }
    );
    let third = response.item_for(&invoice("PRUEBA-0003")).unwrap();
    assert_eq!(third.outcome, ItemOutcome::Accepted);
    assert_eq!(third.record_type, RecordType::Cancellation);
}

#[test]
fn accepted_with_errors_keeps_the_record_registered() {
    let xml = reply(
        "ParcialmenteCorrecto",
        "",
        &line(
            "PRUEBA-0001",
            "Alta",
            "AceptadoConErrores",
            Some(("2100", "Importe fuera de tolerancia")),
        ),
    );
    let response = AeatResponse::decode(&xml).unwrap();
    let outcome = &response.items[0].outcome;

    assert!(outcome.is_registered());
    assert_eq!(
        *outcome,
        ItemOutcome::AcceptedWithErrors {
            code: "2100".to_string(),
            message: "Importe fuera de tolerancia".to_string(),
        }
    );
}

#[test]
fn correction_marker_on_a_line_is_surfaced() {
    let xml = reply(
        "Correcto",
        "",
        "<tikR:RespuestaLinea>\
           <tikR:IDFactura>\
             <tik:IDEmisorFactura>A00000000</tik:IDEmisorFactura>\
             <tik:NumSerieFactura>PRUEBA-0001</tik:NumSerieFactura>\
             <tik:FechaExpedicionFactura>01-06-2025</tik:FechaExpedicionFactura>\
           </tikR:IDFactura>\
           <tikR:Operacion>\
             <tik:TipoOperacion>Alta</tik:TipoOperacion>\
             <tik:Subsanacion>S</tik:Subsanacion>\
           </tikR:Operacion>\
           <tikR:EstadoRegistro>Correcto</tikR:EstadoRegistro>\
         </tikR:RespuestaLinea>",
    );
    assert!(AeatResponse::decode(&xml).unwrap().items[0].is_correction);
}

#[test]
fn missing_optional_elements_decode_to_defaults() {
    let xml = reply("Incorrecto", "", &line(
        "PRUEBA-0001",
        "Alta",
        "Incorrecto",
        Some(("3000", "Registro duplicado")),
    ));
    let response = AeatResponse::decode(&xml).unwrap();

    assert_eq!(response.csv, None);
    assert_eq!(response.submitted_at, None);
    assert_eq!(response.wait_seconds, 0);
}

#[test]
fn prefix_variation_is_tolerated() {
    let xml = "<Envelope><Body>\
        <RespuestaRegFactuSistemaFacturacion>\
          <EstadoEnvio>Correcto</EstadoEnvio>\
          <RespuestaLinea>\
            <IDFactura>\
              <IDEmisorFactura>A00000000</IDEmisorFactura>\
              <NumSerieFactura>PRUEBA-0001</NumSerieFactura>\
              <FechaExpedicionFactura>01-06-2025</FechaExpedicionFactura>\
            </IDFactura>\
            <EstadoRegistro>Correcto</EstadoRegistro>\
          </RespuestaLinea>\
        </RespuestaRegFactuSistemaFacturacion>\
        </Body></Envelope>";
    let response = AeatResponse::decode(xml).unwrap();
    assert_eq!(response.status, ResponseStatus::Correct);
    assert_eq!(response.items[0].record_type, RecordType::Registration);
}

#[test]
fn escaped_text_is_unescaped() {
    let xml = reply(
        "Incorrecto",
        "",
        &line(
            "PRUEBA-0001",
            "Alta",
            "Incorrecto",
            Some(("1100", "Valor &lt;incorrecto&gt; &amp; rechazado")),
        ),
    );
    let response = AeatResponse::decode(&xml).unwrap();
    assert_eq!(
        response.items[0].outcome,
        ItemOutcome::Rejected {
            code: "1100".to_string(),
            message: "Valor <incorrecto> & rechazado".to_string(),
        }
    );
}

#[test]
fn soap_fault_becomes_a_server_fault() {
    let xml = "<env:Envelope xmlns:env=\"http://schemas.xmlsoap.org/soap/envelope/\">\
        <env:Body><env:Fault>\
          <faultcode>env:Client</faultcode>\
          <faultstring>Certificado no admitido</faultstring>\
        </env:Fault></env:Body></env:Envelope>";
    match AeatResponse::decode(xml) {
        Err(ProtocolError::ServerFault(message)) => {
            assert_eq!(message, "Certificado no admitido")
        }
        other => panic!("expected a server fault, got {other:?}"),
    }
}

#[test]
fn missing_root_element_is_a_typed_error() {
    let xml = "<env:Envelope><env:Body><Otra/></env:Body></env:Envelope>";
    assert!(matches!(
        AeatResponse::decode(xml),
        Err(ProtocolError::MissingElement(
            "RespuestaRegFactuSistemaFacturacion"
        ))
    ));
}

#[test]
fn unknown_status_values_are_rejected() {
    let xml = reply("Pendiente", "", "");
    assert!(matches!(
        AeatResponse::decode(&xml),
        Err(ProtocolError::InvalidValue {
            field: "EstadoEnvio",
            ..
        })
    ));

    let xml = reply("Correcto", "", &line("PRUEBA-0001", "Alta", "Desconocido", None));
    assert!(matches!(
        AeatResponse::decode(&xml),
        Err(ProtocolError::InvalidValue {
            field: "EstadoRegistro",
            ..
        })
    ));
}

#[test]
fn malformed_wait_seconds_is_rejected() {
    let xml = reply(
        "Correcto",
        "<tikR:TiempoEsperaEnvio>pronto</tikR:TiempoEsperaEnvio>",
        "",
    );
    assert!(matches!(
        AeatResponse::decode(&xml),
        Err(ProtocolError::InvalidValue {
            field: "TiempoEsperaEnvio",
            ..
        })
    ));
}
