use chrono::NaiveDate;
use verifactu_protocol::{
    ChainPosition, ProtocolError, QueryFilter, QueryPeriod, QueryRecordStatus, QueryResponse,
    QueryResult,
};
use verifactu_records::{FiscalId, InvoiceId};

fn taxpayer() -> FiscalId {
    FiscalId::new("EMPRESA DE PRUEBAS SA", "A00000000")
}

fn period() -> QueryPeriod {
    QueryPeriod::new(2025, 6).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn period_bounds_are_validated() {
    assert!(QueryPeriod::new(2025, 6).is_ok());
    assert!(QueryPeriod::new(2000, 1).is_ok());
    assert!(QueryPeriod::new(1999, 6).is_err());
    assert!(QueryPeriod::new(2025, 0).is_err());
    assert!(QueryPeriod::new(2025, 13).is_err());
}

#[test]
fn minimal_query_carries_header_and_period() {
    let xml = QueryFilter::new(period()).to_xml(&taxpayer()).unwrap();

    assert!(xml.contains("<con:ConsultaFactuSistemaFacturacion>"));
    assert!(xml.contains("<con:Cabecera><sum1:IDVersion>1.0</sum1:IDVersion>"));
    assert!(xml.contains("<sum1:NIF>A00000000</sum1:NIF>"));
    assert!(xml.contains(
        "<con:PeriodoImputacion><sum1:Ejercicio>2025</sum1:Ejercicio>\
         <sum1:Periodo>06</sum1:Periodo></con:PeriodoImputacion>"
    ));
    assert!(xml.contains(
        "<con:MostrarNombreRazonEmisor>S</con:MostrarNombreRazonEmisor>\
         <con:MostrarSistemaInformatico>N</con:MostrarSistemaInformatico>"
    ));
    assert!(!xml.contains("NumSerieFactura"));
    assert!(!xml.contains("Contraparte"));
}

#[test]
fn optional_filters_are_emitted_when_set() {
    let mut filter = QueryFilter::new(period());
    filter.invoice_number = Some("FACT-001".to_string());
    filter.counterparty_nif = Some("B00000000".to_string());
    filter.issued_from = Some(date(2025, 6, 1));
    filter.issued_to = Some(date(2025, 6, 15));
    filter.external_reference = Some("REF-001".to_string());
    filter.pagination_key = Some("abc123xyz".to_string());
    filter.show_issuer_name = false;
    filter.show_computer_system = true;

    let xml = filter.to_xml(&taxpayer()).unwrap();
    assert!(xml.contains("<con:NumSerieFactura>FACT-001</con:NumSerieFactura>"));
    assert!(xml.contains("<con:Contraparte><sum1:NIF>B00000000</sum1:NIF></con:Contraparte>"));
    assert!(xml.contains(
        "<con:FechaExpedicionFactura><sum1:Desde>01-06-2025</sum1:Desde>\
         <sum1:Hasta>15-06-2025</sum1:Hasta></con:FechaExpedicionFactura>"
    ));
    assert!(xml.contains("<con:RefExterna>REF-001</con:RefExterna>"));
    assert!(xml.contains("<con:ClavePaginacion>abc123xyz</con:ClavePaginacion>"));
    assert!(xml.contains("<con:MostrarNombreRazonEmisor>N</con:MostrarNombreRazonEmisor>"));
    assert!(xml.contains("<con:MostrarSistemaInformatico>S</con:MostrarSistemaInformatico>"));
}

#[test]
fn inverted_date_range_is_rejected() {
    let mut filter = QueryFilter::new(period());
    filter.issued_from = Some(date(2025, 6, 20));
    filter.issued_to = Some(date(2025, 6, 1));
    assert!(matches!(
        filter.to_xml(&taxpayer()),
        Err(ProtocolError::InvalidValue {
            field: "FechaExpedicionFactura",
            ..
        })
    ));
}

fn query_reply(result: &str, items: &str, pagination: &str) -> String {
    format!(
        "<env:Envelope><env:Body>\
         <tikLRRC:RespuestaConsultaFactuSistemaFacturacion>\
           <tikLRRC:PeriodoImputacion>\
             <tikLRRC:Ejercicio>2025</tikLRRC:Ejercicio>\
             <tikLRRC:Periodo>06</tikLRRC:Periodo>\
           </tikLRRC:PeriodoImputacion>\
           <tikLRRC:IndicadorPaginacion>{pagination}</tikLRRC:IndicadorPaginacion>\
           <tikLRRC:ResultadoConsulta>{result}</tikLRRC:ResultadoConsulta>\
           {items}\
         </tikLRRC:RespuestaConsultaFactuSistemaFacturacion>\
         </env:Body></env:Envelope>"
    )
}

fn query_item(number: &str, status: &str, chaining: &str) -> String {
    format!(
        "<tikLRRC:RegistroRespuestaConsultaFactuSistemaFacturacion>\
           <tikLRRC:IDFactura>\
             <tik:IDEmisorFactura>A00000000</tik:IDEmisorFactura>\
             <tik:NumSerieFactura>{number}</tik:NumSerieFactura>\
             <tik:FechaExpedicionFactura>01-06-2025</tik:FechaExpedicionFactura>\
           </tikLRRC:IDFactura>\
           <tikLRRC:DatosRegistroFacturacion>\
             <tikLRRC:NombreRazonEmisor>EMPRESA DE PRUEBAS SA</tikLRRC:NombreRazonEmisor>\
             <tikLRRC:TipoFactura>F2</tikLRRC:TipoFactura>\
             <tikLRRC:DescripcionOperacion>Venta</tikLRRC:DescripcionOperacion>\
             <tikLRRC:CuotaTotal>2.10</tikLRRC:CuotaTotal>\
             <tikLRRC:ImporteTotal>12.10</tikLRRC:ImporteTotal>\
             <tikLRRC:Huella>{hash}</tikLRRC:Huella>\
             <tikLRRC:FechaHoraHusoGenRegistro>2025-06-01T10:20:30+02:00\
             </tikLRRC:FechaHoraHusoGenRegistro>\
             <tikLRRC:Encadenamiento>{chaining}</tikLRRC:Encadenamiento>\
           </tikLRRC:DatosRegistroFacturacion>\
           <tikLRRC:EstadoRegistro>\
             <tikLRRC:EstadoRegistro>{status}</tikLRRC:EstadoRegistro>\
           </tikLRRC:EstadoRegistro>\
           <tikLRRC:DatosPresentacion>\
             <tik:CSV>A-7UPZFQMHWPYQZQ</tik:CSV>\
             <tik:TimestampPresentacion>2025-06-01T10:21:00+02:00</tik:TimestampPresentacion>\
           </tikLRRC:DatosPresentacion>\
         </tikLRRC:RegistroRespuestaConsultaFactuSistemaFacturacion>",
        hash = "F223F0A84F7D0C701C13C97CF10A1628FF9E46A003DDAEF3A804FBD799D82070",
    )
}

#[test]
fn decodes_a_reply_with_data() {
    let items = format!(
        "{}{}",
        query_item(
            "PRUEBA-0001",
            "Correcto",
            "<tikLRRC:PrimerRegistro>S</tikLRRC:PrimerRegistro>"
        ),
        query_item(
            "PRUEBA-0002",
            "Anulado",
            "<tikLRRC:RegistroAnterior>\
               <tik:IDEmisorFactura>A00000000</tik:IDEmisorFactura>\
               <tik:NumSerieFactura>PRUEBA-0001</tik:NumSerieFactura>\
               <tik:FechaExpedicionFactura>01-06-2025</tik:FechaExpedicionFactura>\
               <tik:Huella>F223F0A84F7D0C701C13C97CF10A1628FF9E46A003DDAEF3A804FBD799D82070\
               </tik:Huella>\
             </tikLRRC:RegistroAnterior>"
        ),
    );
    let xml = query_reply("ConDatos", &items, "N");
    let response = QueryResponse::decode(&xml).unwrap();

    assert_eq!(response.period, QueryPeriod::new(2025, 6).unwrap());
    assert_eq!(response.result, QueryResult::WithData);
    assert!(!response.has_more_pages);
    assert_eq!(response.items.len(), 2);

    let first = &response.items[0];
    assert_eq!(
        first.invoice_id,
        InvoiceId::new("A00000000", "PRUEBA-0001", date(2025, 6, 1))
    );
    assert_eq!(first.issuer_name.as_deref(), Some("EMPRESA DE PRUEBAS SA"));
    assert_eq!(first.invoice_type.as_deref(), Some("F2"));
    assert_eq!(first.total_amount.as_ref().unwrap().as_str(), "12.10");
    assert_eq!(first.status, Some(QueryRecordStatus::Correct));
    assert_eq!(first.csv.as_deref(), Some("A-7UPZFQMHWPYQZQ"));
    assert_eq!(first.chain_position, ChainPosition::First);

    let second = &response.items[1];
    assert_eq!(second.status, Some(QueryRecordStatus::Cancelled));
    match &second.chain_position {
        ChainPosition::Linked {
            previous_invoice_id,
            previous_hash,
        } => {
            assert_eq!(previous_invoice_id.invoice_number, "PRUEBA-0001");
            assert_eq!(
                previous_hash.as_str(),
                "F223F0A84F7D0C701C13C97CF10A1628FF9E46A003DDAEF3A804FBD799D82070"
            );
        }
        other => panic!("expected a linked chain position, got {other:?}"),
    }
}

#[test]
fn decodes_an_empty_reply() {
    let xml = query_reply("SinDatos", "", "N");
    let response = QueryResponse::decode(&xml).unwrap();
    assert_eq!(response.result, QueryResult::WithoutData);
    assert!(response.items.is_empty());
    assert_eq!(response.pagination_key, None);
}

#[test]
fn decodes_pagination() {
    let items = query_item(
        "PRUEBA-0001",
        "Correcto",
        "<tikLRRC:PrimerRegistro>S</tikLRRC:PrimerRegistro>",
    );
    let xml = query_reply("ConDatos", &items, "S").replace(
        "<tikLRRC:ResultadoConsulta>",
        "<tikLRRC:ClavePaginacion>page-2-key</tikLRRC:ClavePaginacion>\
         <tikLRRC:ResultadoConsulta>",
    );
    let response = QueryResponse::decode(&xml).unwrap();
    assert!(response.has_more_pages);
    assert_eq!(response.pagination_key.as_deref(), Some("page-2-key"));
}

#[test]
fn missing_root_element_is_a_typed_error() {
    let xml = "<env:Envelope><env:Body><Otra/></env:Body></env:Envelope>";
    assert!(matches!(
        QueryResponse::decode(xml),
        Err(ProtocolError::MissingElement(
            "RespuestaConsultaFactuSistemaFacturacion"
        ))
    ));
}

#[test]
fn fault_replies_become_server_faults() {
    let xml = "<env:Envelope><env:Body><env:Fault>\
        <faultstring>Periodo no disponible</faultstring>\
        </env:Fault></env:Body></env:Envelope>";
    assert!(matches!(
        QueryResponse::decode(xml),
        Err(ProtocolError::ServerFault(_))
    ));
}
