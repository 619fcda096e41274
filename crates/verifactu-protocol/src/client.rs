//! Thin client tying the codec to a byte transport.

use verifactu_records::{ComputerSystem, FiscalId, Record};

use crate::error::{ProtocolError, TransportError};
use crate::query::{QueryFilter, QueryResponse};
use crate::request::SubmissionRequest;
use crate::response::AeatResponse;

/// Production service host.
pub const PRODUCTION_BASE_URL: &str = "https://www1.agenciatributaria.gob.es";
/// Pre-production (testing) service host.
pub const TESTING_BASE_URL: &str = "https://prewww1.aeat.es";

const SUBMISSION_PATH: &str = "/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP";
const QUERY_PATH: &str = "/wlpl/TIKE-CONT/ws/SistemaFacturacion/ConsultaSOAP";

/// Byte-oriented posting seam.
///
/// Mutual TLS, client certificates, timeouts and retries are the
/// implementation's concern; the codec only ever sees bytes.
pub trait Transport {
    /// Posts `body` to `url` and returns the raw reply bytes.
    fn post(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Client for the authority's submission and query services.
///
/// Builds the envelope, posts it once through the [`Transport`], and
/// decodes the reply. Transport failures pass through untouched.
pub struct AeatClient<T: Transport> {
    transport: T,
    request: SubmissionRequest,
    production: bool,
}

impl<T: Transport> AeatClient<T> {
    /// Creates a client targeting the production service.
    pub fn new(transport: T, system: ComputerSystem, taxpayer: FiscalId) -> Self {
        Self {
            transport,
            request: SubmissionRequest::new(system, taxpayer),
            production: true,
        }
    }

    /// Sets the representative party for every submission.
    pub fn with_representative(mut self, representative: FiscalId) -> Self {
        self.request = self.request.with_representative(representative);
        self
    }

    /// Switches between the production and testing services.
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    fn base_url(&self) -> &'static str {
        if self.production {
            PRODUCTION_BASE_URL
        } else {
            TESTING_BASE_URL
        }
    }

    /// Submits sealed records in chain order and decodes the verdicts.
    pub fn send(&self, records: &[Record]) -> Result<AeatResponse, ProtocolError> {
        self.send_inner(records, false)
    }

    /// Submits records marked as a voluntary post-incident remission.
    pub fn send_after_incident(&self, records: &[Record]) -> Result<AeatResponse, ProtocolError> {
        self.send_inner(records, true)
    }

    fn send_inner(&self, records: &[Record], incident: bool) -> Result<AeatResponse, ProtocolError> {
        let mut request = self.request.clone();
        request.incident = incident;
        let xml = request.to_xml(records)?;
        let url = format!("{}{}", self.base_url(), SUBMISSION_PATH);
        let reply = self.transport.post(&url, xml.as_bytes())?;
        AeatResponse::decode(&decode_utf8(reply)?)
    }

    /// Queries the records the authority holds for the filtered period.
    pub fn query(&self, filter: &QueryFilter) -> Result<QueryResponse, ProtocolError> {
        let xml = filter.to_xml(&self.request.taxpayer)?;
        let url = format!("{}{}", self.base_url(), QUERY_PATH);
        let reply = self.transport.post(&url, xml.as_bytes())?;
        QueryResponse::decode(&decode_utf8(reply)?)
    }
}

fn decode_utf8(bytes: Vec<u8>) -> Result<String, ProtocolError> {
    String::from_utf8(bytes)
        .map_err(|_| ProtocolError::MalformedResponse("reply is not valid UTF-8".to_string()))
}
