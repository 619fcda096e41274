//! SOAP codec and client for the VERI*FACTU authority web service.
//!
//! [`SubmissionRequest`] renders sealed records into the submission
//! envelope, [`AeatResponse`] decodes per-record verdicts, and the query
//! pair ([`QueryFilter`], [`QueryResponse`]) covers the consultation
//! service. [`AeatClient`] ties them to a byte-oriented [`Transport`];
//! TLS and certificates stay on the transport's side of the seam.
#![deny(missing_docs)]

mod client;
mod error;
/// Invoice query codec.
pub mod query;
/// Submission envelope construction.
pub mod request;
/// Submission reply decoding.
pub mod response;
mod xml;

pub use client::{AeatClient, Transport, PRODUCTION_BASE_URL, TESTING_BASE_URL};
pub use error::{ProtocolError, TransportError};
pub use query::{
    ChainPosition, QueryFilter, QueryPeriod, QueryRecordItem, QueryRecordStatus, QueryResponse,
    QueryResult,
};
pub use request::SubmissionRequest;
pub use response::{AeatResponse, ItemOutcome, RecordType, ResponseItem, ResponseStatus};
