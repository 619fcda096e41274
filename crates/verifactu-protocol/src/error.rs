use thiserror::Error;

/// Failure reported by a [`Transport`](crate::Transport) implementation.
///
/// Opaque by design: TLS, certificates, timeouts and retries live behind
/// the transport seam and surface here only as a message.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Errors raised while encoding requests or decoding authority replies.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A record was handed to the codec before being sealed.
    #[error("record {0} must be sealed before submission")]
    UnsealedRecord(String),
    /// The authority answered with a SOAP fault.
    #[error("server fault: {0}")]
    ServerFault(String),
    /// A structurally required element is absent from the reply.
    #[error("missing <{0}> element in response")]
    MissingElement(&'static str),
    /// An element carries text the codec cannot interpret.
    #[error("invalid value for {field}: '{value}'")]
    InvalidValue {
        /// Element or field the value belongs to.
        field: &'static str,
        /// Offending text as received.
        value: String,
    },
    /// The reply is not something the codec recognizes at all.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The transport failed before a reply was received.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
