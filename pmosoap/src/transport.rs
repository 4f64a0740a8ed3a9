use std::fmt;
use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::errors::SoapError;

pub const CONTENT_TYPE: &str = "text/xml;charset=UTF-8";
pub const ACCEPT: &str = "text/xml";
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// One outgoing SOAP exchange.
#[derive(Debug, Clone, Copy)]
pub struct SoapRequest<'a> {
    pub endpoint: &'a str,
    pub soap_action: &'a str,
    pub payload: &'a [u8],
}

/// Raw result of an exchange:
/// - HTTP status code
/// - complete response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends a serialized envelope and returns the raw response.
///
/// Any HTTP status must be returned as a [`RawResponse`]: faults are often
/// delivered with a 500 (or even a 200) and are detected later, from the body.
pub trait Transport: Send + Sync {
    fn post(&self, request: &SoapRequest<'_>) -> Result<RawResponse, SoapError>;
}

/// Blocking HTTP transport built on a `ureq` agent.
pub struct HttpTransport {
    agent: Agent,
    max_response_size: u64,
}

impl HttpTransport {
    /// Build an agent that does NOT treat 4xx/5xx as errors, so that the body
    /// of an HTTP 500 SOAP Fault can still be read.
    pub fn new(timeout: Duration, max_response_size: u64, user_agent: &str) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .user_agent(user_agent)
            .build();

        Self {
            agent: config.into(),
            max_response_size,
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("max_response_size", &self.max_response_size)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &SoapRequest<'_>) -> Result<RawResponse, SoapError> {
        debug!(
            endpoint = request.endpoint,
            soap_action = request.soap_action,
            size = request.payload.len(),
            "Sending SOAP request"
        );

        let mut response = self
            .agent
            .post(request.endpoint)
            .header("Content-Type", CONTENT_TYPE)
            .header("Accept", ACCEPT)
            .header(SOAP_ACTION_HEADER, request.soap_action)
            .header("Content-Length", request.payload.len().to_string())
            .send(request.payload)?;

        let status = response.status().as_u16();

        // Read the full body regardless of the HTTP status code; it is
        // released when `response` goes out of scope.
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_response_size)
            .read_to_vec()?;

        debug!(status, size = body.len(), "SOAP response received");

        Ok(RawResponse { status, body })
    }
}

/// `SOAPAction` value expected by the server: `<endpoint>/<operation>`.
pub fn soap_action(endpoint: &str, operation: &str) -> String {
    format!("{}/{}", endpoint, operation)
}
