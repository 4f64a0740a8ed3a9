use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::definition::ServiceDefinition;
use crate::errors::SoapError;
use crate::filters::{TextFilter, TextFilters};
use crate::params::{OperationCall, Params};
use crate::response::SoapResponse;
use crate::soap::{build_soap_request, parse_soap_envelope};
use crate::transport::{HttpTransport, SoapRequest, Transport, soap_action};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_USER_AGENT: &str = "pmosoap/0.1";

/// Endpoint and HTTP settings of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub timeout: Duration,
    pub max_response_size: u64,
    pub user_agent: String,
}

impl ClientSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the `client.*` section of the configuration.
    pub fn from_config(config: &pmoconfig::Config) -> Result<Self, SoapError> {
        let endpoint = config
            .get_endpoint()
            .map_err(|e| SoapError::configuration(e.to_string()))?;
        let timeout_secs = config
            .get_timeout_secs()
            .map_err(|e| SoapError::configuration(e.to_string()))?;
        let max_response_size = config
            .get_max_response_size()
            .map_err(|e| SoapError::configuration(e.to_string()))?;
        let user_agent = config
            .get_user_agent()
            .map_err(|e| SoapError::configuration(e.to_string()))?;

        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs as u64),
            max_response_size: max_response_size as u64,
            user_agent,
        })
    }
}

/// Rejects anything but an absolute http(s) URL.
fn validate_endpoint(endpoint: &str) -> Result<(), SoapError> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| SoapError::configuration(format!("invalid endpoint '{endpoint}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(SoapError::configuration(format!(
            "unsupported endpoint scheme '{scheme}' in '{endpoint}'"
        ))),
    }
}

/// Client SOAP pour un service et un endpoint
///
/// Le client ne garde aucun état d'invocation : chaque appel renvoie son
/// propre [`SoapResponse`]. Il peut donc être partagé entre threads.
pub struct SoapClient {
    definition: Arc<dyn ServiceDefinition>,
    endpoint: String,
    transport: Arc<dyn Transport>,
    filters: TextFilters,
}

impl fmt::Debug for SoapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapClient")
            .field("endpoint", &self.endpoint)
            .field("target_namespace", &self.definition.target_namespace())
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl SoapClient {
    /// Creates a client with default HTTP settings.
    ///
    /// The endpoint is only validated, never contacted.
    pub fn new(definition: Arc<dyn ServiceDefinition>, endpoint: &str) -> Result<Self, SoapError> {
        Self::with_settings(definition, &ClientSettings::new(endpoint))
    }

    pub fn with_settings(
        definition: Arc<dyn ServiceDefinition>,
        settings: &ClientSettings,
    ) -> Result<Self, SoapError> {
        validate_endpoint(&settings.endpoint)?;

        let transport = HttpTransport::new(
            settings.timeout,
            settings.max_response_size,
            &settings.user_agent,
        );

        Ok(Self {
            definition,
            endpoint: settings.endpoint.clone(),
            transport: Arc::new(transport),
            filters: TextFilters::default(),
        })
    }

    /// Replaces the HTTP transport.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Registers a text filter for `operation`, replacing any previous one.
    pub fn with_text_filter(
        mut self,
        operation: impl Into<String>,
        filter: impl TextFilter + 'static,
    ) -> Self {
        self.filters.insert(operation, Arc::new(filter));
        self
    }

    pub fn with_text_filters(mut self, filters: TextFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn definition(&self) -> &dyn ServiceDefinition {
        self.definition.as_ref()
    }

    /// `SOAPAction` header sent for `operation`.
    pub fn soap_action(&self, operation: &str) -> String {
        soap_action(&self.endpoint, operation)
    }

    /// Serialized envelope for `call`, without sending it.
    pub fn build_request(&self, call: &OperationCall) -> Result<String, SoapError> {
        if !self.definition.has_operation(call.operation()) {
            return Err(SoapError::UnknownOperation(call.operation().to_string()));
        }
        Ok(build_soap_request(self.definition.target_namespace(), call)?)
    }

    /// Invoque une opération
    ///
    /// * `operation` - Nom de l'opération (utilisé pour le `SOAPAction`)
    /// * `title` - Nom de l'élément enveloppant les paramètres (vide : `operation`)
    /// * `params` - Paramètres, dans l'ordre d'émission
    pub fn invoke(
        &self,
        operation: &str,
        title: &str,
        params: &Params,
    ) -> Result<SoapResponse, SoapError> {
        self.call(&OperationCall::new(operation, title, params.clone()))
    }

    /// Runs one pass of the pipeline for `call`.
    pub fn call(&self, call: &OperationCall) -> Result<SoapResponse, SoapError> {
        let operation = call.operation();

        let payload = self.build_request(call)?;
        debug!(operation, state = "built", size = payload.len());

        let action = self.soap_action(operation);
        let raw = self.transport.post(&SoapRequest {
            endpoint: &self.endpoint,
            soap_action: &action,
            payload: payload.as_bytes(),
        })?;
        debug!(operation, state = "sent", status = raw.status);

        if !(200..300).contains(&raw.status) {
            warn!(
                operation,
                status = raw.status,
                "Non-success HTTP status, parsing body anyway"
            );
        }

        let envelope = parse_soap_envelope(&raw.body)?;
        debug!(operation, state = "parsed", size = envelope.body.content.len());

        if let Some(fault) = envelope.body.fault()? {
            warn!(operation, code = %fault.fault_code, "SOAP fault: {}", fault.fault_string);
            return Err(SoapError::Fault(fault));
        }

        debug!(operation, state = "result_available");
        Ok(SoapResponse::new(
            operation,
            raw.status,
            envelope.body,
            self.filters.get(operation),
        ))
    }
}

/// Session avec état : garde le résultat de la dernière invocation
///
/// `invoke` prend `&mut self` : deux invocations ne peuvent pas se
/// chevaucher sur la même session. Pour partager une session entre threads,
/// il faut la placer derrière un `Mutex`.
#[derive(Debug)]
pub struct SoapSession {
    client: Arc<SoapClient>,
    last: Option<SoapResponse>,
}

impl SoapSession {
    pub fn new(client: Arc<SoapClient>) -> Self {
        Self { client, last: None }
    }

    pub fn client(&self) -> &SoapClient {
        &self.client
    }

    /// Runs the pipeline and retains the Result Body.
    ///
    /// Any failure (fault included) clears the retained result.
    pub fn invoke(&mut self, operation: &str, title: &str, params: &Params) -> Result<(), SoapError> {
        self.last = None;
        let response = self.client.invoke(operation, title, params)?;
        self.last = Some(response);
        Ok(())
    }

    /// Last successful response, if any.
    pub fn last_response(&self) -> Option<&SoapResponse> {
        self.last.as_ref()
    }

    pub fn extract_text(&self) -> Result<String, SoapError> {
        self.last.as_ref().ok_or(SoapError::EmptyBody)?.text()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, SoapError> {
        self.last.as_ref().ok_or(SoapError::EmptyBody)?.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::StaticDefinition;

    fn definition() -> Arc<dyn ServiceDefinition> {
        Arc::new(StaticDefinition::new("urn:svc").with_operation("Execute"))
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(SoapClient::new(definition(), "http://localhost:1/soap").is_ok());
        assert!(SoapClient::new(definition(), "https://example.com/ws").is_ok());

        assert!(matches!(
            SoapClient::new(definition(), "not a url"),
            Err(SoapError::Configuration(_))
        ));
        assert!(matches!(
            SoapClient::new(definition(), "ftp://example.com/ws"),
            Err(SoapError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_operation() {
        let client = SoapClient::new(definition(), "http://localhost:1/soap").unwrap();
        let call = OperationCall::new("Missing", "", Params::new());
        assert!(matches!(
            client.build_request(&call),
            Err(SoapError::UnknownOperation(op)) if op == "Missing"
        ));
    }

    #[test]
    fn test_soap_action() {
        let client = SoapClient::new(definition(), "http://localhost:1/soap").unwrap();
        assert_eq!(client.soap_action("Execute"), "http://localhost:1/soap/Execute");
    }

    #[test]
    fn test_settings_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "client:\n  endpoint: http://example.com/ws\n  timeout_secs: 4\n",
        )
        .unwrap();
        let config = pmoconfig::Config::load_config(dir.path().to_str().unwrap()).unwrap();

        let settings = ClientSettings::from_config(&config).unwrap();
        assert_eq!(settings.endpoint, "http://example.com/ws");
        assert_eq!(settings.timeout, Duration::from_secs(4));
        assert_eq!(settings.max_response_size, 10 * 1024 * 1024);
    }
}
