use std::path::Path;
use std::time::Duration;

use pmosoap::ServiceDefinition;
use tracing::{debug, info};
use ureq::Agent;
use url::Url;

use crate::errors::WsdlError;
use crate::model::{Binding, Message, Operation, PortType, Service};
use crate::parser::parse_definitions;

/// Description de service chargée depuis un document WSDL
///
/// Immuable une fois construite ; elle peut être partagée entre plusieurs
/// clients via un `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    pub(crate) name: Option<String>,
    pub(crate) target_namespace: String,
    pub(crate) messages: Vec<Message>,
    pub(crate) port_types: Vec<PortType>,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) services: Vec<Service>,
}

impl Definitions {
    /// Parses a WSDL document held in memory.
    pub fn parse(content: &[u8]) -> Result<Self, WsdlError> {
        parse_definitions(content)
    }

    /// Charge une description depuis `location`
    ///
    /// `location` peut être une URL `http(s)://`, une URL `file://` ou un
    /// simple chemin. `timeout` ne s'applique qu'au téléchargement HTTP.
    pub fn load(location: &str, timeout: Duration) -> Result<Self, WsdlError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WsdlError::InvalidLocation(location.to_string()));
        }

        let content = match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => fetch(location, timeout)?,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| WsdlError::InvalidLocation(location.to_string()))?;
                std::fs::read(path)?
            }
            Ok(_) => return Err(WsdlError::InvalidLocation(location.to_string())),
            Err(_) => std::fs::read(Path::new(location))?,
        };

        let definitions = Self::parse(&content)?;
        info!(
            "Loaded service description from {} ({} operations)",
            location,
            definitions.operation_names().len()
        );
        Ok(definitions)
    }

    /// `name` attribute of the root element.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn port_types(&self) -> &[PortType] {
        &self.port_types
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Abstract operation named `name`, from the first port type declaring it.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.port_types
            .iter()
            .flat_map(|pt| pt.operations.iter())
            .find(|op| op.name == name)
    }

    /// Noms des opérations, dans l'ordre du document et sans doublon
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for op in self.port_types.iter().flat_map(|pt| pt.operations.iter()) {
            if !names.contains(&op.name.as_str()) {
                names.push(&op.name);
            }
        }
        names
    }

    /// First `soap:address` location declared by a service port.
    pub fn endpoint(&self) -> Option<&str> {
        self.services
            .iter()
            .flat_map(|s| s.ports.iter())
            .find_map(|p| p.address.as_deref())
    }

    /// `soapAction` declared by the binding of `operation`, if any.
    pub fn soap_action(&self, operation: &str) -> Option<&str> {
        self.bindings
            .iter()
            .filter_map(|b| b.operation(operation))
            .find_map(|op| op.soap_action.as_deref())
    }
}

impl ServiceDefinition for Definitions {
    fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    fn has_operation(&self, operation: &str) -> bool {
        self.operation(operation).is_some()
            || self
                .bindings
                .iter()
                .any(|b| b.operation(operation).is_some())
    }
}

fn fetch(location: &str, timeout: Duration) -> Result<Vec<u8>, WsdlError> {
    debug!("Fetching service description at {}", location);

    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: Agent = config.into();

    let mut response = agent.get(location).call()?;
    let body = response.body_mut().read_to_vec()?;
    Ok(body)
}
