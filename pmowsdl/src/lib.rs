//! # pmowsdl - Descriptions de service WSDL 1.1
//!
//! Charge un document WSDL (HTTP, `file://` ou chemin local) et le
//! représente sous forme de [`Definitions`], utilisable directement comme
//! [`pmosoap::ServiceDefinition`].
//!
//! ```no_run
//! use pmosoap::{ClientSettings, Params};
//!
//! let settings = ClientSettings::new("http://localhost:8080/calc");
//! let client = pmowsdl::soap_client("http://localhost:8080/calc?wsdl", &settings)?;
//! let response = client.invoke("Add", "", &Params::from([("a", "1"), ("b", "2")]))?;
//! println!("{}", response.text()?);
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

mod definitions;
mod errors;
pub mod model;
mod parser;

use std::sync::Arc;

use pmosoap::{ClientSettings, SoapClient, SoapError};

pub use definitions::Definitions;
pub use errors::WsdlError;
pub use model::{Binding, BindingOperation, Message, Operation, Part, Port, PortType, Service};

/// Construit un client à partir d'une description WSDL et d'un endpoint
///
/// La description est chargée immédiatement ; l'endpoint
/// (`settings.endpoint`) est seulement validé. Tout échec de chargement est
/// une erreur de configuration.
pub fn soap_client(wsdl: &str, settings: &ClientSettings) -> Result<SoapClient, SoapError> {
    let definitions = Definitions::load(wsdl, settings.timeout).map_err(|e| {
        SoapError::configuration(format!("cannot load service description '{wsdl}': {e}"))
    })?;
    SoapClient::with_settings(Arc::new(definitions), settings)
}
