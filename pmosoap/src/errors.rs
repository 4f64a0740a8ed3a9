use thiserror::Error;

use crate::soap::SoapFault;

/// Erreurs remontées par le client SOAP.
///
/// Chaque étape du pipeline (construction, transport, décodage, fault)
/// a sa propre variante. Aucune erreur n'est avalée ni rejouée.
#[derive(Error, Debug)]
pub enum SoapError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Operation '{0}' is not defined by the service description")]
    UnknownOperation(String),
    #[error("Cannot serialize SOAP envelope: {0}")]
    Serialization(#[from] SerializationError),
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ureq::Error),
    #[error("An error occurred decoding the body: {0}")]
    Decode(#[from] SoapParseError),
    #[error("SOAP fault {0}")]
    Fault(#[from] SoapFault),
    #[error("The operation could not be performed: {0}")]
    OperationFailed(String),
    #[error("Body is empty")]
    EmptyBody,
}

impl SoapError {
    pub fn configuration(message: impl Into<String>) -> Self {
        SoapError::Configuration(message.into())
    }

    pub fn operation_failed(operation: &str) -> Self {
        SoapError::OperationFailed(operation.to_string())
    }

    /// The server-signalled fault, when this error is one.
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            SoapError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Erreur de construction d'enveloppe
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("'{0}' is not a valid XML element name")]
    InvalidName(String),

    #[error("value of '{element}' contains character U+{code:04X} which XML cannot carry")]
    InvalidCharacter { element: String, code: u32 },

    #[error("XML write error: {0}")]
    Xml(#[from] xmltree::Error),

    #[error("envelope is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Erreur de parsing SOAP
#[derive(Debug, Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Response is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("Body does not match the requested type: {0}")]
    Deserialize(#[from] quick_xml::de::DeError),
}
