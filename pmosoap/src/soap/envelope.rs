//! Structures de l'enveloppe SOAP

use super::fault::{SoapFault, detect_fault};
use crate::errors::SoapParseError;

/// Déclaration d'espace de noms (`xmlns:prefix="uri"`, préfixe vide pour `xmlns`)
pub type NamespaceDecl = (String, String);

/// Enveloppe SOAP complète
#[derive(Debug, Clone, Default)]
pub struct SoapEnvelope {
    /// Déclarations portées par l'élément Envelope
    pub namespaces: Vec<NamespaceDecl>,

    /// En-tête SOAP optionnel
    pub header: Option<SoapHeader>,

    /// Corps SOAP contenant l'action ou la réponse
    pub body: SoapBody,
}

/// En-tête SOAP
#[derive(Debug, Clone, Default)]
pub struct SoapHeader {
    /// Contenu XML brut de l'en-tête
    pub content: Vec<u8>,
}

/// Corps SOAP
#[derive(Debug, Clone, Default)]
pub struct SoapBody {
    /// Contenu XML brut du corps, octet pour octet
    pub content: Vec<u8>,

    /// Déclarations visibles dans le corps (Envelope puis Body)
    pub namespaces: Vec<NamespaceDecl>,
}

impl SoapEnvelope {
    /// Crée une nouvelle enveloppe SOAP
    pub fn new(body: SoapBody) -> Self {
        Self {
            namespaces: Vec::new(),
            header: None,
            body,
        }
    }

    /// Crée une nouvelle enveloppe avec header
    pub fn with_header(header: SoapHeader, body: SoapBody) -> Self {
        Self {
            namespaces: Vec::new(),
            header: Some(header),
            body,
        }
    }

    /// URI bound to `prefix` on the Envelope element.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

impl SoapBody {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            namespaces: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.iter().all(u8::is_ascii_whitespace)
    }

    /// Fault carried by the body, if any.
    pub fn fault(&self) -> Result<Option<SoapFault>, SoapParseError> {
        detect_fault(&self.content)
    }
}
