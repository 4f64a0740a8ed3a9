//! Résultat d'une invocation
//!
//! Un [`SoapResponse`] garde le contenu brut du Body. Chaque lecture
//! (texte ou décodage typé) relit ces mêmes octets : on peut lire autant de
//! fois qu'on veut, dans n'importe quel ordre.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{SoapError, SoapParseError};
use crate::filters::TextFilter;
use crate::soap::fragment::read_fragment;
use crate::soap::{NamespaceDecl, SoapBody, detect_fault};

/// Child of the first body element holding the text returned by
/// [`SoapResponse::text`].
pub const RESPONSE_ELEMENT: &str = "response";

/// Immutable result of one successful invocation.
#[derive(Debug, Clone)]
pub struct SoapResponse {
    operation: String,
    status: u16,
    body: SoapBody,
    filter: Option<Arc<dyn TextFilter>>,
}

impl SoapResponse {
    pub fn new(
        operation: impl Into<String>,
        status: u16,
        body: SoapBody,
        filter: Option<Arc<dyn TextFilter>>,
    ) -> Self {
        Self {
            operation: operation.into(),
            status,
            body,
            filter,
        }
    }

    /// Operation that produced this response.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// HTTP status of the exchange.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw inner content of the response Body.
    pub fn body(&self) -> &[u8] {
        &self.body.content
    }

    /// Namespace declarations in scope for the body content.
    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.body.namespaces
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body content as UTF-8 text, untouched.
    pub fn body_str(&self) -> Result<&str, SoapError> {
        self.non_empty_body()
    }

    fn non_empty_body(&self) -> Result<&str, SoapError> {
        if self.is_empty() {
            return Err(SoapError::EmptyBody);
        }
        Ok(std::str::from_utf8(&self.body.content).map_err(SoapParseError::from)?)
    }

    /// Décode le Body dans un type quelconque
    ///
    /// Le Body est d'abord relu à la recherche d'un fault, qui est toujours
    /// prioritaire sur le résultat.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, SoapError> {
        let content = self.non_empty_body()?;

        if let Some(fault) = detect_fault(content.as_bytes())? {
            return Err(SoapError::Fault(fault));
        }

        let value = quick_xml::de::from_str(content.trim()).map_err(SoapParseError::from)?;
        Ok(value)
    }

    /// Extrait le texte de l'élément `response`
    ///
    /// Le filtre enregistré pour l'opération d'origine, s'il existe, est
    /// appliqué au texte extrait.
    pub fn text(&self) -> Result<String, SoapError> {
        let content = self.non_empty_body()?;

        let text = read_fragment(content.as_bytes())?
            .and_then(|fragment| fragment.child(RESPONSE_ELEMENT).map(str::to_string))
            .unwrap_or_default();

        match &self.filter {
            Some(filter) => {
                debug!(operation = %self.operation, "Applying text filter");
                filter.apply(&self.operation, text)
            }
            None => Ok(text),
        }
    }
}
