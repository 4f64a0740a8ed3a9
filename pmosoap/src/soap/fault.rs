//! SOAP Faults

use thiserror::Error;
use xmltree::{Element, XMLNode};

use super::fragment::read_fragment;
use super::{ENVELOPE_PREFIX, SOAP_ENVELOPE_NS};
use crate::errors::{SerializationError, SoapParseError};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("[{fault_code}]: {fault_string}")]
pub struct SoapFault {
    /// Code d'erreur (ex: "SOAP-ENV:Client", "Server.InvalidParam")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Émetteur du fault, si précisé
    pub fault_actor: Option<String>,

    /// Texte du bloc `detail`, si présent
    pub detail: Option<String>,
}

impl SoapFault {
    /// Crée un fault SOAP simple
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
            fault_actor: None,
            detail: None,
        }
    }

    /// Ajoute un texte de détail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Cherche un Fault dans le contenu brut d'un Body
///
/// Le premier élément du corps doit s'appeler `Fault` (quel que soit son
/// préfixe) et porter un `faultcode` non vide. Tout autre contenu n'est pas
/// un fault.
pub fn detect_fault(content: &[u8]) -> Result<Option<SoapFault>, SoapParseError> {
    let Some(fragment) = read_fragment(content)? else {
        return Ok(None);
    };

    if fragment.root != "Fault" {
        return Ok(None);
    }

    let fault_code = fragment.child("faultcode").unwrap_or_default().trim();
    if fault_code.is_empty() {
        return Ok(None);
    }

    let optional = |name: &str| {
        fragment
            .child(name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(Some(SoapFault {
        fault_code: fault_code.to_string(),
        fault_string: fragment
            .child("faultstring")
            .unwrap_or_default()
            .trim()
            .to_string(),
        fault_actor: optional("faultactor"),
        detail: optional("detail"),
    }))
}

/// Construit une enveloppe SOAP contenant un Fault
///
/// Utile côté serveur et pour simuler un service dans les tests.
pub fn build_soap_fault(fault: &SoapFault) -> Result<String, SerializationError> {
    fn text_element(name: &str, text: &str) -> XMLNode {
        let mut elem = Element::new(name);
        elem.children.push(XMLNode::Text(text.to_string()));
        XMLNode::Element(elem)
    }

    let mut fault_elem = Element::new(&format!("{ENVELOPE_PREFIX}:Fault"));
    fault_elem
        .children
        .push(text_element("faultcode", &fault.fault_code));
    fault_elem
        .children
        .push(text_element("faultstring", &fault.fault_string));
    if let Some(actor) = &fault.fault_actor {
        fault_elem.children.push(text_element("faultactor", actor));
    }
    if let Some(detail) = &fault.detail {
        fault_elem.children.push(text_element("detail", detail));
    }

    let mut body = Element::new(&format!("{ENVELOPE_PREFIX}:Body"));
    body.children.push(XMLNode::Element(fault_elem));

    let mut envelope = Element::new(&format!("{ENVELOPE_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{ENVELOPE_PREFIX}"),
        SOAP_ENVELOPE_NS.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_fault() {
        let body = br#"
  <SOAP-ENV:Fault>
    <faultcode>Server.InvalidParam</faultcode>
    <faultstring>bad value</faultstring>
    <detail><reason>name &amp; password</reason></detail>
  </SOAP-ENV:Fault>"#;

        let fault = detect_fault(body).unwrap().unwrap();
        assert_eq!(fault.fault_code, "Server.InvalidParam");
        assert_eq!(fault.fault_string, "bad value");
        assert_eq!(fault.detail.as_deref(), Some("name & password"));
        assert_eq!(fault.fault_actor, None);
        assert_eq!(fault.to_string(), "[Server.InvalidParam]: bad value");
    }

    #[test]
    fn test_fault_without_code_is_not_a_fault() {
        let body = b"<Fault><faultcode>  </faultcode><faultstring>x</faultstring></Fault>";
        assert_eq!(detect_fault(body).unwrap(), None);
    }

    #[test]
    fn test_result_is_not_a_fault() {
        let body = b"<result><faultcode>looks like one</faultcode></result>";
        assert_eq!(detect_fault(body).unwrap(), None);
        assert_eq!(detect_fault(b"").unwrap(), None);
    }

    #[test]
    fn test_build_fault_is_detected() {
        let fault = SoapFault::new("SOAP-ENV:Client", "Invalid Action").with_detail("401");
        let xml = build_soap_fault(&fault).unwrap();

        assert!(xml.contains("<SOAP-ENV:Fault>"));
        assert!(xml.contains("<faultcode>SOAP-ENV:Client</faultcode>"));
        assert!(xml.contains("<faultstring>Invalid Action</faultstring>"));

        let envelope = crate::soap::parse_soap_envelope(xml.as_bytes()).unwrap();
        assert_eq!(envelope.body.fault().unwrap(), Some(fault));
    }
}
