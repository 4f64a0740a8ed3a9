//! Construction des requêtes SOAP

use xmltree::{Element, XMLNode};

use super::{ENVELOPE_PREFIX, SOAP_ENVELOPE_NS, TARGET_PREFIX};
use crate::errors::SerializationError;
use crate::params::OperationCall;

fn build_soap_envelope_with_body(body_child: Element) -> Result<String, SerializationError> {
    // Body
    let mut body = Element::new(&format!("{ENVELOPE_PREFIX}:Body"));
    body.children.push(XMLNode::Element(body_child));

    // Envelope
    let mut envelope = Element::new(&format!("{ENVELOPE_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{ENVELOPE_PREFIX}"),
        SOAP_ENVELOPE_NS.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf)?)
}

/// Construit une requête SOAP pour un appel d'opération
///
/// # Arguments
///
/// * `target_namespace` - Namespace cible du service (vide : éléments non qualifiés)
/// * `call` - Opération, titre d'enveloppe et paramètres
///
/// # Returns
///
/// XML SOAP sérialisé. Les paramètres sont émis dans l'ordre fourni.
pub fn build_soap_request(
    target_namespace: &str,
    call: &OperationCall,
) -> Result<String, SerializationError> {
    let qualify = |name: &str| {
        if target_namespace.is_empty() {
            name.to_string()
        } else {
            format!("{TARGET_PREFIX}:{name}")
        }
    };

    let element_name = call.element_name();
    check_name(element_name)?;

    let mut request_elem = Element::new(&qualify(element_name));
    if !target_namespace.is_empty() {
        request_elem.attributes.insert(
            format!("xmlns:{TARGET_PREFIX}"),
            target_namespace.to_string(),
        );
    }

    for (name, value) in call.params().iter() {
        check_name(name)?;
        check_text(name, value)?;

        let mut child = Element::new(&qualify(name));
        if !value.is_empty() {
            child.children.push(XMLNode::Text(value.to_string()));
        }
        request_elem.children.push(XMLNode::Element(child));
    }

    build_soap_envelope_with_body(request_elem)
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c == '-' || c == '.' || c.is_numeric()
}

/// Element names are emitted verbatim, so they are checked here.
fn check_name(name: &str) -> Result<(), SerializationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => is_name_start(first) && chars.all(is_name_char),
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SerializationError::InvalidName(name.to_string()))
    }
}

/// XML 1.0 cannot carry these characters, escaped or not.
fn check_text(element: &str, value: &str) -> Result<(), SerializationError> {
    let forbidden = value.chars().find(|&c| {
        !matches!(c, '\t' | '\n' | '\r')
            && (c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}')
    });

    match forbidden {
        Some(c) => Err(SerializationError::InvalidCharacter {
            element: element.to_string(),
            code: c as u32,
        }),
        None => Ok(()),
    }
}
