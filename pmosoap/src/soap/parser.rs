//! Parser SOAP pour les réponses

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Error as XmlError, Reader};

use super::envelope::NamespaceDecl;
use super::fragment::local_name;
use super::{SoapBody, SoapEnvelope, SoapHeader};
use crate::errors::SoapParseError;

/// Parse une enveloppe SOAP complète
///
/// Le contenu du Body est recopié tel quel : le parser n'interprète jamais
/// le schéma de la réponse.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let mut reader = Reader::from_reader(xml);

    // Vérifier que la racine est bien une Envelope
    let root = loop {
        match reader.read_event()? {
            Event::Start(e) => break e,
            Event::Empty(_) | Event::End(_) | Event::Eof => {
                return Err(SoapParseError::MissingEnvelope);
            }
            Event::Text(t) if !t.iter().all(u8::is_ascii_whitespace) => {
                return Err(SoapParseError::MissingEnvelope);
            }
            _ => {}
        }
    };
    if local_name(&root) != "Envelope" {
        return Err(SoapParseError::MissingEnvelope);
    }

    let mut envelope = SoapEnvelope {
        namespaces: namespace_decls(&root)?,
        ..SoapEnvelope::default()
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let end = e.to_end().into_owned();
                let span = reader.read_to_end(end.name())?;
                let span = span.start as usize..span.end as usize;
                match local_name(&e).as_str() {
                    "Header" if envelope.header.is_none() => {
                        envelope.header = Some(SoapHeader {
                            content: xml[span].to_vec(),
                        });
                    }
                    "Body" => {
                        envelope.body = SoapBody {
                            content: xml[span].to_vec(),
                            namespaces: scoped_decls(&envelope.namespaces, &e)?,
                        };
                        return Ok(envelope);
                    }
                    _ => {}
                }
            }
            Event::Empty(e) if local_name(&e) == "Body" => {
                envelope.body = SoapBody {
                    content: Vec::new(),
                    namespaces: scoped_decls(&envelope.namespaces, &e)?,
                };
                return Ok(envelope);
            }
            Event::End(_) | Event::Eof => return Err(SoapParseError::MissingBody),
            _ => {}
        }
    }
}

/// `xmlns` / `xmlns:prefix` attributes of an element.
fn namespace_decls(e: &BytesStart<'_>) -> Result<Vec<NamespaceDecl>, SoapParseError> {
    let mut decls = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(XmlError::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let prefix = match key.strip_prefix("xmlns") {
            Some("") => String::new(),
            Some(rest) => match rest.strip_prefix(':') {
                Some(prefix) => prefix.to_string(),
                None => continue,
            },
            None => continue,
        };
        let raw = String::from_utf8_lossy(&attr.value);
        let uri = unescape(&raw).map_err(XmlError::from)?.into_owned();
        decls.push((prefix, uri));
    }
    Ok(decls)
}

/// Envelope declarations overridden by the Body's own ones.
fn scoped_decls(
    outer: &[NamespaceDecl],
    body: &BytesStart<'_>,
) -> Result<Vec<NamespaceDecl>, SoapParseError> {
    let inner = namespace_decls(body)?;
    let mut decls: Vec<NamespaceDecl> = outer
        .iter()
        .filter(|(prefix, _)| !inner.iter().any(|(p, _)| p == prefix))
        .cloned()
        .collect();
    decls.extend(inner);
    Ok(decls)
}
