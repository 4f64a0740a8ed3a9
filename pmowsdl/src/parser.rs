use std::borrow::Cow;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Error as XmlError, Reader};
use tracing::debug;

use crate::definitions::Definitions;
use crate::errors::WsdlError;
use crate::model::{
    Binding, BindingOperation, Message, Operation, Part, Port, PortType, Service, strip_prefix,
};

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Value of the attribute whose local name is `name`, unescaped.
fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, WsdlError> {
    for attr in e.attributes() {
        let attr = attr.map_err(XmlError::from)?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(XmlError::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn reference(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, WsdlError> {
    Ok(attribute(e, name)?.map(|r| strip_prefix(&r).to_string()))
}

/// Parser state: the path of local names from the root, and the text being
/// collected for the innermost `documentation` element.
#[derive(Default)]
struct State {
    stack: Vec<String>,
    documentation: Option<String>,
    defs: Definitions,
}

impl State {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn grandparent(&self) -> Option<&str> {
        self.stack.iter().rev().nth(1).map(String::as_str)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), WsdlError> {
        let name = local_name(e);
        let parent = self.stack.last().map(String::as_str);
        let grandparent = self.stack.iter().rev().nth(1).map(String::as_str);
        let defs = &mut self.defs;

        match (name.as_str(), parent) {
            ("definitions", None) => {
                defs.name = attribute(e, "name")?;
                defs.target_namespace = attribute(e, "targetNamespace")?.unwrap_or_default();
            }
            ("message", Some("definitions")) => defs.messages.push(Message {
                name: attribute(e, "name")?.unwrap_or_default(),
                parts: Vec::new(),
            }),
            ("part", Some("message")) => {
                if let Some(message) = defs.messages.last_mut() {
                    message.parts.push(Part {
                        name: attribute(e, "name")?.unwrap_or_default(),
                        element: reference(e, "element")?,
                        type_name: reference(e, "type")?,
                    });
                }
            }
            ("portType", Some("definitions")) => defs.port_types.push(PortType {
                name: attribute(e, "name")?.unwrap_or_default(),
                operations: Vec::new(),
            }),
            ("operation", Some("portType")) => {
                if let Some(port_type) = defs.port_types.last_mut() {
                    port_type.operations.push(Operation {
                        name: attribute(e, "name")?.unwrap_or_default(),
                        ..Default::default()
                    });
                }
            }
            ("input" | "output", Some("operation")) if grandparent == Some("portType") => {
                let message = reference(e, "message")?;
                if let Some(op) = defs
                    .port_types
                    .last_mut()
                    .and_then(|pt| pt.operations.last_mut())
                {
                    if name == "input" {
                        op.input = message;
                    } else {
                        op.output = message;
                    }
                }
            }
            ("binding", Some("definitions")) => defs.bindings.push(Binding {
                name: attribute(e, "name")?.unwrap_or_default(),
                port_type: reference(e, "type")?.unwrap_or_default(),
                ..Default::default()
            }),
            // soap:binding
            ("binding", Some("binding")) => {
                if let Some(binding) = defs.bindings.last_mut() {
                    binding.style = attribute(e, "style")?;
                    binding.transport = attribute(e, "transport")?;
                }
            }
            ("operation", Some("binding")) => {
                if let Some(binding) = defs.bindings.last_mut() {
                    binding.operations.push(BindingOperation {
                        name: attribute(e, "name")?.unwrap_or_default(),
                        ..Default::default()
                    });
                }
            }
            // soap:operation
            ("operation", Some("operation")) if grandparent == Some("binding") => {
                if let Some(op) = defs
                    .bindings
                    .last_mut()
                    .and_then(|b| b.operations.last_mut())
                {
                    op.soap_action = attribute(e, "soapAction")?;
                    op.style = attribute(e, "style")?;
                }
            }
            ("service", Some("definitions")) => defs.services.push(Service {
                name: attribute(e, "name")?.unwrap_or_default(),
                ..Default::default()
            }),
            ("port", Some("service")) => {
                if let Some(service) = defs.services.last_mut() {
                    service.ports.push(Port {
                        name: attribute(e, "name")?.unwrap_or_default(),
                        binding: reference(e, "binding")?.unwrap_or_default(),
                        address: None,
                    });
                }
            }
            // soap:address
            ("address", Some("port")) => {
                if let Some(port) = defs.services.last_mut().and_then(|s| s.ports.last_mut()) {
                    port.address = attribute(e, "location")?;
                }
            }
            ("documentation", _) => self.documentation = Some(String::new()),
            _ => {}
        }
        Ok(())
    }

    fn close_documentation(&mut self) {
        let Some(text) = self.documentation.take() else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let text = text.to_string();
        if self.parent() == Some("operation") && self.grandparent() == Some("portType") {
            if let Some(op) = self
                .defs
                .port_types
                .last_mut()
                .and_then(|pt| pt.operations.last_mut())
            {
                op.documentation = Some(text);
            }
        } else if self.parent() == Some("service") {
            if let Some(service) = self.defs.services.last_mut() {
                service.documentation = Some(text);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(doc) = self.documentation.as_mut() {
            doc.push_str(text);
        }
    }
}

/// Parses a WSDL 1.1 document.
///
/// Elements are matched on their local name, so any prefix (or none) is
/// accepted for the WSDL and SOAP binding vocabularies.
pub(crate) fn parse_definitions(content: &[u8]) -> Result<Definitions, WsdlError> {
    let mut reader = Reader::from_reader(content);

    let mut state = State::default();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if !seen_root && local_name(&e) != "definitions" {
                    return Err(WsdlError::MissingField("definitions"));
                }
                seen_root = true;
                state.open(&e)?;
                state.stack.push(local_name(&e));
            }
            Event::Empty(e) => {
                if !seen_root {
                    return Err(WsdlError::MissingField("definitions"));
                }
                if local_name(&e) != "documentation" {
                    state.open(&e)?;
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                state.stack.pop();
                if name == "documentation" {
                    state.close_documentation();
                }
            }
            Event::Text(e) => {
                let text = e.decode().map_err(XmlError::Encoding)?;
                state.push_text(&text);
            }
            Event::CData(e) => {
                let text = e.decode().map_err(XmlError::Encoding)?;
                state.push_text(&text);
            }
            Event::GeneralRef(e) => {
                let text: Cow<'_, str> = match e.resolve_char_ref()? {
                    Some(ch) => Cow::Owned(ch.to_string()),
                    None => {
                        let name = e.decode().map_err(XmlError::Encoding)?;
                        match resolve_predefined_entity(&name) {
                            Some(value) => Cow::Borrowed(value),
                            None => Cow::Owned(format!("&{name};")),
                        }
                    }
                };
                state.push_text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(WsdlError::MissingField("definitions"));
    }

    let defs = state.defs;
    debug!(
        target_namespace = %defs.target_namespace,
        messages = defs.messages.len(),
        port_types = defs.port_types.len(),
        bindings = defs.bindings.len(),
        services = defs.services.len(),
        "Service description parsed"
    );
    Ok(defs)
}
