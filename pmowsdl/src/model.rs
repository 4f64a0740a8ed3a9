//! Modèle d'une description de service WSDL 1.1
//!
//! Le modèle est figé une fois construit : toutes les références
//! (`message`, `type`, `binding`) sont stockées sans leur préfixe.

/// `<part>` d'un message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub element: Option<String>,
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub parts: Vec<Part>,
}

/// Opération abstraite d'un `portType`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub documentation: Option<String>,
    /// Message d'entrée
    pub input: Option<String>,
    /// Message de sortie
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortType {
    pub name: String,
    pub operations: Vec<Operation>,
}

/// Opération d'un binding, avec ses attributs SOAP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingOperation {
    pub name: String,
    pub soap_action: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub port_type: String,
    pub style: Option<String>,
    pub transport: Option<String>,
    pub operations: Vec<BindingOperation>,
}

impl Binding {
    pub fn operation(&self, name: &str) -> Option<&BindingOperation> {
        self.operations.iter().find(|op| op.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub binding: String,
    /// `location` de l'élément `soap:address`
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub documentation: Option<String>,
    pub ports: Vec<Port>,
}

/// Strips the namespace prefix of a qualified reference (`tns:Foo` -> `Foo`).
pub(crate) fn strip_prefix(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}
