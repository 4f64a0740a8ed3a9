//! # Module SOAP - Simple Object Access Protocol
//!
//! Ce module implémente le cycle de vie d'une enveloppe SOAP côté client :
//! construction de la requête, parsing de la réponse et détection des faults.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction d'enveloppes `SOAP-ENV` qualifiées par le namespace cible
//! - ✅ Parsing d'enveloppes avec capture brute du Body
//! - ✅ Détection et construction des SOAP Faults
//!
//! ## Architecture
//!
//! - [`SoapEnvelope`] : Enveloppe SOAP complète
//! - [`SoapBody`] : Contenu brut du corps
//! - [`SoapFault`] : Erreur SOAP
//!
//! ## Example
//!
//! ```
//! use pmosoap::soap::{build_soap_request, parse_soap_envelope};
//! use pmosoap::{OperationCall, Params};
//!
//! let call = OperationCall::new("Add", "", Params::from([("a", "1"), ("b", "2")]));
//! let request = build_soap_request("urn:calc", &call).unwrap();
//! assert!(request.contains("<ns1:a>1</ns1:a>"));
//!
//! let response = r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
//!   <SOAP-ENV:Body><AddResponse><sum>3</sum></AddResponse></SOAP-ENV:Body>
//! </SOAP-ENV:Envelope>"#;
//!
//! let envelope = parse_soap_envelope(response.as_bytes()).unwrap();
//! assert_eq!(envelope.body.content, b"<AddResponse><sum>3</sum></AddResponse>");
//! assert!(envelope.body.fault().unwrap().is_none());
//! ```

mod builder;
mod envelope;
mod fault;
pub(crate) mod fragment;
mod parser;

pub use builder::build_soap_request;
pub use envelope::{NamespaceDecl, SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, build_soap_fault, detect_fault};
pub use parser::parse_soap_envelope;

/// Namespace des enveloppes SOAP 1.1
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Préfixe utilisé pour l'enveloppe
pub const ENVELOPE_PREFIX: &str = "SOAP-ENV";

/// Préfixe utilisé pour le namespace cible du service
pub const TARGET_PREFIX: &str = "ns1";
