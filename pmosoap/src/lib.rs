//! # pmosoap - Client SOAP générique
//!
//! Construit une enveloppe SOAP pour une opération et ses paramètres,
//! l'envoie en HTTP POST, puis analyse la réponse : soit un fault, remonté
//! comme erreur, soit un Body brut qu'on peut relire en texte ou décoder dans
//! n'importe quel type `serde`.
//!
//! Pipeline d'une invocation :
//!
//! ```text
//! OperationCall ─▶ build_soap_request ─▶ Transport::post ─▶ parse_soap_envelope ─▶ fault ? ─▶ SoapResponse
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pmosoap::{Params, SoapClient, StaticDefinition};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Sum {
//!     value: i64,
//! }
//!
//! let definition = Arc::new(StaticDefinition::new("urn:calc").with_operation("Add"));
//! let client = SoapClient::new(definition, "http://localhost:8080/calc")?;
//!
//! let response = client.invoke("Add", "", &Params::from([("a", "1"), ("b", "2")]))?;
//! let sum: Sum = response.decode()?;
//! println!("1 + 2 = {}", sum.value);
//! # Ok::<(), pmosoap::SoapError>(())
//! ```
//!
//! ## Concurrence
//!
//! [`SoapClient`] n'a pas d'état mutable et peut être partagé. [`SoapSession`]
//! garde le dernier résultat ; ses invocations doivent être sérialisées par
//! l'appelant, ce que `&mut self` impose.

mod client;
mod definition;
mod errors;
pub mod filters;
mod params;
mod response;
pub mod soap;
pub mod transport;

pub use client::{ClientSettings, SoapClient, SoapSession};
pub use definition::{ServiceDefinition, StaticDefinition};
pub use errors::{SerializationError, SoapError, SoapParseError};
pub use filters::{EXECUTE_OPERATION, JournalNumberFilter, TextFilter, TextFilters};
pub use params::{OperationCall, Params};
pub use response::{RESPONSE_ELEMENT, SoapResponse};
pub use soap::SoapFault;
pub use transport::{HttpTransport, RawResponse, SoapRequest, Transport};
