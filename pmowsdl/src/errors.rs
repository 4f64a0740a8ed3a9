use thiserror::Error;

#[derive(Debug, Error)]
pub enum WsdlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Failed to read service description: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid service description location '{0}'")]
    InvalidLocation(String),

    #[error("Missing required element: {0}")]
    MissingField(&'static str),
}
