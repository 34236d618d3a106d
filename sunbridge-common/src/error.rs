use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SunbridgeError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Malformed shortcut: {0}")]
    MalformedShortcut(String),

    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),

    #[error("Catalog Parse Error: {0}")]
    CatalogParse(String),

    #[error("Catalog Write Error: {0}")]
    CatalogWrite(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for SunbridgeError {
    fn from(err: std::io::Error) -> Self {
        SunbridgeError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for SunbridgeError {
    fn from(err: serde_json::Error) -> Self {
        SunbridgeError::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SunbridgeError>;
