use std::fmt;

/// Error types for resource export operations
#[derive(Debug)]
pub enum ExportError {
    /// Invalid or missing credentials for the provider
    Authentication(String),

    /// Provider API call failed (network, authorization, CLI failure)
    ProviderApi(String),

    /// Provider returned a response that does not have the expected shape
    MalformedResponse { operation: String, message: String },

    /// A record is missing a field the target schema requires
    Projection {
        resource_type: String,
        resource_id: String,
        field: String,
    },

    /// Base state document cannot be merged into
    UnsupportedState(String),

    /// Template registration or rendering failed
    Template(String),

    /// Configuration file parsing error
    ConfigParse(String),

    /// Invalid input or parameter
    InvalidInput(String),

    /// General I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(String),
}

impl ExportError {
    /// Shorthand for a projection defect on a single record
    pub fn missing_field(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        ExportError::Projection {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Authentication(msg) => {
                write!(f, "Authentication failed: {}", msg)
            }
            ExportError::ProviderApi(msg) => {
                write!(f, "Provider API error: {}", msg)
            }
            ExportError::MalformedResponse { operation, message } => {
                write!(f, "Unexpected response from '{}': {}", operation, message)
            }
            ExportError::Projection {
                resource_type,
                resource_id,
                field,
            } => {
                write!(
                    f,
                    "Cannot project {} '{}': required field '{}' is missing",
                    resource_type, resource_id, field
                )
            }
            ExportError::UnsupportedState(msg) => {
                write!(f, "Unsupported base state: {}", msg)
            }
            ExportError::Template(msg) => {
                write!(f, "Template error: {}", msg)
            }
            ExportError::ConfigParse(msg) => {
                write!(f, "Failed to parse configuration: {}", msg)
            }
            ExportError::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            ExportError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
            ExportError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::ConfigParse(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

impl From<handlebars::RenderError> for ExportError {
    fn from(err: handlebars::RenderError) -> Self {
        ExportError::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for ExportError {
    fn from(err: handlebars::TemplateError) -> Self {
        ExportError::Template(err.to_string())
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
