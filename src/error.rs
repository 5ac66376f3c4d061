use std::fmt;

/// Custom error types for subprose
#[derive(Debug)]
pub enum SubproseError {
    /// File system related errors
    FileSystem { source: std::io::Error, path: std::path::PathBuf },

    /// Configuration validation errors
    Config { field: String, message: String },

    /// Unsupported file format
    UnsupportedFormat { extension: String, supported: Vec<String> },

    /// General processing error
    Processing { message: String },
}

impl fmt::Display for SubproseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubproseError::FileSystem { source, path } => {
                write!(f, "File system error for '{}': {}", path.display(), source)
            }
            SubproseError::Config { field, message } => {
                write!(f, "Configuration error in '{}': {}", field, message)
            }
            SubproseError::UnsupportedFormat { extension, supported } => {
                write!(
                    f,
                    "Unsupported file format '{}'. Supported formats: {}",
                    extension,
                    supported.join(", ")
                )
            }
            SubproseError::Processing { message } => {
                write!(f, "Processing error: {}", message)
            }
        }
    }
}

impl std::error::Error for SubproseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubproseError::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for subprose operations
pub type Result<T> = std::result::Result<T, SubproseError>;

/// Helper function to create configuration errors
pub fn config_error(field: impl Into<String>, message: impl Into<String>) -> SubproseError {
    SubproseError::Config {
        field: field.into(),
        message: message.into(),
    }
}

/// Helper function to create file system errors
pub fn fs_error(source: std::io::Error, path: std::path::PathBuf) -> SubproseError {
    SubproseError::FileSystem { source, path }
}

/// Trait for converting io errors to SubproseError
pub trait IntoSubproseError<T> {
    fn with_path(self, path: impl Into<std::path::PathBuf>) -> Result<T>;
}

impl<T> IntoSubproseError<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: impl Into<std::path::PathBuf>) -> Result<T> {
        self.map_err(|e| fs_error(e, path.into()))
    }
}

// Background workers report through anyhow
impl From<anyhow::Error> for SubproseError {
    fn from(err: anyhow::Error) -> Self {
        SubproseError::Processing {
            message: format!("{:#}", err),
        }
    }
}
