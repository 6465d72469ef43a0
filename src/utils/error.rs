use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("XML decoding failed: {0}")]
    XmlError(#[from] quick_xml::DeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unexpected file name: {file}")]
    UnexpectedFileName { file: String },

    #[error("Unable to create output file {file}: {message}")]
    OutputCreation { file: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// Per-attachment failure. Collected by the image pass, never propagated.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Error decoding base64 image {path}: {source}")]
    Base64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Error writing image {path} to file: {source}")]
    Write {
        path: String,
        #[source]
        source: EtlError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::TomlError(_) => ErrorCategory::Configuration,
            EtlError::XmlError(_) | EtlError::UnexpectedFileName { .. } => ErrorCategory::Input,
            EtlError::IoError(_)
            | EtlError::CsvError(_)
            | EtlError::ZipError(_)
            | EtlError::OutputCreation { .. } => ErrorCategory::Output,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::UnexpectedFileName { .. } => ErrorSeverity::Low,
            EtlError::OutputCreation { .. } | EtlError::ZipError(_) => ErrorSeverity::Medium,
            EtlError::XmlError(_)
            | EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::TomlError(_) => ErrorSeverity::High,
            EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command-line flags or the TOML configuration file"
            }
            ErrorCategory::Input => {
                "Make sure the file is an unmodified SMS Backup & Restore export named sms-*.xml or calls-*.xml"
            }
            ErrorCategory::Output => {
                "Check that the output directory exists, is writable and has free space"
            }
            ErrorCategory::Processing => "Re-run with --verbose and inspect the log output",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::XmlError(e) => format!("The backup file could not be decoded: {}", e),
            EtlError::UnexpectedFileName { file } => format!(
                "Skipping {}: expected a file named sms-*.xml or calls-*.xml",
                file
            ),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            EtlError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let skipped = EtlError::UnexpectedFileName {
            file: "notes.xml".to_string(),
        };
        assert_eq!(skipped.severity().exit_code(), 0);

        let bad_config = EtlError::MissingConfigError {
            field: "input.files".to_string(),
        };
        assert_eq!(bad_config.category(), ErrorCategory::Configuration);
        assert_eq!(bad_config.severity().exit_code(), 1);

        let io = EtlError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message_names_field() {
        let err = EtlError::InvalidConfigValueError {
            field: "output.path".to_string(),
            value: "".to_string(),
            reason: "Path cannot be empty".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Invalid setting 'output.path': Path cannot be empty"
        );
    }
}
