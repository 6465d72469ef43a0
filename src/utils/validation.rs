use crate::utils::error::{EtlError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// The output directory has to exist already; it is never created implicitly.
pub fn validate_output_dir(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !Path::new(path).is_dir() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Invalid output directory path".to_string(),
        });
    }
    Ok(())
}

pub fn validate_input_files(field_name: &str, files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(EtlError::MissingConfigError {
            field: format!("{} (path to sms-*.xml / calls-*.xml backup file(s))", field_name),
        });
    }

    for file in files {
        validate_path(field_name, file)?;

        let path = Path::new(file);
        if path.is_dir() {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "XML path must point to a specific file, not to a directory".to_string(),
            });
        }
        if !path.is_file() {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File does not exist".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
