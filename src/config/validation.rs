use super::models::{Config, StorageProvider};
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Storage provider is blob but no connection string is configured")]
    MissingBlobConnectionString,

    #[error("Template file name must not be empty")]
    EmptyTemplateFileName,

    #[error("Template file name '{0}' must not contain path separators")]
    TemplateFileNameHasSeparator(String),

    #[error("Invalid log level '{0}', expected trace, debug, info, warn or error")]
    InvalidLogLevel(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_storage(config)?;
    validate_template(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.provider == StorageProvider::Blob
        && config
            .storage
            .connection_string
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
    {
        return Err(ValidationError::MissingBlobConnectionString);
    }
    Ok(())
}

fn validate_template(config: &Config) -> Result<(), ValidationError> {
    let name = config.template.file_name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyTemplateFileName);
    }
    if name.contains(['/', '\\']) {
        return Err(ValidationError::TemplateFileNameHasSeparator(name.to_string()));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> Result<(), ValidationError> {
    config
        .logging
        .level
        .parse::<Level>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidLogLevel(config.logging.level.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_blob_requires_connection_string() {
        let mut config = Config::default();
        config.storage.provider = StorageProvider::Blob;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingBlobConnectionString)
        ));

        config.storage.connection_string = Some("   ".to_string());
        assert!(validate(&config).is_err());

        config.storage.connection_string = Some("memory://".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_template_file_name() {
        let mut config = Config::default();
        config.template.file_name = String::new();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyTemplateFileName)
        ));

        config.template.file_name = "nested/template.json".to_string();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::TemplateFileNameHasSeparator(_))
        ));
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        config.logging.level = "WARN".to_string();
        assert!(validate(&config).is_ok());

        config.logging.level = "verbose".to_string();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidLogLevel(level)) if level == "verbose"
        ));
    }
}
