use thiserror::Error;

#[derive(Debug, Error)]
pub enum SectionalError {
    #[error("Boolean field '{section}.{field}' cannot default to Required; booleans are toggled by presence")]
    InvalidBooleanDefault { section: String, field: String },

    #[error("Boolean field '{section}.{field}' is a toggle and cannot take {option}")]
    InvalidToggleOption {
        section: String,
        field: String,
        option: String,
    },

    #[error("Required value not supplied: {path}")]
    Required { path: String },

    #[error("Flag '{flag}' for field '{field}' is already claimed by '{owner}'")]
    DuplicateFlag {
        flag: String,
        field: String,
        owner: String,
    },

    #[error("Invalid extra flag '{alias}' for field '{field}'; use '--long' or a single-character '-s'")]
    InvalidAlias { field: String, alias: String },

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),
}
