use anyhow::Error;
use dealhook_bitrix::{BitrixError, EnrichError};
use dealhook_config::ConfigError;
use dealhook_core::CoreError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(enrich_err) = cause.downcast_ref::<EnrichError>() {
            return ExitCode::from(enrich_exit_code(enrich_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(bitrix_err) = cause.downcast_ref::<BitrixError>() {
            return ExitCode::from(bitrix_exit_code(bitrix_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn enrich_exit_code(err: &EnrichError) -> u8 {
    match err {
        EnrichError::InvalidDealId(_) => EXIT_INVALID_INPUT,
        EnrichError::DealNotFound(_) => EXIT_NOT_FOUND,
        EnrichError::Gateway(err) => bitrix_exit_code(err),
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir | ConfigError::Read { .. } => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::MissingWebhookUrl
        | ConfigError::InvalidWebhookUrl(_)
        | ConfigError::InvalidListenAddress(_)
        | ConfigError::InvalidTimeout { .. }
        | ConfigError::EmptyFieldList(_)
        | ConfigError::EmptyFieldId(_)
        | ConfigError::Core(_)
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn bitrix_exit_code(err: &BitrixError) -> u8 {
    match err {
        BitrixError::Url(_) => EXIT_INVALID_INPUT,
        BitrixError::Http(_)
        | BitrixError::Status(_)
        | BitrixError::Api { .. }
        | BitrixError::Decode(_)
        | BitrixError::Rejected { .. } => EXIT_FAILURE,
    }
}
