use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SantaError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Emails not unique: there are two (or more) santas with address {address}")]
    DuplicateAddress { address: String },

    #[error("Names not unique: there are two (or more) santas called {name}")]
    DuplicateName { name: String },

    #[error("Santa {santa} has exclusion {exclusion} who doesn't exist")]
    UnknownExclusion { santa: String, exclusion: String },

    #[error("Unable to find suitable assignments within {budget:?} of CPU time ({attempts} attempts)")]
    AssignmentTimeout { budget: Duration, attempts: u64 },

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Template error in {template}: {reason}")]
    Template { template: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Assignment,
    Transport,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SantaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SantaError::MissingField { .. }
            | SantaError::DuplicateAddress { .. }
            | SantaError::DuplicateName { .. }
            | SantaError::UnknownExclusion { .. }
            | SantaError::MissingConfig { .. }
            | SantaError::InvalidConfigValue { .. }
            | SantaError::ConfigParse { .. }
            | SantaError::Template { .. } => ErrorCategory::Input,
            SantaError::AssignmentTimeout { .. } => ErrorCategory::Assignment,
            SantaError::Smtp(_) | SantaError::Address(_) | SantaError::MessageBuild(_) => {
                ErrorCategory::Transport
            }
            SantaError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Assignment => ErrorSeverity::High,
            // 部分郵件可能已寄出
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SantaError::AssignmentTimeout { .. } => {
                "No valid assignment was found. The exclusions may be impossible to satisfy."
                    .to_string()
            }
            SantaError::Smtp(_) => format!(
                "Sending email failed, messages already sent were not recalled: {}",
                self
            ),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SantaError::MissingField { .. } => "Give every santa a non-empty name and email",
            SantaError::DuplicateAddress { .. } => "Make sure each santa has their own email address",
            SantaError::DuplicateName { .. } => "Give every santa a distinct name",
            SantaError::UnknownExclusion { .. } => {
                "Exclusions must use the exact name of another santa in the config"
            }
            SantaError::AssignmentTimeout { .. } => {
                "Remove some exclusions, or raise --max-cpu-ms / use --no-cpu-limit"
            }
            SantaError::MissingConfig { .. } => {
                "Add the field to the config file, or for the password set SANTA_SMTP_PASSWORD or run from a terminal"
            }
            SantaError::InvalidConfigValue { .. } | SantaError::ConfigParse { .. } => {
                "Check the config file against the documented TOML layout"
            }
            SantaError::Template { .. } => {
                "Templates may use {santa} and, for assignment emails, {receiver}; write {{ or }} for literal braces"
            }
            SantaError::IoError(_) => "Check the config file path and permissions",
            SantaError::Smtp(_) => "Check mail.host, mail.port, starttls and the credentials",
            SantaError::Address(_) => "Check the email addresses in the config file",
            SantaError::MessageBuild(_) => "Check mail.from and the santa addresses",
        }
    }
}

pub type Result<T> = std::result::Result<T, SantaError>;
