pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{default_clock, ConsoleNotifier, SmtpMailer};
pub use config::SantaConfig;
pub use crate::core::{
    engine::AssignmentEngine,
    registry::ParticipantRegistry,
    santa::{Action, SantaRunner},
};
pub use domain::model::{Assignment, Assignments, CpuBudget, OutgoingMessage, Participant};
pub use utils::error::{Result, SantaError};
