pub mod delivery;
pub mod engine;
pub mod registry;
pub mod santa;

pub use crate::domain::model::{Assignment, Assignments, CpuBudget, OutgoingMessage, Participant};
pub use crate::domain::ports::{CpuClock, Notifier};
pub use crate::utils::error::Result;
