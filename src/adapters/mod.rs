// Adapters layer: concrete implementations for external systems (smtp, process clock).

pub mod clock;
pub mod mailer;

pub use clock::{default_clock, MonotonicClock};
#[cfg(feature = "cli")]
pub use clock::ProcessCpuClock;
pub use mailer::{ConsoleNotifier, SmtpMailer};
