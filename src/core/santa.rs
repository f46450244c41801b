use crate::config::toml_config::SantaConfig;
use crate::core::delivery::deliver;
use crate::core::engine::AssignmentEngine;
use crate::core::registry::ParticipantRegistry;
use crate::domain::model::{Assignments, OutgoingMessage};
use crate::domain::ports::{CpuClock, Notifier};
use crate::utils::error::Result;
use crate::utils::template::{self, RECEIVER, SANTA};
use crate::utils::validation::Validate;
use rand::Rng;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Action {
    /// Generates assignments and prints them to the console
    Print,
    /// Sends a preparatory email to each santa to confirm the addresses
    #[cfg_attr(feature = "cli", value(name = "email_check"))]
    EmailCheck,
    /// Generates assignments and emails each santa who they are santa to
    Email,
}

impl Action {
    pub fn sends_email(&self) -> bool {
        !matches!(self, Action::Print)
    }
}

/// 一次執行：驗證名單、產生分配、輸出或寄信
pub struct SantaRunner<'a> {
    config: &'a SantaConfig,
    registry: ParticipantRegistry,
}

impl<'a> SantaRunner<'a> {
    pub fn new(config: &'a SantaConfig) -> Result<Self> {
        config.validate()?;
        let registry = ParticipantRegistry::new(config.santas.clone())?;
        tracing::info!("🎅 Loaded {} santas", registry.len());
        Ok(Self { config, registry })
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn assign<R: Rng, C: CpuClock>(
        &self,
        engine: &mut AssignmentEngine<R, C>,
    ) -> Result<Assignments> {
        let assignments = engine.assign(&self.registry)?;
        tracing::info!(
            "✅ Found assignments for {} santas after {} attempts",
            assignments.len(),
            assignments.attempts()
        );
        Ok(assignments)
    }

    /// 每行輸出 "<giver> is santa to <receiver>"
    pub fn print<W: Write>(&self, assignments: &Assignments, out: &mut W) -> Result<()> {
        for assignment in assignments {
            writeln!(out, "{} is santa to {}", assignment.giver.name, assignment.receiver)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn compose(&self, action: Action, assignments: &Assignments) -> Result<Vec<OutgoingMessage>> {
        let subject = self.config.subject();

        match action {
            Action::Print => Ok(Vec::new()),
            Action::EmailCheck => {
                let body_template = self.config.email_check_template()?;
                assignments
                    .iter()
                    .map(|a| -> Result<OutgoingMessage> {
                        Ok(OutgoingMessage {
                            to: a.giver.email.clone(),
                            subject: subject.to_string(),
                            body: template::render(
                                "templates.email_check",
                                body_template,
                                &[(SANTA, a.giver.name.as_str())],
                            )?,
                        })
                    })
                    .collect()
            }
            Action::Email => {
                let body_template = self.config.email_assignment_template()?;
                assignments
                    .iter()
                    .map(|a| -> Result<OutgoingMessage> {
                        Ok(OutgoingMessage {
                            to: a.giver.email.clone(),
                            subject: subject.to_string(),
                            body: template::render(
                                "templates.email_assignment",
                                body_template,
                                &[(SANTA, a.giver.name.as_str()), (RECEIVER, a.receiver.as_str())],
                            )?,
                        })
                    })
                    .collect()
            }
        }
    }

    pub async fn email<N>(
        &self,
        action: Action,
        assignments: &Assignments,
        notifier: &mut N,
    ) -> Result<usize>
    where
        N: Notifier + ?Sized,
    {
        // 先組好全部郵件，模板錯誤不會寄出一半
        let messages = self.compose(action, assignments)?;
        let sent = deliver(notifier, &messages).await?;
        tracing::info!("📬 Delivered {} of {} messages", sent, messages.len());
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CpuBudget;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    struct FrozenClock;

    impl CpuClock for FrozenClock {
        fn cpu_time(&mut self) -> Duration {
            Duration::ZERO
        }
    }

    fn config() -> SantaConfig {
        SantaConfig::from_toml_str(
            r#"
[templates]
subject = "Ho ho ho"
email_check = "Hi {santa}, just checking your address."
email_assignment = "Hi {santa}, you are santa to {receiver}."

[[santas]]
name = "Alice"
email = "alice@example.com"

[[santas]]
name = "Bob"
email = "bob@example.com"
"#,
        )
        .unwrap()
    }

    fn assignments(runner: &SantaRunner<'_>) -> Assignments {
        let mut engine =
            AssignmentEngine::new(StdRng::seed_from_u64(5), FrozenClock, CpuBudget::default());
        runner.assign(&mut engine).unwrap()
    }

    #[test]
    fn test_print_lines() {
        let config = config();
        let runner = SantaRunner::new(&config).unwrap();
        let assignments = assignments(&runner);

        let mut out = Vec::new();
        runner.print(&assignments, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "Alice is santa to Bob\nBob is santa to Alice\n");
    }

    #[test]
    fn test_email_check_does_not_reveal_receiver() {
        let config = config();
        let runner = SantaRunner::new(&config).unwrap();
        let assignments = assignments(&runner);

        let messages = runner.compose(Action::EmailCheck, &assignments).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].to, "alice@example.com");
        assert_eq!(messages[0].subject, "Ho ho ho");
        assert_eq!(messages[0].body, "Hi Alice, just checking your address.");
        assert!(!messages[0].body.contains("Bob"));
    }

    #[test]
    fn test_email_assignment_body() {
        let config = config();
        let runner = SantaRunner::new(&config).unwrap();
        let assignments = assignments(&runner);

        let messages = runner.compose(Action::Email, &assignments).unwrap();
        assert_eq!(messages[1].to, "bob@example.com");
        assert_eq!(messages[1].body, "Hi Bob, you are santa to Alice.");
    }

    #[test]
    fn test_invalid_roster_fails_before_assignment() {
        let mut config = config();
        config.santas[1].email = "alice@example.com".to_string();
        assert!(SantaRunner::new(&config).is_err());
    }
}
