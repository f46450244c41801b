use crate::config::toml_config::MailConfig;
use crate::domain::ports::Notifier;
use crate::utils::error::{Result, SantaError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::io::Write;

pub const PASSWORD_ENV: &str = "SANTA_SMTP_PASSWORD";

/// 透過 SMTP 寄送郵件，`connect` 後才能 `send`
pub struct SmtpMailer {
    host: String,
    port: u16,
    starttls: bool,
    username: String,
    password: String,
    from: Mailbox,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let password = resolve_password(
            config.password.as_deref(),
            std::env::var(PASSWORD_ENV).ok(),
            || prompt_password(config),
        )?;
        let from: Mailbox = config
            .from
            .as_deref()
            .unwrap_or(&config.username)
            .parse()?;

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            starttls: config.starttls.unwrap_or(false),
            username: config.username.clone(),
            password,
            from,
            transport: None,
        })
    }

    fn not_connected() -> SantaError {
        SantaError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "SMTP client is not connected",
        ))
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Ok(());
        }

        let builder = if self.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
        };
        let transport = builder
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();

        tracing::info!("📡 Connecting to {}:{}", self.host, self.port);
        if !transport.test_connection().await? {
            return Err(SantaError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("SMTP server {}:{} rejected the connection", self.host, self.port),
            )));
        }

        self.transport = Some(transport);
        Ok(())
    }

    async fn send(&mut self, to: &str, subject: &str, body: &str) -> Result<()> {
        let transport = self.transport.as_ref().ok_or_else(Self::not_connected)?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(message).await?;
        tracing::info!("📧 Sent '{}' to {}", subject, to);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.transport.take().is_some() {
            tracing::info!("🔌 Disconnected from {}", self.host);
        }
        Ok(())
    }
}

/// 密碼來源依序為：配置檔、環境變數、終端機輸入
pub fn resolve_password<F>(
    configured: Option<&str>,
    from_env: Option<String>,
    prompt: F,
) -> Result<String>
where
    F: FnOnce() -> Option<std::io::Result<String>>,
{
    if let Some(password) = configured {
        return Ok(password.to_string());
    }
    if let Some(password) = from_env {
        tracing::debug!("Using SMTP password from {}", PASSWORD_ENV);
        return Ok(password);
    }

    match prompt() {
        Some(answer) => {
            let password = answer?;
            if password.is_empty() {
                return Err(missing_password());
            }
            Ok(password)
        }
        None => Err(missing_password()),
    }
}

fn missing_password() -> SantaError {
    SantaError::MissingConfig {
        field: "mail.password".to_string(),
    }
}

#[cfg(feature = "cli")]
fn prompt_password(config: &MailConfig) -> Option<std::io::Result<String>> {
    Some(rpassword::prompt_password(format!(
        "Password for {} ({}): ",
        config.username, config.host
    )))
}

#[cfg(not(feature = "cli"))]
fn prompt_password(_config: &MailConfig) -> Option<std::io::Result<String>> {
    None
}

/// dry-run：不寄信，只把內文寫到 writer
pub struct ConsoleNotifier<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleNotifier<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    async fn connect(&mut self) -> Result<()> {
        tracing::debug!("🔍 Dry run: not connecting to the mail server");
        Ok(())
    }

    async fn send(&mut self, to: &str, _subject: &str, body: &str) -> Result<()> {
        tracing::debug!("🔍 Dry run: message for {}", to);
        writeln!(self.out, "{}", body)?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
