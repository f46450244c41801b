use crate::domain::model::{CpuBudget, Participant};
use crate::utils::error::{Result, SantaError};
use crate::utils::template::{self, RECEIVER, SANTA};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_required_field,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SUBJECT: &str = "Secret Santa";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SantaConfig {
    pub mail: Option<MailConfig>,
    pub templates: Option<TemplatesConfig>,
    pub assignment: Option<AssignmentConfig>,
    #[serde(default)]
    pub santas: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub starttls: Option<bool>,
    pub from: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    pub subject: Option<String>,
    pub email_check: Option<String>,
    pub email_assignment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentConfig {
    pub max_cpu_ms: Option<u64>,
    pub unlimited: Option<bool>,
}

impl SantaConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content).map_err(Self::parse_error)?;

        // 先解析再替換，環境變數的內容不會被當成 TOML 語法
        for (_, value) in table.iter_mut() {
            Self::substitute_env_vars(value);
        }

        toml::Value::Table(table)
            .try_into()
            .map_err(Self::parse_error)
    }

    fn parse_error(e: toml::de::Error) -> SantaError {
        SantaError::ConfigParse {
            message: format!("TOML parsing error: {}", e),
        }
    }

    /// 替換字串值中的環境變數 (例如 ${SANTA_SMTP_PASSWORD})，找不到的保持原樣
    fn substitute_env_vars(value: &mut toml::Value) {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        match value {
            toml::Value::String(s) => {
                let replaced = re
                    .replace_all(s, |caps: &regex::Captures| {
                        let var_name = &caps[1];
                        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
                    })
                    .into_owned();
                *s = replaced;
            }
            toml::Value::Array(items) => items.iter_mut().for_each(Self::substitute_env_vars),
            toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| Self::substitute_env_vars(v)),
            _ => {}
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(mail) = &self.mail {
            validate_non_empty_string("mail.host", &mail.host)?;
            validate_non_empty_string("mail.username", &mail.username)?;
            validate_range("mail.port", u32::from(mail.port), 1, 65535)?;
        }

        if let Some(templates) = &self.templates {
            if let Some(check) = &templates.email_check {
                // 確認信不能透露分配結果
                template::check("templates.email_check", check, &[SANTA])?;
            }
            if let Some(assignment) = &templates.email_assignment {
                template::check("templates.email_assignment", assignment, &[SANTA, RECEIVER])?;
            }
        }

        if let Some(max_cpu_ms) = self.assignment.as_ref().and_then(|a| a.max_cpu_ms) {
            validate_positive_number("assignment.max_cpu_ms", max_cpu_ms, 1)?;
        }

        validate_positive_number("santas", self.santas.len() as u64, 2)?;

        Ok(())
    }

    pub fn mail(&self) -> Result<&MailConfig> {
        validate_required_field("mail", &self.mail)
    }

    pub fn subject(&self) -> &str {
        self.templates
            .as_ref()
            .and_then(|t| t.subject.as_deref())
            .unwrap_or(DEFAULT_SUBJECT)
    }

    pub fn email_check_template(&self) -> Result<&str> {
        let template = self.templates.as_ref().and_then(|t| t.email_check.as_deref());
        validate_required_field("templates.email_check", &template).copied()
    }

    pub fn email_assignment_template(&self) -> Result<&str> {
        let template = self
            .templates
            .as_ref()
            .and_then(|t| t.email_assignment.as_deref());
        validate_required_field("templates.email_assignment", &template).copied()
    }

    /// 取得分配用的 CPU 預算，預設 10 秒
    pub fn cpu_budget(&self) -> CpuBudget {
        match &self.assignment {
            Some(AssignmentConfig {
                unlimited: Some(true),
                ..
            }) => CpuBudget::Unlimited,
            Some(AssignmentConfig {
                max_cpu_ms: Some(ms),
                ..
            }) => CpuBudget::from_millis(*ms),
            _ => CpuBudget::default(),
        }
    }
}

impl Validate for SantaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
