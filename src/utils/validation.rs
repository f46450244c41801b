use crate::utils::error::{Result, SantaError};
use lettre::message::Mailbox;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| SantaError::MissingConfig {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SantaError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 參與者欄位為必填，空白視同缺少
pub fn validate_present(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SantaError::MissingField {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// 收件地址必須能被郵件層解析，寄信前就要擋下
pub fn validate_email_address(field_name: &str, value: &str) -> Result<Mailbox> {
    value
        .parse::<Mailbox>()
        .map_err(|e| SantaError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Not a valid email address: {}", e),
        })
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SantaError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SantaError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_field() {
        let password: Option<String> = None;
        assert!(matches!(
            validate_required_field("mail.password", &password),
            Err(SantaError::MissingConfig { .. })
        ));
        let host = Some("smtp.example.com".to_string());
        assert_eq!(
            validate_required_field("mail.host", &host).unwrap(),
            "smtp.example.com"
        );
    }

    #[test]
    fn test_validate_present() {
        assert!(validate_present("santas[0].name", "Alice").is_ok());
        assert!(matches!(
            validate_present("santas[0].name", "   "),
            Err(SantaError::MissingField { field }) if field == "santas[0].name"
        ));
    }

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("santas[0].email", "alice@example.com").is_ok());
        assert!(validate_email_address("mail.from", "Santa <santa@example.com>").is_ok());
        assert!(matches!(
            validate_email_address("santas[1].email", "bob at example"),
            Err(SantaError::InvalidConfigValue { field, .. }) if field == "santas[1].email"
        ));
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("assignment.max_cpu_ms", 5, 1).is_ok());
        assert!(validate_positive_number("assignment.max_cpu_ms", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("mail.port", 587u32, 1, 65535).is_ok());
        assert!(validate_range("mail.port", 0u32, 1, 65535).is_err());
        assert!(validate_range("mail.port", 70000u32, 1, 65535).is_err());
    }
}
