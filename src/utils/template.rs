use crate::utils::error::{Result, SantaError};
use regex::Regex;
use std::sync::OnceLock;

pub const SANTA: &str = "santa";
pub const RECEIVER: &str = "receiver";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // {{ 與 }} 為跳脫的大括號
    RE.get_or_init(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("placeholder regex is valid"))
}

/// 檢查模板只使用允許的佔位符
pub fn check(template_name: &str, template: &str, allowed: &[&str]) -> Result<()> {
    for caps in placeholder_regex().captures_iter(template) {
        if let Some(name) = caps.get(1) {
            let name = name.as_str().trim();
            if !allowed.contains(&name) {
                return Err(unknown_placeholder(template_name, name, allowed));
            }
        }
    }
    Ok(())
}

/// 以 `{santa}` / `{receiver}` 等佔位符渲染模板
pub fn render(template_name: &str, template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        rendered.push_str(&template[last..whole.start()]);
        match caps.get(1) {
            Some(name) => {
                let name = name.as_str().trim();
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = vars.iter().map(|(key, _)| *key).collect();
                        unknown_placeholder(template_name, name, &allowed)
                    })?;
                rendered.push_str(value);
            }
            None => rendered.push_str(&whole.as_str()[..1]),
        }
        last = whole.end();
    }

    rendered.push_str(&template[last..]);
    Ok(rendered)
}

fn unknown_placeholder(template_name: &str, name: &str, allowed: &[&str]) -> SantaError {
    let allowed: Vec<String> = allowed.iter().map(|key| format!("{{{}}}", key)).collect();
    SantaError::Template {
        template: template_name.to_string(),
        reason: format!(
            "unknown placeholder {{{}}}, allowed: {}",
            name,
            allowed.join(", ")
        ),
    }
}
