use crate::core::santa::Action;
use crate::domain::model::CpuBudget;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "secret-santa")]
#[command(about = "Generates assignments for a 'secret santa'.")]
pub struct CliConfig {
    /// print: show assignments, email_check: send a test email, email: send assignments
    #[arg(value_enum, value_name = "ACTION")]
    pub action: Action,

    /// A config file containing the santas' details and email information
    #[arg(value_name = "CONFIG")]
    pub config: String,

    /// Do everything except actually send the email
    #[arg(long)]
    pub dry_run: bool,

    /// Override the CPU time allowed for finding assignments
    #[arg(long, value_name = "MS", conflicts_with = "no_cpu_limit")]
    pub max_cpu_ms: Option<u64>,

    /// Keep retrying until a valid assignment is found
    #[arg(long)]
    pub no_cpu_limit: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// 命令列覆蓋配置檔中的預算
    pub fn budget_override(&self) -> Option<CpuBudget> {
        if self.no_cpu_limit {
            Some(CpuBudget::Unlimited)
        } else {
            self.max_cpu_ms.map(CpuBudget::from_millis)
        }
    }
}
