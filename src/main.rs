use clap::Parser;
use secret_santa::domain::ports::Notifier;
use secret_santa::utils::error::ErrorSeverity;
use secret_santa::utils::logger;
use secret_santa::{
    default_clock, Action, AssignmentEngine, CliConfig, ConsoleNotifier, SantaConfig, SantaError,
    SantaRunner, SmtpMailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting secret-santa");
    tracing::debug!("CLI config: {:?}", args);
    if args.dry_run && !args.action.sends_email() {
        tracing::info!("🔍 --dry-run has no effect on '{:?}', nothing is sent", args.action);
    }

    if let Err(e) = run(&args).await {
        tracing::error!(
            "❌ secret-santa failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(args: &CliConfig) -> Result<(), SantaError> {
    tracing::info!("📁 Loading configuration from: {}", args.config);
    let config = SantaConfig::from_file(&args.config)?;

    let runner = SantaRunner::new(&config)?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let budget = args.budget_override().unwrap_or_else(|| config.cpu_budget());
    tracing::debug!("Assignment CPU budget: {:?}", budget);
    let mut engine = AssignmentEngine::new(rand::rng(), default_clock(), budget);
    let assignments = runner.assign(&mut engine)?;

    match args.action {
        Action::Print => {
            let mut stdout = std::io::stdout().lock();
            runner.print(&assignments, &mut stdout)?;
        }
        action => {
            let mut notifier: Box<dyn Notifier> = if args.dry_run {
                tracing::info!("🔍 DRY RUN MODE - message bodies are printed, nothing is sent");
                Box::new(ConsoleNotifier::stdout())
            } else {
                Box::new(SmtpMailer::from_config(config.mail()?)?)
            };
            runner.email(action, &assignments, notifier.as_mut()).await?;
        }
    }

    Ok(())
}
