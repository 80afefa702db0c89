use clap::Parser;
use portfolio_ui::utils::error::{ErrorSeverity, PortfolioError};
use portfolio_ui::utils::{logger, validation::Validate};
use portfolio_ui::{
    CliArgs, Document, DryRunSubmitter, EmailJsClient, EventScript, FileThemeStore, Page,
    RecordingAnimator, SiteConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting portfolio-ui");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = args.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&args).await {
        Ok(snapshot_json) => {
            println!("{}", snapshot_json);
        }
        Err(e) => {
            tracing::error!(
                "❌ Replay failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(args: &CliArgs) -> Result<String, PortfolioError> {
    let config = match &args.config {
        Some(path) => SiteConfig::from_file(path)?,
        None => SiteConfig::default(),
    };
    config.validate()?;

    let document = Document::from_file(&args.page)?;
    let theme_path = args
        .theme_file
        .clone()
        .unwrap_or_else(|| config.theme.storage_path.clone());
    let animator = RecordingAnimator::new();

    let (page, report) = Page::init(
        document,
        &config,
        Box::new(FileThemeStore::new(theme_path)),
        Box::new(animator.clone()),
    )?;
    if !report.issues.is_empty() {
        tracing::warn!("⚠️ {} card issue(s) found during discovery", report.issues.len());
    }

    let mut page = if args.send && config.contact_enabled() {
        tracing::info!("📮 Contact submissions will be sent to {}", config.contact.endpoint);
        page.with_submitter(Arc::new(EmailJsClient::from_config(&config.contact)?))
    } else {
        if args.send {
            tracing::warn!("⚠️ --send given but contact credentials are not configured");
        }
        page.with_submitter(Arc::new(DryRunSubmitter))
    };

    if let Some(events) = &args.events {
        let script = EventScript::from_file(events)?;
        let replay = script.run(&mut page).await?;
        tracing::info!(
            "✅ {} step(s) replayed, {} produced changes, {} animation request(s)",
            replay.steps,
            replay.outcomes.len(),
            animator.len()
        );
    }

    Ok(serde_json::to_string_pretty(&page.snapshot())?)
}
