use clap::Parser;
use moosend_connector::config::cli::Command;
use moosend_connector::core::{ConfigProvider, EmailMarketing, Submission};
use moosend_connector::utils::error::{ErrorSeverity, IntegrationError};
use moosend_connector::utils::{logger, validation::Validate};
use moosend_connector::{
    CliConfig, IntegrationRunner, MoosendConnector, RecordingErrorReporter, ReqwestGateway,
    TomlConfig,
};

fn exit_with(e: &IntegrationError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_reports(reporter: &RecordingErrorReporter) {
    for report in reporter.reports() {
        eprintln!("❌ {} ({})", report.message, report.location());
    }
}

async fn run(cli: &CliConfig, settings: TomlConfig) -> Result<bool, IntegrationError> {
    let credentials = settings.credentials();
    let reporter = RecordingErrorReporter::new();
    let gateway = ReqwestGateway::from_config(&settings)?;
    let runner = IntegrationRunner::new(MoosendConnector::new(gateway, reporter.clone()));

    let succeeded = match &cli.command {
        Command::Check => {
            let connected = runner.integration().verify_connection().await;
            if connected {
                println!("✅ Connected to {}", runner.integration().display_name());
            }
            connected
        }
        Command::Lists => {
            let run = runner.refresh_settings().await;
            for list in &run.settings.lists {
                println!("📋 {} ({})", list.name, list.id);
                for field in &list.fields {
                    let marker = if field.required { " *" } else { "" };
                    println!("    - {}{}", field.handle, marker);
                }
            }
            run.connected
        }
        Command::Subscribe { submission } => {
            let list_id = credentials.require_list_id()?;
            let content = std::fs::read_to_string(submission)?;
            let submission: Submission = serde_json::from_str(&content)?;

            let run = runner
                .send_submission(&submission, settings.field_mapping(), list_id)
                .await;
            if run.delivered {
                println!("✅ Subscriber added to list {}", list_id);
            }
            run.delivered
        }
    };

    print_reports(&reporter);
    Ok(succeeded)
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting moosend-connector");
    if cli.verbose {
        tracing::debug!("CLI command: {:?}", cli.command);
    }

    // API key 必須在任何請求之前驗證
    let settings = match cli.load_settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    if !settings.is_enabled() {
        tracing::warn!("Integration is disabled in configuration, nothing to do");
        return;
    }

    match run(&cli, settings).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => exit_with(&e),
    }
}
