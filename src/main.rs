use anyhow::Context;
use clap::Parser;
use helpdesk_router::adapters::{http, repl};
use helpdesk_router::utils::error::ErrorSeverity;
use helpdesk_router::utils::{logger, validation::Validate};
use helpdesk_router::{app, AppState, CliConfig, Command, HelpDeskError, TomlConfig};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting helpdesk v{}", env!("CARGO_PKG_VERSION"));
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        let Some(err) = e.downcast_ref::<HelpDeskError>() else {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        };

        tracing::error!(
            "❌ helpdesk failed: {} (Category: {:?}, Severity: {:?})",
            err,
            err.category(),
            err.severity()
        );
        eprintln!("❌ {}", err.user_friendly_message());
        eprintln!("💡 Suggestion: {}", err.recovery_suggestion());

        let exit_code = match err.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    match cli.command {
        Command::ShowConfig => {
            print!("{}", config.resolved().to_toml_string()?);
        }
        Command::Chat => {
            let desk = app::build_desk(&config).await?;
            let input = BufReader::new(tokio::io::stdin());
            let answered = repl::run(&desk, input, tokio::io::stdout()).await?;
            tracing::info!("Chat session ended after {} questions", answered);
        }
        Command::Api { .. } => {
            let listener = bind(&config, config.api_port()).await?;
            let state = AppState::new(Arc::new(app::build_desk(&config).await?));
            http::serve(listener, http::api::router(state)).await?;
        }
        Command::Web { .. } => {
            let listener = bind(&config, config.web_port()).await?;
            let state = AppState::new(Arc::new(app::build_desk(&config).await?));
            http::serve(listener, http::web::router(state)).await?;
        }
    }

    Ok(())
}

async fn bind(config: &TomlConfig, port: u16) -> anyhow::Result<TcpListener> {
    let addr = format!("{}:{}", config.host(), port);
    TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", addr))
}
