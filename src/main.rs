use clap::Parser;
use tabula::cli::{Cli, Commands};
use tabula::types::config::Config;
use tabula::TabulaResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> TabulaResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = Config::resolve(cli.config.as_deref())?;

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("tabula={}", log_level)
            .parse()
            .unwrap_or_else(|_| "tabula=info".parse().expect("fallback directive is valid")),
    );

    // stdout carries the protocol, so logs always go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match &cli.config {
        Some(path) => tracing::debug!("Configuration loaded from: {}", path.display()),
        None => tracing::debug!("Configuration resolved from the working directory"),
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tabula::cli::commands::serve(&config).await?;
        }
        Commands::Config => {
            tabula::cli::commands::config_cmd(&config)?;
        }
        Commands::Version => {
            tabula::cli::commands::version();
        }
    }

    Ok(())
}
