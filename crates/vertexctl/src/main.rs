use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use tracing::{debug, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vertexctl_core::config::Config;

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::OutputOptions;
use connection::ConnectionManager;
use error::VertexCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let loaded = match &cli.config_file {
        Some(config_file) => {
            let path = std::path::PathBuf::from(config_file);
            debug!("Loading config from explicit path: {:?}", path);
            Config::load_from_path(&path).map(|config| (config, Some(path)))
        }
        None => {
            debug!("Loading config from default location");
            Config::load().map(|config| (config, None))
        }
    };
    let (config, config_path) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            VertexCtlError::from(e).print_diagnostic();
            std::process::exit(1);
        }
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "vertexctl=warn,vertexctl_core=warn",
            1 => "vertexctl=info,vertexctl_core=info",
            2 => "vertexctl=debug,vertexctl_core=debug",
            _ => "vertexctl=trace,vertexctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), VertexCtlError> {
    trace!("Output format: {:?}, query: {:?}", cli.output, cli.query);
    info!("Command: {}", format_command(&cli.command));

    let out = OutputOptions {
        format: cli.output,
        query: cli.query.as_deref(),
    };
    let profile = cli.profile.as_deref();

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            if out.is_structured() {
                out.print(
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    }),
                    output::OutputFormat::Json,
                )
            } else {
                println!("vertexctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(cmd) => {
            commands::profile::handle_profile_command(cmd, conn_mgr, out).await
        }
        Commands::Cluster(cmd) => {
            commands::cluster::handle_cluster_command(cmd, conn_mgr, profile, out).await
        }
        Commands::Index(cmd) => {
            commands::index::handle_index_command(cmd, conn_mgr, profile, out).await
        }
        Commands::Extension(cmd) => {
            commands::extension::handle_extension_command(cmd, conn_mgr, profile, out).await
        }
        Commands::Example(cmd) => {
            commands::example::handle_example_command(cmd, conn_mgr, profile, out).await
        }
        Commands::Job(cmd) => commands::job::handle_job_command(cmd, conn_mgr, profile, out).await,
        Commands::Operation(cmd) => {
            commands::operation::handle_operation_command(cmd, conn_mgr, profile, out).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Command completed successfully in {:.3}s",
            duration.as_secs_f64()
        ),
        Err(e) => debug!("Command failed after {:.3}s: {}", duration.as_secs_f64(), e),
    }

    result
}

fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::Cluster(cmd) => format!("cluster {:?}", cmd),
        Commands::Index(cmd) => format!("index {:?}", cmd),
        Commands::Extension(cmd) => format!("extension {:?}", cmd),
        Commands::Example(cmd) => format!("example {:?}", cmd),
        Commands::Job(cmd) => format!("job {:?}", cmd),
        Commands::Operation(cmd) => format!("operation {:?}", cmd),
    }
}
