mod cli;
mod commands;
mod config;
mod error;
mod output;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sitetrack_core::RegistryConfig;

use crate::cli::{Cli, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::store::JsonFileSiteStore;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    match cli.command {
        // Config commands must work even when the config is broken
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "sitetrack", &mut std::io::stdout());
            Ok(())
        }

        Command::Canonicalize(args) => {
            let ctx = Context::load(&global)?;
            commands::canonicalize::handle(args, ctx.format, global.quiet)
        }

        Command::Id(args) => {
            let ctx = Context::load(&global)?;
            commands::id::handle(args, ctx.registry.id_scheme, ctx.format, global.quiet)
        }

        Command::Sites(args) => {
            let ctx = Context::load(&global)?;
            let store = JsonFileSiteStore::new(config::sites_file(&global, &ctx.cfg));
            commands::sites::handle(args, store, ctx.registry, ctx.format, global.quiet).await
        }
    }
}

/// Config resolved once per invocation for registry commands.
struct Context {
    cfg: config::Config,
    registry: RegistryConfig,
    format: OutputFormat,
}

impl Context {
    fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = config::load(global)?;
        let registry = cfg.to_registry_config()?;
        let format = config::output_format(global, &cfg)?;
        tracing::debug!(scheme = %registry.id_scheme, ?format, "configuration resolved");
        Ok(Self {
            cfg,
            registry,
            format,
        })
    }
}
