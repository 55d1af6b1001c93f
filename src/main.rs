use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bizplan::cli::OutputFormat;
use bizplan::cli::commands::generate::GenerateOptions;
use bizplan::types::RiskTolerance;

#[derive(Parser)]
#[command(name = "bizplan")]
#[command(
    version,
    about = "Generate SBA-style business plans from your skills and budget"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the global/project layering
    #[arg(long, short, global = true, env = "BIZPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a business idea with a full nine-section plan
    Generate {
        #[arg(long = "skill", short = 's', help = "A skill you bring (repeatable)")]
        skills: Vec<String>,
        #[arg(long, default_value_t = 0, help = "Smallest budget you can commit")]
        budget_min: u64,
        #[arg(long, help = "Largest budget you can commit")]
        budget_max: u64,
        #[arg(
            long,
            default_value = "medium",
            help = "Risk tolerance: low, medium, high"
        )]
        risk: RiskTolerance,
        #[arg(long = "interest", short = 'i', help = "An area of interest (repeatable)")]
        interests: Vec<String>,
        #[arg(long, help = "Fail when the answer is missing any plan section")]
        strict: bool,
        #[arg(long, help = "Save the idea to the configured store")]
        save: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: OutputFormat,
    },

    /// Browse stored ideas
    Ideas {
        #[command(subcommand)]
        action: IdeasAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check provider reachability and store health
    Health {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum IdeasAction {
    /// List stored ideas, oldest first
    List {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: OutputFormat,
    },
    /// Show one stored idea
    Show {
        id: String,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: OutputFormat,
    },
    /// Delete a stored idea
    Delete { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mbizplan encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // Logs go to stderr so json/yaml output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Generate {
            skills,
            budget_min,
            budget_max,
            risk,
            interests,
            strict,
            save,
            format,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(bizplan::cli::commands::generate::run(GenerateOptions {
                skills,
                budget_min,
                budget_max,
                risk,
                interests,
                strict,
                save,
                format,
                config_path: cli.config.clone(),
            }))?;
        }
        Commands::Ideas { action } => {
            let ctx = bizplan::cli::CommandContext::load(config_path)?;
            let rt = Runtime::new()?;
            match action {
                IdeasAction::List { format } => {
                    rt.block_on(bizplan::cli::commands::ideas::list(&ctx, format))?;
                }
                IdeasAction::Show { id, format } => {
                    rt.block_on(bizplan::cli::commands::ideas::show(&ctx, &id, format))?;
                }
                IdeasAction::Delete { id } => {
                    rt.block_on(bizplan::cli::commands::ideas::delete(&ctx, &id))?;
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                bizplan::cli::commands::config::show(config_path, format)?;
            }
            ConfigAction::Path => {
                bizplan::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                bizplan::cli::commands::config::init(global, force)?;
            }
        },
        Commands::Health { format } => {
            let ctx = bizplan::cli::CommandContext::load(config_path)?;
            let rt = Runtime::new()?;
            rt.block_on(bizplan::cli::commands::health::run(&ctx, format))?;
        }
    }

    Ok(())
}
