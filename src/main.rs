use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use duration_format::commands;
use duration_format::config;
use duration_format::{OutputFormat, TickUnit};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "durfmt")]
#[command(about = "Render, parse and time durations like 01:02:03.456")]
#[command(version)]
struct Cli {
    #[arg(long, value_enum, global = true, default_value = "text", help = "Output format")]
    output: OutputFormat,

    #[arg(short, long, global = true, help = "Log debug details to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a millisecond count
    Render {
        #[arg(help = "Duration in milliseconds", allow_hyphen_values = true)]
        millis: i64,
        #[arg(long, help = "Pattern, e.g. hh:mm:ss.lll (defaults to config)")]
        format: Option<String>,
    },
    /// Parse duration text into milliseconds
    Parse {
        #[arg(help = "Duration text, e.g. 01:02:03,456", allow_hyphen_values = true)]
        text: String,
        #[arg(long, help = "Pattern (defaults to config)", conflicts_with = "auto")]
        format: Option<String>,
        #[arg(long, help = "Derive the format from the text itself")]
        auto: bool,
    },
    /// Print the pattern inferred from a sample
    Derive {
        #[arg(help = "Sample duration text")]
        sample: String,
    },
    /// Show a millisecond count as 1h 2m 3s
    Units {
        #[arg(value_name = "MILLIS", help = "Duration in milliseconds", allow_hyphen_values = true)]
        value: i64,
        #[arg(long, help = "Include milliseconds")]
        millis: bool,
    },
    /// Show the fields of a pattern
    Describe {
        #[arg(help = "Pattern (defaults to config)")]
        pattern: Option<String>,
    },
    /// Start or restart the stopwatch
    Start {
        #[arg(long, help = "Initial elapsed time, e.g. 1:30")]
        at: Option<String>,
        #[arg(long, help = "Start without running")]
        paused: bool,
        #[arg(long, value_enum, help = "Tick resolution (defaults to config)")]
        unit: Option<TickUnit>,
    },
    /// Pause the stopwatch
    Pause,
    /// Resume a paused stopwatch
    Resume,
    /// Move the stopwatch by a duration (prefix with - to rewind)
    Skip {
        #[arg(help = "Amount, e.g. 0:30 or -5", allow_hyphen_values = true)]
        amount: String,
    },
    /// Show elapsed time
    Time {
        #[arg(long, help = "Pattern (defaults to config)")]
        format: Option<String>,
        #[arg(long, help = "Show as 1h 2m 3s")]
        units: bool,
    },
    /// Discard the stopwatch
    Reset,
    /// Show or change configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    List,
    Set { key: String, value: String },
    Get { key: String },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "duration_format=debug,durfmt=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::config_path() {
        Ok(path) if path.exists() => config::load_from_path(&path)?,
        Ok(path) => {
            debug!(path = %path.display(), "no config file, using defaults");
            config::Config::default()
        }
        Err(e) => {
            warn!(error = %e, "cannot locate config file, using defaults");
            config::Config::default()
        }
    };
    let output = cli.output;

    match &cli.command {
        Commands::Render { millis, format } => {
            commands::format::render(&config, *millis, format.as_deref(), output)?;
        }
        Commands::Parse { text, format, auto } => {
            commands::format::parse(&config, text, format.as_deref(), *auto, output)?;
        }
        Commands::Derive { sample } => {
            commands::format::derive(sample, output)?;
        }
        Commands::Units { value, millis } => {
            let include = *millis || config.display.units_include_millis;
            commands::format::units(*value, include, output)?;
        }
        Commands::Describe { pattern } => {
            commands::format::describe(&config, pattern.as_deref(), output)?;
        }
        Commands::Start { at, paused, unit } => {
            commands::stopwatch::start(
                &config,
                at.as_deref(),
                *paused,
                *unit,
                output,
            )?;
        }
        Commands::Pause => commands::stopwatch::pause(&config)?,
        Commands::Resume => commands::stopwatch::resume(&config)?,
        Commands::Skip { amount } => commands::stopwatch::skip(&config, amount)?,
        Commands::Time { format, units } => {
            commands::stopwatch::time(&config, format.as_deref(), *units, output)?;
        }
        Commands::Reset => commands::stopwatch::reset(&config)?,
        Commands::Config(args) => match &args.action {
            ConfigAction::List => commands::config::list(&config)?,
            ConfigAction::Set { key, value } => commands::config::set(key, value)?,
            ConfigAction::Get { key } => commands::config::get(key, &config)?,
        },
    }

    Ok(())
}
