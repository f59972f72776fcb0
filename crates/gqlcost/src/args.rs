use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt as _, registry::LookupSpan, util::SubscriberInitExt as _, EnvFilter, Layer};

mod log;

pub(crate) use self::log::{LogLevel, LogStyle};

#[derive(Debug, Parser)]
#[command(name = "gqlcost", version)]
#[command(arg_required_else_help = true)]
/// Estimates the cost of GraphQL operations from @cost annotations
pub(crate) struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Set the logging level
    #[arg(long = "log", env = "GQLCOST_LOG", global = true)]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "GQLCOST_LOG_STYLE", default_value_t = LogStyle::Text, global = true)]
    pub log_style: LogStyle,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the cost table of an annotated schema as JSON
    Extract(ExtractArgs),
    /// Compute the cost of an operation
    Cost(CostArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct ExtractArgs {
    /// Path to the SDL annotated with @cost
    pub schema: PathBuf,
    /// Write the schema without @cost annotations to this path
    #[arg(long)]
    pub clean_schema: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct CostArgs {
    /// Path to the SDL, with or without @cost annotations
    #[arg(long, short)]
    pub schema: PathBuf,
    /// Path to the operation document
    #[arg(long, short)]
    pub query: PathBuf,
    /// Path to a JSON object with the variables of the operation
    #[arg(long)]
    pub variables: Option<PathBuf>,
    /// The operation to compute the cost of. All operations are summed otherwise.
    #[arg(long)]
    pub operation_name: Option<String>,
    /// Path to a JSON cost table, used instead of the annotations of the schema
    #[arg(long)]
    pub cost_map: Option<PathBuf>,
    /// Cost of fields without an annotation. Overrides the configuration.
    #[arg(long)]
    pub default_cost: Option<f64>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "GQLCOST_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

pub(crate) fn parse() -> Args {
    Args::parse()
}

impl Args {
    /// Logs go to stderr, leaving stdout to the command output.
    pub fn init_logging(&self) {
        let filter = EnvFilter::new(self.log_level.unwrap_or_default().as_filter_str());

        tracing_subscriber::registry()
            .with(self.log_format())
            .with(filter)
            .init();
    }

    fn log_format<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if atty::is(atty::Stream::Stderr) => layer.with_ansi(true).boxed(),
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}
