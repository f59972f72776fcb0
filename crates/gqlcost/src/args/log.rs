use std::fmt;

use clap::ValueEnum;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Info, warning and error messages
    Info,
    /// Operation costs, detected recursion and ignored annotation arguments
    Debug,
    /// The cost of every field
    Trace,
}

impl LogLevel {
    pub(crate) fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "gqlcost=error,graphql_cost=error,off",
            LogLevel::Warn => "gqlcost=warn,graphql_cost=warn,off",
            LogLevel::Info => "gqlcost=info,graphql_cost=info,off",
            LogLevel::Debug => "gqlcost=debug,graphql_cost=debug,off",
            LogLevel::Trace => "gqlcost=trace,graphql_cost=trace,off",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

// Renders the default value in `--help`.
impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        })
    }
}
