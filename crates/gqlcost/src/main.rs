#![cfg_attr(test, allow(unused_crate_dependencies))]

use args::Command;
use clap::crate_version;

mod args;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    args.init_logging();

    let crate_version = crate_version!();
    tracing::debug!("gqlcost {crate_version}");

    match &args.command {
        Command::Extract(extract) => commands::extract(extract),
        Command::Cost(cost) => commands::cost(cost),
    }
}
