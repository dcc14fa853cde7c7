pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{align::Align, cases::Cases, command::Command};
use enum_dispatch::enum_dispatch;
use env_logger::Env;
use log::error;

#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
enum Subcommand {
    Align(Align),
    Cases(Cases),
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Args = Args::parse();
    if let Err(err) = args.subcommand.execute() {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
pub mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Args, Subcommand};

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_dispatch_to_subcommands() {
        let args = Args::parse_from(["piecewise", "cases", "-i", "fixtures/cases.json"]);
        assert!(matches!(args.subcommand, Subcommand::Cases(_)));
        let args = Args::parse_from(["piecewise", "align", "-q", "ATC", "-r", "ATC", "-a", "0:0"]);
        assert!(matches!(args.subcommand, Subcommand::Align(_)));
    }
}
