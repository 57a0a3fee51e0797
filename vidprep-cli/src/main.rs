// vidprep-cli/src/main.rs
//
// Entry point for the `vidprep` binary: parses arguments, installs the
// logger, dispatches to the selected command and maps failure to exit code 1.

use clap::Parser;
use std::process;
use vidprep_cli::{Cli, Commands, logging, run_process, run_shard, terminal};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Shard(args) => run_shard(args),
    };

    if let Err(e) = result {
        terminal::print_error(&e.to_string());
        process::exit(1);
    }
}
