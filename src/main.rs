use clap::Parser;
use smoothcast::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
