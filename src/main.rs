use clap::Parser;
use optpipe::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
