use clap::Parser;
use credstore::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::run(cli)
}
