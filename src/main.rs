//! topicflat - Flatten nested research outlines into ordered topic lists

use anyhow::Result;
use clap::Parser;

use topicflat::{cli, logging};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    cli::run(cli)
}
